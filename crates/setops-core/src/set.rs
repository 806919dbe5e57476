//! Named sets and the operand table

use crate::error::{Result, SetOpsError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

/// A set of unique tokens
pub type TokenSet = HashSet<String>;

/// Single uppercase letter naming an operand
///
/// # Examples
///
/// ```
/// use setops_core::OperandId;
///
/// let id = OperandId::new('b').unwrap();
/// assert_eq!(id.letter(), 'B');
/// assert!(OperandId::new('1').is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OperandId(char);

impl OperandId {
    /// Operand `A`
    pub const A: Self = Self('A');
    /// Operand `B`
    pub const B: Self = Self('B');
    /// Operand `C`
    pub const C: Self = Self('C');
    /// Operand `D`
    pub const D: Self = Self('D');
    /// Operand `E`
    pub const E: Self = Self('E');

    /// Validate and upper-case an identifier letter
    pub fn new(letter: char) -> Result<Self> {
        let upper = letter.to_ascii_uppercase();
        if upper.is_ascii_uppercase() {
            Ok(Self(upper))
        } else {
            Err(SetOpsError::InvalidOperand(letter.to_string()))
        }
    }

    /// The identifier letter
    pub fn letter(self) -> char {
        self.0
    }
}

impl fmt::Display for OperandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<char> for OperandId {
    type Error = SetOpsError;

    fn try_from(letter: char) -> Result<Self> {
        Self::new(letter)
    }
}

impl std::str::FromStr for OperandId {
    type Err = SetOpsError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::new(letter),
            _ => Err(SetOpsError::InvalidOperand(s.to_string())),
        }
    }
}

/// An operand's unique tokens, never mutated after construction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamedSet {
    tokens: TokenSet,
}

impl NamedSet {
    /// Wrap an already-normalized token set
    pub fn new(tokens: TokenSet) -> Self {
        Self { tokens }
    }

    /// The tokens of this set
    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    /// Consume into the token set
    pub fn into_tokens(self) -> TokenSet {
        self.tokens
    }

    /// Number of unique tokens
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the set has no tokens
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Membership test
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }
}

impl<S: Into<String>> FromIterator<S> for NamedSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Named sets declared for one invocation
#[derive(Debug, Clone, Default)]
pub struct OperandTable {
    sets: BTreeMap<OperandId, NamedSet>,
}

impl OperandTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an operand, replacing any earlier set with the same letter
    pub fn declare(&mut self, id: OperandId, set: NamedSet) {
        self.sets.insert(id, set);
    }

    /// Builder-style [`OperandTable::declare`]
    pub fn with(mut self, id: OperandId, set: NamedSet) -> Self {
        self.declare(id, set);
        self
    }

    /// Look up an operand
    pub fn get(&self, id: OperandId) -> Option<&NamedSet> {
        self.sets.get(&id)
    }

    /// Whether the letter was declared
    pub fn contains(&self, id: OperandId) -> bool {
        self.sets.contains_key(&id)
    }

    /// Declared identifiers in letter order
    pub fn ids(&self) -> impl Iterator<Item = OperandId> + '_ {
        self.sets.keys().copied()
    }

    /// Per-operand sizes in letter order
    pub fn sizes(&self) -> BTreeMap<OperandId, usize> {
        self.sets.iter().map(|(id, set)| (*id, set.len())).collect()
    }

    /// Number of declared operands
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Whether no operand was declared
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}
