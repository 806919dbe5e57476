//! Expression tree

use crate::error::{Result, SetOpsError};
use crate::set::{OperandId, OperandTable, TokenSet};
use std::fmt;

/// Binary set operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// `L ∪ R`
    Union,
    /// `L \ R`
    Difference,
    /// `L ∩ R`
    Intersection,
    /// `(L \ R) ∪ (R \ L)`
    SymmetricDifference,
}

impl BinaryOp {
    /// Canonical operator symbol
    pub fn symbol(self) -> char {
        match self {
            Self::Union => '+',
            Self::Difference => '-',
            Self::Intersection => '&',
            Self::SymmetricDifference => '^',
        }
    }

    /// Apply the operator, consuming both operands
    pub fn apply(self, mut left: TokenSet, mut right: TokenSet) -> TokenSet {
        match self {
            Self::Union => {
                if left.len() < right.len() {
                    std::mem::swap(&mut left, &mut right);
                }
                left.extend(right);
                left
            }
            Self::Difference => {
                left.retain(|t| !right.contains(t));
                left
            }
            Self::Intersection => {
                left.retain(|t| right.contains(t));
                left
            }
            Self::SymmetricDifference => {
                let mut only_right = TokenSet::new();
                for token in right.drain() {
                    if !left.remove(&token) {
                        only_right.insert(token);
                    }
                }
                left.extend(only_right);
                left
            }
        }
    }
}

/// Expression tree node
///
/// Children are owned, so a tree can never contain a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Reference to a declared operand, with its position in the source text
    Operand { id: OperandId, position: usize },
    Union(Box<Expr>, Box<Expr>),
    Difference(Box<Expr>, Box<Expr>),
    Intersection(Box<Expr>, Box<Expr>),
    SymmetricDifference(Box<Expr>, Box<Expr>),
}

impl Expr {
    /// Build the node for `op`
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        let (l, r) = (Box::new(left), Box::new(right));
        match op {
            BinaryOp::Union => Self::Union(l, r),
            BinaryOp::Difference => Self::Difference(l, r),
            BinaryOp::Intersection => Self::Intersection(l, r),
            BinaryOp::SymmetricDifference => Self::SymmetricDifference(l, r),
        }
    }

    /// Evaluate the tree against an operand table by structural recursion
    pub fn evaluate(&self, table: &OperandTable) -> Result<TokenSet> {
        let (op, left, right) = match self {
            Self::Operand { id, position } => {
                return table
                    .get(*id)
                    .map(|set| set.tokens().clone())
                    .ok_or(SetOpsError::UnknownOperand {
                        letter: id.letter(),
                        position: *position,
                    });
            }
            Self::Union(l, r) => (BinaryOp::Union, l, r),
            Self::Difference(l, r) => (BinaryOp::Difference, l, r),
            Self::Intersection(l, r) => (BinaryOp::Intersection, l, r),
            Self::SymmetricDifference(l, r) => (BinaryOp::SymmetricDifference, l, r),
        };
        Ok(op.apply(left.evaluate(table)?, right.evaluate(table)?))
    }

    /// Operand letters referenced by the tree, left to right
    pub fn operands(&self) -> Vec<OperandId> {
        let mut out = Vec::new();
        self.collect_operands(&mut out);
        out
    }

    fn collect_operands(&self, out: &mut Vec<OperandId>) {
        match self {
            Self::Operand { id, .. } => out.push(*id),
            Self::Union(l, r)
            | Self::Difference(l, r)
            | Self::Intersection(l, r)
            | Self::SymmetricDifference(l, r) => {
                l.collect_operands(out);
                r.collect_operands(out);
            }
        }
    }
}

/// Fully parenthesized rendering, e.g. `(A-(B&C))`
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (op, l, r) = match self {
            Self::Operand { id, .. } => return write!(f, "{id}"),
            Self::Union(l, r) => (BinaryOp::Union, l, r),
            Self::Difference(l, r) => (BinaryOp::Difference, l, r),
            Self::Intersection(l, r) => (BinaryOp::Intersection, l, r),
            Self::SymmetricDifference(l, r) => (BinaryOp::SymmetricDifference, l, r),
        };
        write!(f, "({l}{}{r})", op.symbol())
    }
}
