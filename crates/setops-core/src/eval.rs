//! Immediate evaluation of expressions over an operand table

use crate::ast::BinaryOp;
use crate::error::{Result, SetOpsError};
use crate::parser::{Algebra, ParseLimits, parse_with};
use crate::set::{OperandId, OperandTable, TokenSet};
use std::collections::BTreeMap;

/// Algebra that computes each node's token set as soon as it is parsed
pub struct SetEvaluator<'t> {
    table: &'t OperandTable,
}

impl<'t> SetEvaluator<'t> {
    /// Evaluate against `table`
    pub fn new(table: &'t OperandTable) -> Self {
        Self { table }
    }
}

impl Algebra for SetEvaluator<'_> {
    type Value = TokenSet;

    fn operand(&mut self, id: OperandId, position: usize) -> Result<TokenSet> {
        self.table
            .get(id)
            .map(|set| set.tokens().clone())
            .ok_or(SetOpsError::UnknownOperand {
                letter: id.letter(),
                position,
            })
    }

    fn combine(&mut self, op: BinaryOp, left: TokenSet, right: TokenSet) -> TokenSet {
        op.apply(left, right)
    }
}

/// Output of one evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    tokens: TokenSet,
    operand_sizes: BTreeMap<OperandId, usize>,
}

impl ResultSet {
    /// Wrap a token set with the sizes of the operands it came from
    pub fn new(tokens: TokenSet, operand_sizes: BTreeMap<OperandId, usize>) -> Self {
        Self {
            tokens,
            operand_sizes,
        }
    }

    /// Result tokens
    pub fn tokens(&self) -> &TokenSet {
        &self.tokens
    }

    /// Number of result tokens
    pub fn count(&self) -> usize {
        self.tokens.len()
    }

    /// Whether the result is empty
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Sizes of every declared operand, for diagnostics
    pub fn operand_sizes(&self) -> &BTreeMap<OperandId, usize> {
        &self.operand_sizes
    }

    /// Tokens in ordinal order
    pub fn sorted(&self) -> Vec<&str> {
        let mut tokens: Vec<&str> = self.tokens.iter().map(String::as_str).collect();
        tokens.sort_unstable();
        tokens
    }

    /// Consume into the token set
    pub fn into_tokens(self) -> TokenSet {
        self.tokens
    }
}

/// Parse and evaluate `expression` in a single pass
///
/// An empty expression yields an empty result. Either the whole expression
/// evaluates or an error is returned; there are no partial results.
///
/// # Examples
///
/// ```
/// use setops_core::eval::evaluate;
/// use setops_core::parser::ParseLimits;
/// use setops_core::{OperandId, OperandTable};
///
/// let table = OperandTable::new()
///     .with(OperandId::A, ["1", "2", "3"].into_iter().collect())
///     .with(OperandId::B, ["2"].into_iter().collect());
///
/// let result = evaluate("A-B", &table, ParseLimits::default()).unwrap();
/// assert_eq!(result.sorted(), vec!["1", "3"]);
/// ```
pub fn evaluate(expression: &str, table: &OperandTable, limits: ParseLimits) -> Result<ResultSet> {
    let mut evaluator = SetEvaluator::new(table);
    let tokens = parse_with(expression, limits, &mut evaluator)?.unwrap_or_default();
    Ok(ResultSet::new(tokens, table.sizes()))
}
