//! Recursive-descent expression parser
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr   := term (("+" | "|" | "-" | "^") term)*   left-associative
//! term   := factor ("&" factor)*                   left-associative
//! factor := IDENTIFIER | "(" expr ")"
//! ```
//!
//! Intersection binds tighter than the other operators, so `A-B&C` reads as
//! `A-(B&C)`, and chains of one tier fold left: `A-B-C` is `(A-B)-C`.
//!
//! The parser is generic over an [`Algebra`]: every node is handed to the
//! algebra as soon as it is recognised, so evaluating directly against an
//! operand table needs no second pass, while [`AstBuilder`] produces an
//! [`Expr`] tree from the same grammar.

use crate::ast::{BinaryOp, Expr};
use crate::error::{Limit, ParseErrorKind, Result, SetOpsError};
use crate::lexer::{Token, TokenKind, lex};
use crate::set::OperandId;

/// Default ceiling on parenthesis nesting
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default ceiling on expression length in characters
pub const DEFAULT_MAX_EXPRESSION_LEN: usize = 4096;

/// Receiver of parsed nodes
pub trait Algebra {
    /// Value produced for each node
    type Value;

    /// Value of an operand reference
    fn operand(&mut self, id: OperandId, position: usize) -> Result<Self::Value>;

    /// Value of a binary node, given its already-built children
    fn combine(&mut self, op: BinaryOp, left: Self::Value, right: Self::Value) -> Self::Value;
}

/// Algebra that builds an [`Expr`] tree
#[derive(Debug, Default, Clone, Copy)]
pub struct AstBuilder;

impl Algebra for AstBuilder {
    type Value = Expr;

    fn operand(&mut self, id: OperandId, position: usize) -> Result<Expr> {
        Ok(Expr::Operand { id, position })
    }

    fn combine(&mut self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        Expr::binary(op, left, right)
    }
}

/// Ceilings applied while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub max_depth: usize,
    pub max_expression_len: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_expression_len: DEFAULT_MAX_EXPRESSION_LEN,
        }
    }
}

/// Parse `expression` feeding each node to `algebra`
///
/// Returns `Ok(None)` for an empty (or all-whitespace) expression.
pub fn parse_with<A: Algebra>(
    expression: &str,
    limits: ParseLimits,
    algebra: &mut A,
) -> Result<Option<A::Value>> {
    let length = expression.chars().count();
    if length > limits.max_expression_len {
        return Err(SetOpsError::ResourceLimitExceeded {
            limit: Limit::ExpressionLength,
            max: limits.max_expression_len,
            actual: length,
        });
    }

    let tokens = lex(expression)?;
    if tokens.is_empty() {
        return Ok(None);
    }

    let mut parser = Parser {
        tokens: &tokens,
        cursor: 0,
        depth: 0,
        end: length,
        limits,
        algebra,
    };

    let value = parser.expr()?;
    if let Some(token) = parser.peek() {
        let kind = match token.kind {
            TokenKind::RParen => ParseErrorKind::UnbalancedParen,
            _ => ParseErrorKind::MissingOperator,
        };
        return Err(parser.error_at(token.position, kind));
    }
    Ok(Some(value))
}

/// Parse `expression` into an [`Expr`] tree
///
/// # Examples
///
/// ```
/// use setops_core::parser::{parse, ParseLimits};
///
/// let expr = parse("A-B&C", ParseLimits::default()).unwrap().unwrap();
/// assert_eq!(expr.to_string(), "(A-(B&C))");
/// ```
pub fn parse(expression: &str, limits: ParseLimits) -> Result<Option<Expr>> {
    parse_with(expression, limits, &mut AstBuilder)
}

struct Parser<'t, 'a, A> {
    tokens: &'t [Token],
    cursor: usize,
    depth: usize,
    end: usize,
    limits: ParseLimits,
    algebra: &'a mut A,
}

impl<A: Algebra> Parser<'_, '_, A> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.cursor).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.cursor += 1;
        }
        token
    }

    fn previous_kind(&self) -> Option<TokenKind> {
        self.cursor
            .checked_sub(1)
            .and_then(|i| self.tokens.get(i))
            .map(|t| t.kind)
    }

    fn error_at(&self, position: usize, kind: ParseErrorKind) -> SetOpsError {
        SetOpsError::Parse { position, kind }
    }

    fn expr(&mut self) -> Result<A::Value> {
        let mut left = self.term()?;
        while let Some(op) = self.peek().and_then(|t| low_tier_op(t.kind)) {
            self.cursor += 1;
            let right = self.term()?;
            left = self.algebra.combine(op, left, right);
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<A::Value> {
        let mut left = self.factor()?;
        while self
            .peek()
            .is_some_and(|t| t.kind == TokenKind::Intersection)
        {
            self.cursor += 1;
            let right = self.factor()?;
            left = self.algebra.combine(BinaryOp::Intersection, left, right);
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<A::Value> {
        let previous = self.previous_kind();
        let dangling = previous.is_some_and(TokenKind::is_operator);
        let Some(token) = self.advance() else {
            let kind = if dangling {
                ParseErrorKind::MissingOperand
            } else {
                ParseErrorKind::UnexpectedEnd
            };
            return Err(self.error_at(self.end, kind));
        };

        match token.kind {
            TokenKind::Identifier(id) => self.algebra.operand(id, token.position),
            TokenKind::LParen => {
                self.depth += 1;
                if self.depth > self.limits.max_depth {
                    return Err(SetOpsError::ResourceLimitExceeded {
                        limit: Limit::NestingDepth,
                        max: self.limits.max_depth,
                        actual: self.depth,
                    });
                }
                let inner = self.expr()?;
                match self.advance() {
                    Some(Token {
                        kind: TokenKind::RParen,
                        ..
                    }) => {
                        self.depth -= 1;
                        Ok(inner)
                    }
                    Some(other) => Err(self.error_at(other.position, ParseErrorKind::MissingOperator)),
                    None => Err(self.error_at(self.end, ParseErrorKind::UnbalancedParen)),
                }
            }
            TokenKind::RParen => {
                let kind = if dangling || previous == Some(TokenKind::LParen) {
                    ParseErrorKind::MissingOperand
                } else {
                    ParseErrorKind::UnbalancedParen
                };
                Err(self.error_at(token.position, kind))
            }
            _ => Err(self.error_at(token.position, ParseErrorKind::MissingOperand)),
        }
    }
}

fn low_tier_op(kind: TokenKind) -> Option<BinaryOp> {
    match kind {
        TokenKind::Union => Some(BinaryOp::Union),
        TokenKind::Difference => Some(BinaryOp::Difference),
        TokenKind::SymmetricDifference => Some(BinaryOp::SymmetricDifference),
        _ => None,
    }
}
