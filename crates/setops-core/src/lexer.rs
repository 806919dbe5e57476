//! Expression lexer
//!
//! Turns an expression such as `(A|B)-C` into a stream of [`Token`]s, each
//! tagged with its character position. Whitespace is skipped.

use crate::error::{Result, SetOpsError};
use crate::set::OperandId;

/// Lexical token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Operand letter
    Identifier(OperandId),
    /// `+` or `|`
    Union,
    /// `-`
    Difference,
    /// `&`
    Intersection,
    /// `^`
    SymmetricDifference,
    /// `(`
    LParen,
    /// `)`
    RParen,
}

impl TokenKind {
    /// Whether this token is one of the binary operators
    pub fn is_operator(self) -> bool {
        matches!(
            self,
            Self::Union | Self::Difference | Self::Intersection | Self::SymmetricDifference
        )
    }
}

/// A token and the character offset it starts at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub position: usize,
}

/// Tokenize an expression
///
/// Letters are upper-cased, so `a-b` and `A-B` lex the same.
///
/// # Examples
///
/// ```
/// use setops_core::lexer::{lex, TokenKind};
///
/// let tokens = lex("A - B").unwrap();
/// assert_eq!(tokens.len(), 3);
/// assert_eq!(tokens[1].kind, TokenKind::Difference);
/// assert_eq!(tokens[2].position, 4);
/// ```
pub fn lex(expression: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();

    for (position, ch) in expression.chars().enumerate() {
        let kind = match ch {
            c if c.is_whitespace() => continue,
            '+' | '|' => TokenKind::Union,
            '-' => TokenKind::Difference,
            '&' => TokenKind::Intersection,
            '^' => TokenKind::SymmetricDifference,
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            c if c.is_ascii_alphabetic() => TokenKind::Identifier(OperandId::new(c)?),
            found => return Err(SetOpsError::Lex { position, found }),
        };
        tokens.push(Token { kind, position });
    }

    Ok(tokens)
}

/// Expression used when the caller supplies none
///
/// Starts from `A`, subtracts `B` when declared and adds `C` when declared,
/// giving `A-B+C`, `A-B`, `A+C` or `A`. With nothing declared the default is
/// the empty expression, which evaluates to the empty set.
///
/// # Examples
///
/// ```
/// use setops_core::lexer::default_expression;
/// use setops_core::OperandId;
///
/// assert_eq!(default_expression([OperandId::A, OperandId::B, OperandId::C]), "A-B+C");
/// assert_eq!(default_expression([OperandId::A]), "A");
/// assert_eq!(default_expression([]), "");
/// ```
pub fn default_expression(declared: impl IntoIterator<Item = OperandId>) -> String {
    let declared: Vec<OperandId> = declared.into_iter().collect();
    if declared.is_empty() {
        return String::new();
    }

    let mut expression = String::from("A");
    if declared.contains(&OperandId::B) {
        expression.push_str("-B");
    }
    if declared.contains(&OperandId::C) {
        expression.push_str("+C");
    }
    expression
}
