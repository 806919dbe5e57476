//! Error types for setops-core

use std::fmt;
use thiserror::Error;

/// Result type alias for setops-core
pub type Result<T> = std::result::Result<T, SetOpsError>;

/// Structural failure kinds reported by the expression parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Input ended where an operand or `)` was required
    UnexpectedEnd,
    /// A token appeared where it cannot start or continue an expression
    UnexpectedToken,
    /// A `)` without a matching `(`, or a `(` never closed
    UnbalancedParen,
    /// An operator with nothing on one of its sides
    MissingOperand,
    /// Two operands (or groups) next to each other with no operator between
    MissingOperator,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::UnexpectedEnd => "unexpected end of expression",
            Self::UnexpectedToken => "unexpected token",
            Self::UnbalancedParen => "unbalanced parentheses",
            Self::MissingOperand => "operator is missing an operand",
            Self::MissingOperator => "missing operator between operands",
        };
        f.write_str(text)
    }
}

/// Configured ceilings that an invocation can hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    /// Parenthesis nesting depth
    NestingDepth,
    /// Expression length in characters
    ExpressionLength,
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NestingDepth => f.write_str("nesting depth"),
            Self::ExpressionLength => f.write_str("expression length"),
        }
    }
}

/// Error type for engine operations
///
/// Every variant is a local, recoverable failure. Positions are character
/// offsets into the expression; an offset equal to the expression length
/// points at end of input.
#[derive(Error, Debug)]
pub enum SetOpsError {
    /// Input could not be parsed under the stated or detected format
    #[error("Format error in {source_name}: {detail}")]
    Format { source_name: String, detail: String },

    /// Expression contains a character outside the accepted alphabet
    #[error("Invalid character '{found}' at position {position}")]
    Lex { position: usize, found: char },

    /// Structurally invalid expression
    #[error("Parse error at position {position}: {kind}")]
    Parse {
        position: usize,
        kind: ParseErrorKind,
    },

    /// Expression references a letter with no declared input
    #[error("Unknown operand '{letter}' at position {position}")]
    UnknownOperand { letter: char, position: usize },

    /// Nesting depth or expression length above the configured ceiling
    #[error("Resource limit exceeded: {limit} is {actual}, maximum is {max}")]
    ResourceLimitExceeded {
        limit: Limit,
        max: usize,
        actual: usize,
    },

    /// Operand identifier outside A..=Z
    #[error("Invalid operand identifier: {0}")]
    InvalidOperand(String),

    /// Configuration rejected by validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading a source or writing a sink failed
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SetOpsError {
    /// Build a format error for the named source
    pub fn format(source_name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Format {
            source_name: source_name.into(),
            detail: detail.into(),
        }
    }

    /// Character position in the expression, when the error has one
    pub fn position(&self) -> Option<usize> {
        match self {
            Self::Lex { position, .. }
            | Self::Parse { position, .. }
            | Self::UnknownOperand { position, .. } => Some(*position),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SetOpsError::UnknownOperand {
            letter: 'D',
            position: 2,
        };
        assert_eq!(err.to_string(), "Unknown operand 'D' at position 2");

        let err = SetOpsError::Parse {
            position: 4,
            kind: ParseErrorKind::UnbalancedParen,
        };
        assert_eq!(
            err.to_string(),
            "Parse error at position 4: unbalanced parentheses"
        );

        let err = SetOpsError::ResourceLimitExceeded {
            limit: Limit::NestingDepth,
            max: 8,
            actual: 9,
        };
        assert_eq!(
            err.to_string(),
            "Resource limit exceeded: nesting depth is 9, maximum is 8"
        );
    }

    #[test]
    fn test_position() {
        let err = SetOpsError::Lex {
            position: 3,
            found: '#',
        };
        assert_eq!(err.position(), Some(3));
        assert_eq!(SetOpsError::format("A", "bad json").position(), None);
    }
}
