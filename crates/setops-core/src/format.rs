//! Textual encodings for token lists
//!
//! A [`Format`] describes how a raw text block is split into tokens and how a
//! result set is rendered back to text.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format descriptor attached to every input source and to the output sink
///
/// # Examples
///
/// ```
/// use setops_core::Format;
///
/// assert_eq!("csv".parse::<Format>().unwrap(), Format::Comma);
/// assert_eq!("column".parse::<Format>().unwrap(), Format::Columnar);
/// assert_eq!(Format::delimiter("|").to_string(), "delimiter(|)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// One token per line
    #[default]
    Columnar,
    /// Comma separated, rows allowed
    Comma,
    /// Separated by an arbitrary character or string
    #[serde(rename = "delimiter")]
    CustomDelimiter(String),
    /// JSON array of strings
    Json,
}

impl Format {
    /// Shorthand for [`Format::CustomDelimiter`]
    pub fn delimiter(d: impl Into<String>) -> Self {
        Self::CustomDelimiter(d.into())
    }

    /// Format a conversion should target when the caller names none
    ///
    /// Columnar lists become comma separated; everything else becomes columnar.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Columnar => Self::Comma,
            _ => Self::Columnar,
        }
    }

    /// Short name used in logs and summaries
    pub fn name(&self) -> &str {
        match self {
            Self::Columnar => "columnar",
            Self::Comma => "comma",
            Self::CustomDelimiter(_) => "delimiter",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CustomDelimiter(d) => write!(f, "delimiter({})", d.escape_debug()),
            other => f.write_str(other.name()),
        }
    }
}

/// Error returned when a format name is not recognised
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown format '{0}' (expected columnar, comma, json or delimiter:<d>)")]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    /// Parse a format name
    ///
    /// Accepts `columnar`/`column`/`lines`, `comma`/`csv`, `json`, and
    /// `delimiter:<d>` for a custom delimiter. `tab`, `pipe` and `semicolon`
    /// name the common custom delimiters.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(d) = s.strip_prefix("delimiter:") {
            if d.is_empty() {
                return Err(UnknownFormat(s.to_string()));
            }
            return Ok(Self::delimiter(unescape(d)));
        }

        match s.trim().to_lowercase().as_str() {
            "columnar" | "column" | "lines" | "newline" => Ok(Self::Columnar),
            "comma" | "csv" => Ok(Self::Comma),
            "json" => Ok(Self::Json),
            "tab" | "tsv" => Ok(Self::delimiter("\t")),
            "pipe" => Ok(Self::delimiter("|")),
            "semicolon" => Ok(Self::delimiter(";")),
            _ => Err(UnknownFormat(s.to_string())),
        }
    }
}

/// Turn the shell spellings `\t` and `\n` into the characters they name
pub fn unescape(d: &str) -> String {
    d.replace("\\t", "\t").replace("\\n", "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_aliases() {
        assert_eq!("columnar".parse::<Format>().unwrap(), Format::Columnar);
        assert_eq!("COLUMN".parse::<Format>().unwrap(), Format::Columnar);
        assert_eq!("csv".parse::<Format>().unwrap(), Format::Comma);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("pipe".parse::<Format>().unwrap(), Format::delimiter("|"));
        assert_eq!(
            "delimiter:\\t".parse::<Format>().unwrap(),
            Format::delimiter("\t")
        );
        assert_eq!(
            "delimiter: | ".parse::<Format>().unwrap(),
            Format::delimiter(" | ")
        );
    }

    #[test]
    fn test_from_str_rejects_unknown() {
        assert!("yaml".parse::<Format>().is_err());
        assert!("delimiter:".parse::<Format>().is_err());
    }

    #[test]
    fn test_opposite() {
        assert_eq!(Format::Columnar.opposite(), Format::Comma);
        assert_eq!(Format::Comma.opposite(), Format::Columnar);
        assert_eq!(Format::Json.opposite(), Format::Columnar);
    }

    #[test]
    fn test_serde() {
        let json = serde_json::to_string(&Format::Json).unwrap();
        assert_eq!(json, "\"json\"");
        let parsed: Format = serde_json::from_str("{\"delimiter\":\";\"}").unwrap();
        assert_eq!(parsed, Format::delimiter(";"));
    }
}
