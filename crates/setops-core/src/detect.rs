//! Format detection and raw tokenization
//!
//! [`tokenize`] turns a raw text block into raw token strings. When the caller
//! supplies a [`Format`] hint it is applied directly; otherwise a
//! [`DetectionPolicy`] picks the format first. The default policy is
//! [`HeuristicPolicy`], which checks in this order:
//!
//! 1. content starts with `[` (or `{`) and parses as JSON -> [`Format::Json`]
//! 2. no commas but interior line breaks -> [`Format::Columnar`]
//! 3. commas and at most one interior line break -> [`Format::Comma`]
//! 4. a single line containing `;`, tab or `|` -> [`Format::CustomDelimiter`]
//!    of the most frequent one
//! 5. otherwise -> [`Format::Columnar`]
//!
//! Tokens produced here are raw: trimming, quote stripping and dropping
//! empties is the normalizer's job.

use crate::error::{Result, SetOpsError};
use crate::format::Format;
use serde_json::Value;
use std::fmt;

/// Delimiters considered by rule 4, in tie-break order
const SECONDARY_DELIMITERS: [char; 3] = [';', '\t', '|'];

/// Policy deciding the format of unhinted content
pub trait DetectionPolicy {
    /// Pick a format for `content`
    fn detect(&self, content: &str) -> Format;
}

/// Default detection heuristics, see the module docs for the order
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicPolicy;

impl DetectionPolicy for HeuristicPolicy {
    fn detect(&self, content: &str) -> Format {
        let trimmed = content.trim();

        if looks_like_json(trimmed) {
            return Format::Json;
        }

        let commas = trimmed.matches(',').count();
        let line_breaks = trimmed.matches('\n').count();

        if commas == 0 && line_breaks > 0 {
            return Format::Columnar;
        }
        if commas > 0 && line_breaks <= 1 {
            return Format::Comma;
        }
        if line_breaks == 0 {
            let best = SECONDARY_DELIMITERS
                .iter()
                .map(|d| (*d, trimmed.matches(*d).count()))
                .filter(|(_, count)| *count > 0)
                .fold(None::<(char, usize)>, |best, candidate| match best {
                    Some(b) if b.1 >= candidate.1 => Some(b),
                    _ => Some(candidate),
                });
            if let Some((d, _)) = best {
                return Format::delimiter(d.to_string());
            }
        }

        Format::Columnar
    }
}

fn looks_like_json(trimmed: &str) -> bool {
    (trimmed.starts_with('[') || trimmed.starts_with('{'))
        && serde_json::from_str::<Value>(trimmed)
            .is_ok_and(|v| v.is_array() || v.is_object())
}

/// Non-fatal condition noticed while reading a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatWarning {
    /// Non-blank input produced no tokens at all
    NoTokens { source_name: String },
    /// The hinted delimiter never occurs in the input
    DelimiterNotFound {
        source_name: String,
        delimiter: String,
    },
}

impl fmt::Display for FormatWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoTokens { source_name } => {
                write!(f, "{source_name}: input produced no tokens")
            }
            Self::DelimiterNotFound {
                source_name,
                delimiter,
            } => write!(
                f,
                "{source_name}: delimiter '{}' not found in input",
                delimiter.escape_debug()
            ),
        }
    }
}

/// Raw tokens plus the format they were split with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokenized {
    /// Raw, untrimmed token strings
    pub tokens: Vec<String>,
    /// Format that was applied (hinted or detected)
    pub format: Format,
    /// Whether `format` came from detection rather than a hint
    pub detected: bool,
    /// Non-fatal observations
    pub warnings: Vec<FormatWarning>,
}

/// Split `content` using `hint`, or the default heuristics when `hint` is `None`
///
/// # Examples
///
/// ```
/// use setops_core::detect::tokenize;
/// use setops_core::Format;
///
/// let out = tokenize("A", "AAPL,MSFT", None).unwrap();
/// assert_eq!(out.format, Format::Comma);
/// assert_eq!(out.tokens, vec!["AAPL", "MSFT"]);
/// ```
pub fn tokenize(source_name: &str, content: &str, hint: Option<&Format>) -> Result<Tokenized> {
    tokenize_with(&HeuristicPolicy, source_name, content, hint)
}

/// Same as [`tokenize`] with a caller-chosen detection policy
pub fn tokenize_with(
    policy: &dyn DetectionPolicy,
    source_name: &str,
    content: &str,
    hint: Option<&Format>,
) -> Result<Tokenized> {
    let (format, detected) = match hint {
        Some(format) => (format.clone(), false),
        None => (policy.detect(content), true),
    };
    tracing::trace!(source = source_name, %format, detected, "splitting source");

    let mut warnings = Vec::new();
    let tokens = match &format {
        Format::Columnar => content.lines().map(str::to_string).collect(),
        Format::Comma => {
            let trimmed = content.trim();
            if !detected && !trimmed.is_empty() && !trimmed.contains([',', '\n']) {
                warnings.push(FormatWarning::DelimiterNotFound {
                    source_name: source_name.to_string(),
                    delimiter: ",".to_string(),
                });
            }
            parse_csv(source_name, content)?
        }
        Format::CustomDelimiter(d) => {
            if d.is_empty() {
                return Err(SetOpsError::format(source_name, "empty delimiter"));
            }
            if !detected && !content.trim().is_empty() && !content.contains(d.as_str()) {
                warnings.push(FormatWarning::DelimiterNotFound {
                    source_name: source_name.to_string(),
                    delimiter: d.clone(),
                });
            }
            content.split(d.as_str()).map(str::to_string).collect()
        }
        Format::Json => parse_json(source_name, content)?,
    };

    Ok(Tokenized {
        tokens,
        format,
        detected,
        warnings,
    })
}

/// Read every field of every CSV row, honouring double-quoted fields
///
/// Rows may have any number of fields and blank lines are skipped.
fn parse_csv(source_name: &str, content: &str) -> Result<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut tokens = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| SetOpsError::format(source_name, format!("invalid CSV: {e}")))?;
        tokens.extend(record.iter().map(str::to_string));
    }
    Ok(tokens)
}

/// Parse a JSON array (or object, taking its values) into raw tokens
fn parse_json(source_name: &str, content: &str) -> Result<Vec<String>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(content)
        .map_err(|e| SetOpsError::format(source_name, format!("invalid JSON: {e}")))?;

    let elements: Vec<Value> = match value {
        Value::Array(items) => items,
        Value::Object(map) => map.into_iter().map(|(_, v)| v).collect(),
        other => {
            return Err(SetOpsError::format(
                source_name,
                format!("expected a JSON array, found {}", json_kind(&other)),
            ));
        }
    };

    let mut tokens = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        match element {
            Value::Null => {}
            Value::String(s) => tokens.push(s),
            Value::Number(n) => tokens.push(n.to_string()),
            Value::Bool(b) => tokens.push(b.to_string()),
            nested => {
                return Err(SetOpsError::format(
                    source_name,
                    format!("element {index} is a nested {}", json_kind(&nested)),
                ));
            }
        }
    }
    Ok(tokens)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
