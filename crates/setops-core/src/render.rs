//! Result formatting

use crate::error::{Result, SetOpsError};
use crate::format::Format;
use std::collections::HashSet;

/// Serialize tokens in `format`, ordinal-sorted when `sort` is set
///
/// Without `sort` the order follows the underlying hash set and is not stable
/// across runs.
///
/// # Examples
///
/// ```
/// use setops_core::{Format, render::render};
/// use std::collections::HashSet;
///
/// let tokens: HashSet<String> = ["MSFT", "AAPL"].iter().map(|s| s.to_string()).collect();
/// assert_eq!(render(&tokens, &Format::Comma, true).unwrap(), "AAPL,MSFT");
/// assert_eq!(render(&tokens, &Format::Columnar, true).unwrap(), "AAPL\nMSFT\n");
/// ```
pub fn render(tokens: &HashSet<String>, format: &Format, sort: bool) -> Result<String> {
    let mut ordered: Vec<&str> = tokens.iter().map(String::as_str).collect();
    if sort {
        ordered.sort_unstable();
    }
    render_ordered(&ordered, format)
}

/// Serialize tokens in the order given
pub fn render_ordered(tokens: &[&str], format: &Format) -> Result<String> {
    let text = match format {
        Format::Columnar => {
            let mut out = String::with_capacity(tokens.iter().map(|t| t.len() + 1).sum());
            for token in tokens {
                out.push_str(token);
                out.push('\n');
            }
            out
        }
        Format::Comma => render_csv_row(tokens)?,
        Format::CustomDelimiter(d) => tokens.join(d.as_str()),
        Format::Json => serde_json::to_string_pretty(tokens)
            .map_err(|e| SetOpsError::format("output", e.to_string()))?,
    };
    Ok(text)
}

/// One CSV row, quoting only the fields that need it
fn render_csv_row(tokens: &[&str]) -> Result<String> {
    if tokens.is_empty() {
        return Ok(String::new());
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(tokens)
        .map_err(|e| SetOpsError::format("output", e.to_string()))?;
    let bytes = writer
        .into_inner()
        .map_err(|e| SetOpsError::format("output", e.to_string()))?;

    let mut row =
        String::from_utf8(bytes).map_err(|e| SetOpsError::format("output", e.to_string()))?;
    if row.ends_with('\n') {
        row.pop();
    }
    Ok(row)
}
