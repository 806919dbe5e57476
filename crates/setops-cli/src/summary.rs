//! `--verbose` summary table and expression error markers

use comfy_table::{Table, presets::UTF8_FULL};
use setops_core::Outcome;

/// Build the per-invocation summary shown on stderr
pub fn summary_table(outcome: &Outcome) -> Table {
    let diagnostics = &outcome.diagnostics;

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Item", "Value"]);

    if let Some(expression) = &diagnostics.expression {
        table.add_row(vec!["Expression".to_string(), expression.clone()]);
    }
    for (id, size) in &diagnostics.operand_sizes {
        let format = diagnostics
            .input_formats
            .get(id)
            .map_or_else(String::new, |f| format!(" ({f})"));
        table.add_row(vec![format!("Set {id}"), format!("{size} tokens{format}")]);
    }
    table.add_row(vec![
        "Result".to_string(),
        format!("{} tokens ({})", outcome.count, outcome.output_format),
    ]);
    for warning in &diagnostics.warnings {
        table.add_row(vec!["Warning".to_string(), warning.to_string()]);
    }

    table
}

/// The expression with a caret under character `position`
///
/// A position equal to the expression length points just past the end.
pub fn caret(expression: &str, position: usize) -> String {
    format!("  {expression}\n  {}^", " ".repeat(position))
}
