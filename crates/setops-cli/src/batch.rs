//! Concurrent conversion of many files
//!
//! Every file is read, converted and written by its own task. Tasks share
//! nothing but a clone of the engine, so one failure never affects the rest.

use anyhow::Context;
use setops_core::{Engine, Format, InputSource, OperandId, Outcome};
use std::path::{Path, PathBuf};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Result of converting one file
#[derive(Debug)]
pub struct FileReport {
    pub input: PathBuf,
    pub result: anyhow::Result<(PathBuf, Outcome)>,
}

/// File extension conventionally used for a format
pub fn extension_for(format: &Format) -> &'static str {
    match format {
        Format::Comma => "csv",
        Format::Json => "json",
        Format::Columnar | Format::CustomDelimiter(_) => "txt",
    }
}

/// Convert every file into `out_dir`, returning one report per input in
/// input order
pub async fn convert_all(
    engine: &Engine,
    files: Vec<PathBuf>,
    hint: Option<Format>,
    target: Option<Format>,
    out_dir: &Path,
) -> anyhow::Result<Vec<FileReport>> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .with_context(|| format!("Failed to create output directory {}", out_dir.display()))?;

    let mut tasks = JoinSet::new();
    for (index, input) in files.into_iter().enumerate() {
        let engine = engine.clone();
        let hint = hint.clone();
        let target = target.clone();
        let out_dir = out_dir.to_path_buf();

        tasks.spawn(async move {
            let result = convert_file(&engine, &input, hint, target.as_ref(), &out_dir).await;
            (index, FileReport { input, result })
        });
    }

    let mut reports = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        reports.push(joined.context("Conversion task panicked")?);
    }
    reports.sort_by_key(|(index, _)| *index);

    Ok(reports.into_iter().map(|(_, report)| report).collect())
}

async fn convert_file(
    engine: &Engine,
    input: &Path,
    hint: Option<Format>,
    target: Option<&Format>,
    out_dir: &Path,
) -> anyhow::Result<(PathBuf, Outcome)> {
    let content = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let mut source = InputSource::file(OperandId::A, input);
    if let Some(hint) = hint {
        source = source.with_hint(hint);
    }
    let outcome = engine.convert_text(
        &source.name(),
        &content,
        source.effective_hint().as_ref(),
        target,
    )?;

    for warning in &outcome.diagnostics.warnings {
        warn!(file = %input.display(), "{warning}");
    }

    let stem = input
        .file_stem()
        .with_context(|| format!("{} has no file name", input.display()))?;
    let output = out_dir.join(format!(
        "{}.{}",
        stem.to_string_lossy(),
        extension_for(&outcome.output_format)
    ));

    tokio::fs::write(&output, &outcome.text)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    debug!(
        input = %input.display(),
        output = %output.display(),
        count = outcome.count,
        "converted file"
    );
    Ok((output, outcome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use setops_core::EngineConfig;
    use tempfile::tempdir;

    fn engine() -> Engine {
        Engine::new(EngineConfig::builder().sort(true).build().unwrap())
    }

    #[test]
    fn test_extension_for() {
        assert_eq!(extension_for(&Format::Comma), "csv");
        assert_eq!(extension_for(&Format::Json), "json");
        assert_eq!(extension_for(&Format::delimiter(";")), "txt");
    }

    #[tokio::test]
    async fn test_convert_all_auto_target() {
        let dir = tempdir().unwrap();
        let lines = dir.path().join("lines.txt");
        let commas = dir.path().join("commas.txt");
        std::fs::write(&lines, "MSFT\nAAPL\n").unwrap();
        std::fs::write(&commas, "X,Y,X").unwrap();

        let out_dir = dir.path().join("out");
        let reports = convert_all(&engine(), vec![lines.clone(), commas], None, None, &out_dir)
            .await
            .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].input, lines);

        let (first, outcome) = reports[0].result.as_ref().unwrap();
        assert_eq!(first, &out_dir.join("lines.csv"));
        assert_eq!(outcome.count, 2);
        assert_eq!(std::fs::read_to_string(first).unwrap(), "AAPL,MSFT");

        let (second, _) = reports[1].result.as_ref().unwrap();
        assert_eq!(second, &out_dir.join("commas.txt"));
        assert_eq!(std::fs::read_to_string(second).unwrap(), "X\nY\n");
    }

    #[tokio::test]
    async fn test_json_extension_is_honoured() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("watch.json");
        std::fs::write(&input, r#"{"a": "TSLA", "b": "NVDA"}"#).unwrap();

        let reports = convert_all(
            &engine(),
            vec![input],
            None,
            Some(Format::Comma),
            dir.path(),
        )
        .await
        .unwrap();

        let (output, _) = reports[0].result.as_ref().unwrap();
        assert_eq!(std::fs::read_to_string(output).unwrap(), "NVDA,TSLA");
    }

    #[tokio::test]
    async fn test_one_failure_does_not_stop_others() {
        let dir = tempdir().unwrap();
        let good = dir.path().join("good.txt");
        let bad = dir.path().join("bad.json");
        std::fs::write(&good, "A\nB\n").unwrap();
        std::fs::write(&bad, "[\"unterminated").unwrap();
        let missing = dir.path().join("missing.txt");

        let out_dir = dir.path().join("out");
        let reports = convert_all(
            &engine(),
            vec![bad, good, missing],
            None,
            Some(Format::Json),
            &out_dir,
        )
        .await
        .unwrap();

        let error = reports[0].result.as_ref().unwrap_err();
        assert!(format!("{error:#}").contains("bad.json"));
        assert!(reports[1].result.is_ok());
        assert!(reports[2].result.is_err());
        assert!(out_dir.join("good.json").is_file());
    }
}
