//! Command-line interface for setops

mod batch;
mod cli;
mod summary;

use anyhow::{Context, bail};
use clap::Parser;
use cli::{BatchArgs, Cli, Commands, ConvertArgs, EvalArgs, OperandResolver, engine_config};
use setops_core::source::FsReader;
use setops_core::{Engine, OperandId, Outcome, OutputSink};
use setops_utils::Settings;
use std::io::Write;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setops_utils::init_tracing(cli.verbosity, cli.log_json);

    let settings = Settings::load_merged().context("Failed to load settings")?;

    match cli.command {
        Commands::Eval(args) => run_eval(&settings, args),
        Commands::Convert(args) => run_convert(&settings, args),
        Commands::Batch(args) => run_batch(&settings, args).await,
    }
}

fn run_eval(settings: &Settings, args: EvalArgs) -> anyhow::Result<()> {
    let config = engine_config(settings, &args.engine, args.output_format(settings)?)?;
    let engine = Engine::new(config);

    let hint = args.input.hint();
    let mut resolver = OperandResolver::new(std::io::stdin().lock());
    let sources = args
        .operands()
        .into_iter()
        .map(|(id, value)| resolver.resolve(id, &value, hint.as_ref()))
        .collect::<anyhow::Result<Vec<_>>>()?;

    if sources.is_empty() {
        warn!("No sets given; the result is empty");
    }

    let outcome = match engine.run(&sources, args.operation.as_deref(), &FsReader) {
        Ok(outcome) => outcome,
        Err(e) => {
            if let (Some(expression), Some(position)) = (args.operation.as_deref(), e.position())
            {
                eprintln!("{}", summary::caret(expression, position));
            }
            return Err(e.into());
        }
    };
    info!(count = outcome.count, "evaluated");

    emit(&outcome, args.output.map(OutputSink::File), args.verbose)
}

fn run_convert(settings: &Settings, args: ConvertArgs) -> anyhow::Result<()> {
    let engine = Engine::new(engine_config(settings, &args.engine, None)?);

    let Some(value) = args.value() else {
        bail!("convert needs an input list");
    };
    let hint = args.input_flags.hint();
    let source = OperandResolver::new(std::io::stdin().lock()).resolve(
        OperandId::A,
        value,
        hint.as_ref(),
    )?;

    let outcome = engine.convert(&source, args.to_format.as_ref(), &FsReader)?;
    info!(count = outcome.count, to = %outcome.output_format, "converted");

    emit(&outcome, args.output.map(OutputSink::File), args.verbose)
}

async fn run_batch(settings: &Settings, args: BatchArgs) -> anyhow::Result<()> {
    let engine = Engine::new(engine_config(settings, &args.engine, None)?);

    let reports = batch::convert_all(
        &engine,
        args.files,
        args.input_flags.hint(),
        args.to_format,
        &args.out_dir,
    )
    .await?;

    let mut failed = 0;
    for report in &reports {
        match &report.result {
            Ok((output, outcome)) => println!(
                "{} -> {} ({} tokens)",
                report.input.display(),
                output.display(),
                outcome.count
            ),
            Err(e) => {
                failed += 1;
                eprintln!("{}: {e:#}", report.input.display());
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} files failed to convert", reports.len());
    }
    Ok(())
}

/// Write the outcome to its sink (stdout when none) and the summary to stderr
fn emit(outcome: &Outcome, sink: Option<OutputSink>, verbose: bool) -> anyhow::Result<()> {
    match sink {
        Some(sink) => {
            sink.write(&outcome.text)?;
            eprintln!("Wrote {} tokens", outcome.count);
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(outcome.text.as_bytes())?;
            if !outcome.text.is_empty() && !outcome.text.ends_with('\n') {
                writeln!(stdout)?;
            }
        }
    }

    for warning in &outcome.diagnostics.warnings {
        warn!("{warning}");
    }
    if verbose {
        eprintln!("{}", summary::summary_table(outcome));
    }
    Ok(())
}
