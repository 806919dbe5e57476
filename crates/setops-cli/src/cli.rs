//! Argument definitions and their translation into engine inputs

use anyhow::{Context, bail};
use clap::{ArgAction, Args, Parser, Subcommand};
use setops_core::format::unescape;
use setops_core::{EngineConfig, Format, InputSource, OperandId};
use setops_utils::Settings;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "setops")]
#[command(version, about = "Set algebra over lists of tokens", long_about = None)]
pub struct Cli {
    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short = 'v', action = ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Emit log events as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a set expression over named lists
    Eval(EvalArgs),
    /// Reformat a single list
    Convert(ConvertArgs),
    /// Convert many files concurrently
    Batch(BatchArgs),
}

/// Normalization and limit flags shared by every subcommand
#[derive(Args, Debug, Default, Clone)]
pub struct EngineFlags {
    /// Fold tokens to upper case before comparing
    #[arg(short = 'i', long)]
    pub ignore_case: bool,

    /// Sort output tokens
    #[arg(short = 's', long)]
    pub sort: bool,

    /// Keep quote characters around tokens
    #[arg(long)]
    pub no_strip_quotes: bool,

    /// Maximum parenthesis nesting depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Maximum expression length in characters
    #[arg(long)]
    pub max_expression_len: Option<usize>,
}

/// How operand text should be split
#[derive(Args, Debug, Default, Clone)]
pub struct InputFlags {
    /// Input format (columnar, comma, json, tab, pipe, semicolon, delimiter:<d>)
    #[arg(long, value_name = "FORMAT")]
    pub input_format: Option<Format>,

    /// Custom input delimiter (`\t` for tab)
    #[arg(long, conflicts_with = "input_format")]
    pub delimiter: Option<String>,
}

impl InputFlags {
    /// Explicit format hint, if any
    pub fn hint(&self) -> Option<Format> {
        match &self.delimiter {
            Some(d) => Some(Format::delimiter(unescape(d))),
            None => self.input_format.clone(),
        }
    }
}

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// Set A (inline text, file path, or `-` for stdin)
    #[arg(short = 'a', long = "set-a")]
    pub a: Option<String>,

    /// Set B
    #[arg(short = 'b', long = "set-b")]
    pub b: Option<String>,

    /// Set C
    #[arg(short = 'c', long = "set-c")]
    pub c: Option<String>,

    /// Set D
    #[arg(short = 'd', long = "set-d")]
    pub d: Option<String>,

    /// Set E
    #[arg(short = 'e', long = "set-e")]
    pub e: Option<String>,

    /// Any set by letter, repeatable
    #[arg(long = "set", value_name = "X=VALUE", value_parser = parse_assignment)]
    pub sets: Vec<(OperandId, String)>,

    /// Expression such as `(A|B)-C`; defaults to A-B+C over the declared sets
    #[arg(short = 'o', long)]
    pub operation: Option<String>,

    #[command(flatten)]
    pub input: InputFlags,

    /// Output format
    #[arg(short = 'f', long, value_name = "FORMAT")]
    pub output_format: Option<Format>,

    /// Custom output delimiter (`\t` for tab)
    #[arg(long, conflicts_with = "output_format")]
    pub output_delimiter: Option<String>,

    /// Write the result to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print a summary table to stderr
    #[arg(long)]
    pub verbose: bool,

    #[command(flatten)]
    pub engine: EngineFlags,
}

impl EvalArgs {
    /// Operand letters and raw values in declaration order
    pub fn operands(&self) -> Vec<(OperandId, String)> {
        let lettered = [
            (OperandId::A, &self.a),
            (OperandId::B, &self.b),
            (OperandId::C, &self.c),
            (OperandId::D, &self.d),
            (OperandId::E, &self.e),
        ];

        lettered
            .into_iter()
            .filter_map(|(id, value)| value.clone().map(|v| (id, v)))
            .chain(self.sets.iter().cloned())
            .collect()
    }

    /// Output format from the flags, else from settings
    pub fn output_format(&self, settings: &Settings) -> anyhow::Result<Option<Format>> {
        if let Some(d) = &self.output_delimiter {
            return Ok(Some(Format::delimiter(unescape(d))));
        }
        if self.output_format.is_some() {
            return Ok(self.output_format.clone());
        }
        settings
            .output_format
            .as_deref()
            .map(|name| {
                name.parse::<Format>()
                    .with_context(|| "Invalid outputFormat in settings")
            })
            .transpose()
    }
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// List to convert (inline text, file path, or `-` for stdin)
    #[arg(value_name = "INPUT", required_unless_present = "a")]
    pub input: Option<String>,

    /// Same as INPUT
    #[arg(short = 'a', conflicts_with = "input")]
    pub a: Option<String>,

    /// Target format; defaults to the opposite of the detected one
    #[arg(short = 't', long, value_name = "FORMAT")]
    pub to_format: Option<Format>,

    #[command(flatten)]
    pub input_flags: InputFlags,

    /// Write the result to a file instead of stdout
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Print a summary table to stderr
    #[arg(long)]
    pub verbose: bool,

    #[command(flatten)]
    pub engine: EngineFlags,
}

impl ConvertArgs {
    /// The list value, from the positional or `-a`
    pub fn value(&self) -> Option<&str> {
        self.input.as_deref().or(self.a.as_deref())
    }
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Files to convert
    #[arg(value_name = "FILE", required = true)]
    pub files: Vec<PathBuf>,

    /// Target format; defaults to the opposite of each file's detected one
    #[arg(short = 't', long, value_name = "FORMAT")]
    pub to_format: Option<Format>,

    /// Directory receiving the converted files
    #[arg(long, value_name = "DIR")]
    pub out_dir: PathBuf,

    #[command(flatten)]
    pub input_flags: InputFlags,

    #[command(flatten)]
    pub engine: EngineFlags,
}

/// Parse `X=VALUE` for `--set`
pub fn parse_assignment(s: &str) -> Result<(OperandId, String), String> {
    let (letter, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected X=VALUE, got '{s}'"))?;
    let id = letter
        .parse::<OperandId>()
        .map_err(|_| format!("'{letter}' is not a set letter A..Z"))?;
    Ok((id, value.to_string()))
}

/// Layer settings and flags into an engine configuration
///
/// Flags win over settings; settings win over engine defaults.
pub fn engine_config(
    settings: &Settings,
    flags: &EngineFlags,
    output_format: Option<Format>,
) -> anyhow::Result<EngineConfig> {
    let mut builder = EngineConfig::builder();

    if let Some(case_sensitive) = settings.case_sensitive {
        builder = builder.case_sensitive(case_sensitive);
    }
    if let Some(strip_quotes) = settings.strip_quotes {
        builder = builder.strip_quotes(strip_quotes);
    }
    if let Some(sort) = settings.sort {
        builder = builder.sort(sort);
    }
    if let Some(depth) = flags.max_depth.or(settings.max_depth) {
        builder = builder.max_depth(depth);
    }
    if let Some(len) = flags.max_expression_len.or(settings.max_expression_len) {
        builder = builder.max_expression_len(len);
    }

    if flags.ignore_case {
        builder = builder.case_sensitive(false);
    }
    if flags.no_strip_quotes {
        builder = builder.strip_quotes(false);
    }
    if flags.sort {
        builder = builder.sort(true);
    }
    if let Some(format) = output_format {
        builder = builder.output_format(format);
    }

    builder.build().context("Invalid engine configuration")
}

/// Turns raw operand values into input sources
///
/// A value naming an existing file becomes a file source, `-` is read from
/// `stdin` (at most once), anything else is inline text.
pub struct OperandResolver<R> {
    stdin: R,
    stdin_taken: bool,
}

impl<R: Read> OperandResolver<R> {
    pub fn new(stdin: R) -> Self {
        Self {
            stdin,
            stdin_taken: false,
        }
    }

    pub fn resolve(
        &mut self,
        id: OperandId,
        value: &str,
        hint: Option<&Format>,
    ) -> anyhow::Result<InputSource> {
        let source = if value == "-" {
            if self.stdin_taken {
                bail!("stdin can only be used for one set (set {id})");
            }
            self.stdin_taken = true;
            let mut text = String::new();
            self.stdin
                .read_to_string(&mut text)
                .context("Failed to read stdin")?;
            InputSource::inline(id, text)
        } else if Path::new(value).is_file() {
            InputSource::file(id, value)
        } else {
            InputSource::inline(id, value)
        };

        Ok(match hint {
            Some(hint) => source.with_hint(hint.clone()),
            None => source,
        })
    }
}
