//! Engine facade tying the pipeline together
//!
//! raw text -> [`tokenize`](crate::detect::tokenize) -> [`Normalizer`] ->
//! [`OperandTable`] -> [`evaluate`] -> [`render`]. Conversion mode skips the
//! table and the evaluator.

use crate::detect::{DetectionPolicy, FormatWarning, HeuristicPolicy, tokenize_with};
use crate::error::{Result, SetOpsError};
use crate::eval::{ResultSet, evaluate};
use crate::format::Format;
use crate::lexer::default_expression;
use crate::normalize::Normalizer;
use crate::parser::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_EXPRESSION_LEN, ParseLimits};
use crate::render::render;
use crate::set::{NamedSet, OperandId, OperandTable};
use crate::source::{InputSource, SourceReader};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// Configuration for one engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Compare tokens exactly; when `false` tokens are folded to upper case
    pub case_sensitive: bool,

    /// Remove a surrounding pair of quotes from each token
    pub strip_quotes: bool,

    /// Sort output tokens by ordinal before rendering
    pub sort: bool,

    /// Output format for evaluation results
    pub output_format: Format,

    /// Maximum parenthesis nesting depth
    pub max_depth: usize,

    /// Maximum expression length in characters
    pub max_expression_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            case_sensitive: true,
            strip_quotes: true,
            sort: false,
            output_format: Format::Columnar,
            max_depth: DEFAULT_MAX_DEPTH,
            max_expression_len: DEFAULT_MAX_EXPRESSION_LEN,
        }
    }
}

impl EngineConfig {
    /// Create a new configuration builder
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(SetOpsError::Config(
                "max_depth must be greater than 0".to_string(),
            ));
        }
        if self.max_expression_len == 0 {
            return Err(SetOpsError::Config(
                "max_expression_len must be greater than 0".to_string(),
            ));
        }
        if matches!(&self.output_format, Format::CustomDelimiter(d) if d.is_empty()) {
            return Err(SetOpsError::Config(
                "output delimiter must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Parser ceilings derived from this configuration
    pub fn limits(&self) -> ParseLimits {
        ParseLimits {
            max_depth: self.max_depth,
            max_expression_len: self.max_expression_len,
        }
    }

    /// Normalizer derived from this configuration
    pub fn normalizer(&self) -> Normalizer {
        Normalizer {
            case_sensitive: self.case_sensitive,
            strip_quotes: self.strip_quotes,
        }
    }
}

/// Builder for EngineConfig
#[derive(Debug, Default)]
pub struct EngineConfigBuilder {
    case_sensitive: Option<bool>,
    strip_quotes: Option<bool>,
    sort: Option<bool>,
    output_format: Option<Format>,
    max_depth: Option<usize>,
    max_expression_len: Option<usize>,
}

impl EngineConfigBuilder {
    /// Set case sensitivity
    pub fn case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = Some(case_sensitive);
        self
    }

    /// Set quote stripping
    pub fn strip_quotes(mut self, strip_quotes: bool) -> Self {
        self.strip_quotes = Some(strip_quotes);
        self
    }

    /// Set output sorting
    pub fn sort(mut self, sort: bool) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Set the output format
    pub fn output_format(mut self, format: Format) -> Self {
        self.output_format = Some(format);
        self
    }

    /// Set the maximum nesting depth
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set the maximum expression length
    pub fn max_expression_len(mut self, len: usize) -> Self {
        self.max_expression_len = Some(len);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<EngineConfig> {
        let defaults = EngineConfig::default();

        let config = EngineConfig {
            case_sensitive: self.case_sensitive.unwrap_or(defaults.case_sensitive),
            strip_quotes: self.strip_quotes.unwrap_or(defaults.strip_quotes),
            sort: self.sort.unwrap_or(defaults.sort),
            output_format: self.output_format.unwrap_or(defaults.output_format),
            max_depth: self.max_depth.unwrap_or(defaults.max_depth),
            max_expression_len: self
                .max_expression_len
                .unwrap_or(defaults.max_expression_len),
        };

        config.validate()?;
        Ok(config)
    }
}

/// One operand after reading, splitting and normalizing
#[derive(Debug, Clone)]
pub struct LoadedSource {
    pub id: OperandId,
    pub set: NamedSet,
    pub format: Format,
    pub warnings: Vec<FormatWarning>,
}

/// Everything the caller may want to report besides the text
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Expression actually evaluated, after defaulting; `None` in conversion mode
    pub expression: Option<String>,
    /// Unique token count of every declared operand
    pub operand_sizes: BTreeMap<OperandId, usize>,
    /// Format each operand was read with
    pub input_formats: BTreeMap<OperandId, Format>,
    /// Non-fatal format observations
    pub warnings: Vec<FormatWarning>,
}

/// Successful result of an invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Rendered output
    pub text: String,
    /// Number of tokens in the result
    pub count: usize,
    /// Format `text` is rendered in
    pub output_format: Format,
    pub diagnostics: Diagnostics,
}

/// Set-algebra engine
///
/// Holds only configuration, so one engine can serve any number of
/// independent invocations from any number of threads.
///
/// # Example
///
/// ```
/// use setops_core::{Engine, EngineConfig, Format, InputSource, OperandId};
/// use setops_core::source::FsReader;
///
/// let engine = Engine::new(
///     EngineConfig::builder()
///         .sort(true)
///         .output_format(Format::Comma)
///         .build()
///         .unwrap(),
/// );
///
/// let sources = vec![
///     InputSource::inline(OperandId::A, "AAPL,MSFT,GOOG"),
///     InputSource::inline(OperandId::B, "MSFT"),
///     InputSource::inline(OperandId::C, "NVDA"),
/// ];
///
/// let outcome = engine.run(&sources, None, &FsReader).unwrap();
/// assert_eq!(outcome.text, "AAPL,GOOG,NVDA");
/// assert_eq!(outcome.diagnostics.expression.as_deref(), Some("A-B+C"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Create an engine with the given configuration
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Split and normalize already-read text into a named set
    pub fn load_text(
        &self,
        id: OperandId,
        source_name: &str,
        content: &str,
        hint: Option<&Format>,
    ) -> Result<LoadedSource> {
        self.load_text_with(&HeuristicPolicy, id, source_name, content, hint)
    }

    /// [`Engine::load_text`] with a caller-chosen detection policy
    pub fn load_text_with(
        &self,
        policy: &dyn DetectionPolicy,
        id: OperandId,
        source_name: &str,
        content: &str,
        hint: Option<&Format>,
    ) -> Result<LoadedSource> {
        let tokenized = tokenize_with(policy, source_name, content, hint)?;
        let set = self.config.normalizer().normalize(&tokenized.tokens);

        let mut warnings = tokenized.warnings;
        if set.is_empty() && !content.trim().is_empty() {
            warnings.push(FormatWarning::NoTokens {
                source_name: source_name.to_string(),
            });
        }

        debug!(
            source = source_name,
            operand = %id,
            format = %tokenized.format,
            detected = tokenized.detected,
            raw = tokenized.tokens.len(),
            unique = set.len(),
            "loaded operand"
        );

        Ok(LoadedSource {
            id,
            set,
            format: tokenized.format,
            warnings,
        })
    }

    /// Read, split and normalize one source
    pub fn load(&self, source: &InputSource, reader: &dyn SourceReader) -> Result<LoadedSource> {
        let content = source.read(reader)?;
        let hint = source.effective_hint();
        self.load_text(source.id, &source.name(), &content, hint.as_ref())
    }

    /// Evaluate `expression` over an operand table
    ///
    /// A missing or blank expression falls back to
    /// [`default_expression`] of the declared letters.
    pub fn evaluate(&self, expression: Option<&str>, table: &OperandTable) -> Result<ResultSet> {
        let expression = resolve_expression(expression, table);
        debug!(expression = %expression, operands = table.len(), "evaluating");
        evaluate(&expression, table, self.config.limits())
    }

    /// Render a result set with the configured format and sort flag
    pub fn render(&self, result: &ResultSet) -> Result<String> {
        render(result.tokens(), &self.config.output_format, self.config.sort)
    }

    /// Full pipeline: load every source, evaluate, render
    ///
    /// Fails atomically: any source or expression error aborts the whole
    /// invocation.
    pub fn run(
        &self,
        sources: &[InputSource],
        expression: Option<&str>,
        reader: &dyn SourceReader,
    ) -> Result<Outcome> {
        let mut table = OperandTable::new();
        let mut diagnostics = Diagnostics::default();

        for source in sources {
            if table.contains(source.id) {
                return Err(SetOpsError::InvalidOperand(format!(
                    "{} declared more than once",
                    source.id
                )));
            }
            let loaded = self.load(source, reader)?;
            diagnostics.input_formats.insert(loaded.id, loaded.format);
            diagnostics.warnings.extend(loaded.warnings);
            table.declare(loaded.id, loaded.set);
        }

        let resolved = resolve_expression(expression, &table);
        let result = self.evaluate(Some(&resolved), &table)?;
        let text = self.render(&result)?;

        diagnostics.expression = Some(resolved);
        diagnostics.operand_sizes = result.operand_sizes().clone();

        Ok(Outcome {
            text,
            count: result.count(),
            output_format: self.config.output_format.clone(),
            diagnostics,
        })
    }

    /// Conversion mode: reformat one source without evaluating anything
    ///
    /// With no `target`, the output format is the
    /// [`opposite`](Format::opposite) of the input format.
    pub fn convert(
        &self,
        source: &InputSource,
        target: Option<&Format>,
        reader: &dyn SourceReader,
    ) -> Result<Outcome> {
        let loaded = self.load(source, reader)?;
        self.convert_loaded(loaded, target)
    }

    /// Conversion mode over in-memory text
    ///
    /// `source_name` labels format errors and warnings.
    ///
    /// # Examples
    ///
    /// ```
    /// use setops_core::{Engine, EngineConfig, Format};
    ///
    /// let engine = Engine::new(EngineConfig::builder().sort(true).build().unwrap());
    /// let outcome = engine
    ///     .convert_text("watchlist", "MSFT\nAAPL\n", None, Some(&Format::Json))
    ///     .unwrap();
    /// assert_eq!(outcome.text, "[\n  \"AAPL\",\n  \"MSFT\"\n]");
    /// ```
    pub fn convert_text(
        &self,
        source_name: &str,
        content: &str,
        hint: Option<&Format>,
        target: Option<&Format>,
    ) -> Result<Outcome> {
        let loaded = self.load_text(OperandId::A, source_name, content, hint)?;
        self.convert_loaded(loaded, target)
    }

    fn convert_loaded(&self, loaded: LoadedSource, target: Option<&Format>) -> Result<Outcome> {
        let output_format = target.cloned().unwrap_or_else(|| loaded.format.opposite());
        debug!(from = %loaded.format, to = %output_format, count = loaded.set.len(), "converting");

        let text = render(loaded.set.tokens(), &output_format, self.config.sort)?;

        let mut diagnostics = Diagnostics {
            warnings: loaded.warnings,
            ..Diagnostics::default()
        };
        diagnostics.operand_sizes.insert(loaded.id, loaded.set.len());
        diagnostics.input_formats.insert(loaded.id, loaded.format);

        Ok(Outcome {
            text,
            count: loaded.set.len(),
            output_format,
            diagnostics,
        })
    }
}

fn resolve_expression(expression: Option<&str>, table: &OperandTable) -> String {
    match expression {
        Some(e) if !e.trim().is_empty() => e.to_string(),
        _ => default_expression(table.ids()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockSourceReader;

    fn engine() -> Engine {
        Engine::new(
            EngineConfig::builder()
                .sort(true)
                .output_format(Format::Comma)
                .build()
                .unwrap(),
        )
    }

    fn no_files() -> MockSourceReader {
        let mut reader = MockSourceReader::new();
        reader.expect_read_to_string().never();
        reader
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert!(config.case_sensitive);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = EngineConfig::builder()
            .case_sensitive(false)
            .max_depth(8)
            .output_format(Format::Json)
            .build()
            .unwrap();

        assert!(!config.case_sensitive);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.output_format, Format::Json);
        assert!(config.strip_quotes);
    }

    #[test]
    fn test_config_validation() {
        assert!(EngineConfig::builder().max_depth(0).build().is_err());
        assert!(EngineConfig::builder().max_expression_len(0).build().is_err());
        assert!(EngineConfig::builder()
            .output_format(Format::delimiter(""))
            .build()
            .is_err());
    }

    #[test]
    fn test_run_default_expression() {
        let sources = vec![
            InputSource::inline(OperandId::A, "apple,banana,cherry"),
            InputSource::inline(OperandId::B, "banana"),
            InputSource::inline(OperandId::C, "date"),
        ];
        let outcome = engine().run(&sources, None, &no_files()).unwrap();

        assert_eq!(outcome.text, "apple,cherry,date");
        assert_eq!(outcome.count, 3);
        assert_eq!(outcome.diagnostics.expression.as_deref(), Some("A-B+C"));
        assert_eq!(outcome.diagnostics.operand_sizes[&OperandId::A], 3);
    }

    #[test]
    fn test_run_only_a_is_unchanged() {
        let sources = vec![InputSource::inline(OperandId::A, "X\nY\nZ\n")];
        let outcome = engine().run(&sources, Some("  "), &no_files()).unwrap();
        assert_eq!(outcome.text, "X,Y,Z");
        assert_eq!(outcome.diagnostics.expression.as_deref(), Some("A"));
    }

    #[test]
    fn test_run_no_operands_is_empty() {
        let outcome = engine().run(&[], None, &no_files()).unwrap();
        assert_eq!(outcome.text, "");
        assert_eq!(outcome.count, 0);
    }

    #[test]
    fn test_run_rejects_duplicate_operand() {
        let sources = vec![
            InputSource::inline(OperandId::A, "X"),
            InputSource::inline(OperandId::A, "Y"),
        ];
        let err = engine().run(&sources, None, &no_files()).unwrap_err();
        assert!(matches!(err, SetOpsError::InvalidOperand(_)));
    }

    #[test]
    fn test_run_is_atomic_on_error() {
        let sources = vec![
            InputSource::inline(OperandId::A, "X"),
            InputSource::inline(OperandId::B, "[\"broken\"").with_hint(Format::Json),
        ];
        let err = engine().run(&sources, Some("A"), &no_files()).unwrap_err();
        match err {
            SetOpsError::Format { source_name, .. } => assert_eq!(source_name, "set B"),
            other => panic!("Expected Format error, got {other:?}"),
        }
    }

    #[test]
    fn test_run_reads_files_through_reader() {
        let mut reader = MockSourceReader::new();
        reader
            .expect_read_to_string()
            .times(1)
            .returning(|_| Ok(r#"["MSFT", "AAPL"]"#.to_string()));

        let sources = vec![
            InputSource::file(OperandId::A, "watchlist.json"),
            InputSource::inline(OperandId::B, "MSFT"),
        ];
        let outcome = engine().run(&sources, Some("A-B"), &reader).unwrap();
        assert_eq!(outcome.text, "AAPL");
        assert_eq!(
            outcome.diagnostics.input_formats[&OperandId::A],
            Format::Json
        );
    }

    #[test]
    fn test_case_insensitive_run() {
        let engine = Engine::new(
            EngineConfig::builder()
                .case_sensitive(false)
                .sort(true)
                .output_format(Format::Comma)
                .build()
                .unwrap(),
        );
        let sources = vec![
            InputSource::inline(OperandId::A, "Apple,BANANA"),
            InputSource::inline(OperandId::B, "apple"),
        ];
        let outcome = engine.run(&sources, Some("A-B"), &no_files()).unwrap();
        assert_eq!(outcome.text, "BANANA");
    }

    #[test]
    fn test_no_tokens_warning() {
        let loaded = engine()
            .load_text(OperandId::B, "set B", " , ,", None)
            .unwrap();
        assert!(loaded.set.is_empty());
        assert_eq!(
            loaded.warnings,
            vec![FormatWarning::NoTokens {
                source_name: "set B".to_string()
            }]
        );

        let loaded = engine().load_text(OperandId::B, "set B", "", None).unwrap();
        assert!(loaded.warnings.is_empty());
    }

    #[test]
    fn test_convert_auto_target() {
        let outcome = engine().convert_text("list", "B\nA\nA\n", None, None).unwrap();
        assert_eq!(outcome.output_format, Format::Comma);
        assert_eq!(outcome.text, "A,B");
        assert_eq!(outcome.count, 2);
        assert!(outcome.diagnostics.expression.is_none());

        let outcome = engine().convert_text("list", "B,A", None, None).unwrap();
        assert_eq!(outcome.output_format, Format::Columnar);
        assert_eq!(outcome.text, "A\nB\n");
    }

    #[test]
    fn test_convert_explicit_target() {
        let outcome = engine()
            .convert_text(
                "list",
                "x|y",
                Some(&Format::delimiter("|")),
                Some(&Format::delimiter(";")),
            )
            .unwrap();
        assert_eq!(outcome.text, "x;y");
    }

    #[test]
    fn test_convert_errors_name_the_source() {
        let err = engine()
            .convert_text("prices.json", "[\"x\"", Some(&Format::Json), None)
            .unwrap_err();
        assert!(err.to_string().contains("prices.json"));

        let outcome = engine()
            .convert_text("notes.txt", "x y", Some(&Format::delimiter(";")), None)
            .unwrap();
        assert!(outcome.diagnostics.warnings[0].to_string().starts_with("notes.txt:"));
    }

    #[test]
    fn test_convert_file_source() {
        let mut reader = MockSourceReader::new();
        reader
            .expect_read_to_string()
            .returning(|_| Ok("ticker,name\nAAPL,Apple\n".to_string()));

        let outcome = engine()
            .convert(
                &InputSource::file(OperandId::A, "tickers.csv"),
                Some(&Format::Columnar),
                &reader,
            )
            .unwrap();
        assert_eq!(outcome.text, "AAPL\nApple\nname\nticker\n");
    }
}
