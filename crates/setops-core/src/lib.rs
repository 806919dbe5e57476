//! Set-algebra expression engine for named token lists
//!
//! Named lists of opaque tokens (ticker symbols, for instance) are read from
//! columnar, comma-separated, custom-delimited or JSON text, combined with an
//! expression such as `(A|B)-C`, and rendered back in any of those formats.
//!
//! # Operators
//!
//! | symbol | meaning |
//! |---|---|
//! | `+`, `\|` | union |
//! | `-` | difference |
//! | `&` | intersection (binds tighter than the rest) |
//! | `^` | symmetric difference |
//! | `( )` | grouping |
//!
//! # Example
//!
//! ```
//! use setops_core::{Engine, EngineConfig, Format, InputSource, OperandId};
//! use setops_core::source::FsReader;
//!
//! let engine = Engine::new(
//!     EngineConfig::builder()
//!         .case_sensitive(false)
//!         .sort(true)
//!         .output_format(Format::Json)
//!         .build()?,
//! );
//!
//! let outcome = engine.run(
//!     &[
//!         InputSource::inline(OperandId::A, "aapl\nmsft\nnvda\n"),
//!         InputSource::inline(OperandId::B, r#"["MSFT", "TSLA"]"#),
//!     ],
//!     Some("(A&B) | (B-A)"),
//!     &FsReader,
//! )?;
//!
//! assert_eq!(outcome.count, 2);
//! assert_eq!(outcome.text, "[\n  \"MSFT\",\n  \"TSLA\"\n]");
//! # Ok::<(), setops_core::SetOpsError>(())
//! ```

pub mod ast;
pub mod detect;
pub mod engine;
pub mod error;
pub mod eval;
pub mod format;
pub mod lexer;
pub mod normalize;
pub mod parser;
pub mod render;
pub mod set;
pub mod source;

pub use ast::{BinaryOp, Expr};
pub use detect::{DetectionPolicy, FormatWarning, HeuristicPolicy};
pub use engine::{Diagnostics, Engine, EngineConfig, Outcome};
pub use error::{Limit, ParseErrorKind, Result, SetOpsError};
pub use eval::ResultSet;
pub use format::Format;
pub use normalize::Normalizer;
pub use set::{NamedSet, OperandId, OperandTable, TokenSet};
pub use source::{InputSource, OutputSink, SourceOrigin, SourceReader};
