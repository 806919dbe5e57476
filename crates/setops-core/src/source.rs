//! Input sources and output sinks
//!
//! This is the only place the engine touches storage. Everything downstream
//! works on in-memory text.

use crate::error::{Result, SetOpsError};
use crate::format::Format;
use crate::set::OperandId;
use std::path::{Path, PathBuf};

/// Where an operand's raw text comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOrigin {
    /// Text supplied directly by the caller
    Inline(String),
    /// A file on disk
    File(PathBuf),
}

/// One operand input: identifier letter, origin and optional format hint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSource {
    pub id: OperandId,
    pub origin: SourceOrigin,
    pub hint: Option<Format>,
}

impl InputSource {
    /// Inline text source without a hint
    pub fn inline(id: OperandId, text: impl Into<String>) -> Self {
        Self {
            id,
            origin: SourceOrigin::Inline(text.into()),
            hint: None,
        }
    }

    /// File source without a hint
    pub fn file(id: OperandId, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            origin: SourceOrigin::File(path.into()),
            hint: None,
        }
    }

    /// Attach an explicit format hint
    pub fn with_hint(mut self, hint: Format) -> Self {
        self.hint = Some(hint);
        self
    }

    /// Name used in diagnostics: the file path, or `set A` for inline text
    pub fn name(&self) -> String {
        match &self.origin {
            SourceOrigin::Inline(_) => format!("set {}", self.id),
            SourceOrigin::File(path) => path.display().to_string(),
        }
    }

    /// Hint to apply: the explicit one, else one implied by a file extension
    ///
    /// `.json` implies [`Format::Json`] and `.csv` implies [`Format::Comma`].
    pub fn effective_hint(&self) -> Option<Format> {
        if self.hint.is_some() {
            return self.hint.clone();
        }
        let SourceOrigin::File(path) = &self.origin else {
            return None;
        };
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(Format::Json),
            "csv" => Some(Format::Comma),
            _ => None,
        }
    }

    /// Read the raw text of this source
    pub fn read(&self, reader: &dyn SourceReader) -> Result<String> {
        match &self.origin {
            SourceOrigin::Inline(text) => Ok(text.clone()),
            SourceOrigin::File(path) => {
                reader
                    .read_to_string(path)
                    .map_err(|source| SetOpsError::Io {
                        path: path.display().to_string(),
                        source,
                    })
            }
        }
    }
}

/// Reads file-backed sources
#[cfg_attr(test, mockall::automock)]
pub trait SourceReader {
    /// Read the whole file as UTF-8
    fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
}

/// [`SourceReader`] backed by the local filesystem
#[derive(Debug, Clone, Copy, Default)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Where formatted output goes
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputSink {
    /// Returned to the caller only
    #[default]
    Inline,
    /// Written to a file
    File(PathBuf),
}

impl OutputSink {
    /// Write `text` to the sink; a no-op for [`OutputSink::Inline`]
    pub fn write(&self, text: &str) -> Result<()> {
        match self {
            Self::Inline => Ok(()),
            Self::File(path) => std::fs::write(path, text).map_err(|source| SetOpsError::Io {
                path: path.display().to_string(),
                source,
            }),
        }
    }
}
