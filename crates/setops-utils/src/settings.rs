//! Layered settings files
//!
//! Settings come from the user file (`~/.config/setops/config.json`) merged
//! with a project file (`.setops.json` in the working directory, or the file
//! named by `SETOPS_CONFIG`). Project values win. Command-line flags are
//! applied on top by the binary.
//!
//! ```json
//! {
//!   "caseSensitive": false,
//!   "sort": true,
//!   "outputFormat": "comma",
//!   "maxDepth": 32
//! }
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit settings file
pub const CONFIG_ENV: &str = "SETOPS_CONFIG";

/// Project-level settings file name
pub const PROJECT_FILE: &str = ".setops.json";

/// Errors raised while loading settings
#[derive(Error, Debug)]
pub enum SettingsError {
    /// File could not be read
    #[error("Failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// File is not valid settings JSON
    #[error("Failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Home directory could not be determined
    #[error("HOME or USERPROFILE not set")]
    NoHome,
}

/// Optional engine settings; `None` leaves the engine default in place
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub case_sensitive: Option<bool>,

    #[serde(default)]
    pub strip_quotes: Option<bool>,

    #[serde(default)]
    pub sort: Option<bool>,

    /// Format name as accepted by the `--output-format` flag
    #[serde(default)]
    pub output_format: Option<String>,

    #[serde(default)]
    pub max_depth: Option<usize>,

    #[serde(default)]
    pub max_expression_len: Option<usize>,
}

impl Settings {
    /// Load settings from a file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.display().to_string(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Load merged settings (user + project)
    ///
    /// A missing file is skipped; a present but malformed file is an error.
    pub fn load_merged() -> Result<Self, SettingsError> {
        let mut settings = match Self::user_path() {
            Ok(path) => Self::load_optional(&path)?.unwrap_or_default(),
            Err(_) => Self::default(),
        };

        let project = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(PROJECT_FILE));
        if let Some(project_settings) = Self::load_optional(&project)? {
            tracing::debug!(path = %project.display(), "loaded project settings");
            settings.merge(project_settings);
        }

        Ok(settings)
    }

    /// Path of the user-level settings file
    pub fn user_path() -> Result<PathBuf, SettingsError> {
        let home = std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .map_err(|_| SettingsError::NoHome)?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("setops")
            .join("config.json"))
    }

    /// Load a file if it exists
    pub fn load_optional(path: &Path) -> Result<Option<Self>, SettingsError> {
        if !path.is_file() {
            return Ok(None);
        }
        Self::from_file(path).map(Some)
    }

    /// Merge another layer into this one
    ///
    /// Values set in `other` take precedence.
    pub fn merge(&mut self, other: Settings) {
        self.case_sensitive = other.case_sensitive.or(self.case_sensitive);
        self.strip_quotes = other.strip_quotes.or(self.strip_quotes);
        self.sort = other.sort.or(self.sort);
        self.output_format = other.output_format.or(self.output_format.take());
        self.max_depth = other.max_depth.or(self.max_depth);
        self.max_expression_len = other.max_expression_len.or(self.max_expression_len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_settings_parsing() {
        let json = r#"{
            "caseSensitive": false,
            "outputFormat": "json",
            "maxDepth": 16
        }"#;

        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.case_sensitive, Some(false));
        assert_eq!(settings.output_format.as_deref(), Some("json"));
        assert_eq!(settings.max_depth, Some(16));
        assert!(settings.sort.is_none());
    }

    #[test]
    fn test_settings_merge() {
        let mut user = Settings {
            case_sensitive: Some(false),
            sort: Some(true),
            output_format: Some("comma".to_string()),
            ..Default::default()
        };
        let project = Settings {
            sort: Some(false),
            max_depth: Some(8),
            ..Default::default()
        };

        user.merge(project);
        assert_eq!(user.case_sensitive, Some(false));
        assert_eq!(user.sort, Some(false));
        assert_eq!(user.output_format.as_deref(), Some("comma"));
        assert_eq!(user.max_depth, Some(8));
    }

    #[test]
    fn test_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"stripQuotes": false, "maxExpressionLen": 256}"#).unwrap();

        let loaded = Settings::from_file(&path).unwrap();
        assert_eq!(
            loaded,
            Settings {
                strip_quotes: Some(false),
                max_expression_len: Some(256),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_load_optional_missing() {
        let dir = tempdir().unwrap();
        let loaded = Settings::load_optional(&dir.path().join("absent.json")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Settings::from_file(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Parse { .. }));
    }

    #[test]
    fn test_unknown_field_is_ignored() {
        let settings: Settings = serde_json::from_str(r#"{"sort": true, "color": "red"}"#).unwrap();
        assert_eq!(settings.sort, Some(true));
    }
}
