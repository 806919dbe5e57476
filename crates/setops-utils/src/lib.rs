//! Shared utilities for setops
//!
//! This crate provides the ambient pieces used by the setops binaries:
//! tracing setup and layered settings files.

pub mod logging;
pub mod settings;

pub use logging::init_tracing;
pub use settings::{Settings, SettingsError};
