//! Error types for the evaluation engine.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can abort a run.
///
/// Row-level problems (malformed numerics, missing categorical fields) never
/// surface here; they are tolerated according to the configured
/// [`NumericPolicy`](crate::records::NumericPolicy).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Rule definitions file not found: {}", .0.display())]
    RulesFileMissing(PathBuf),

    #[error("Invalid rule manifest: {0}")]
    InvalidRuleManifest(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read or write table: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A value that does not name any variant of a fixed vocabulary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind}: '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
