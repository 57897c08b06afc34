//! Error types for grammar and configuration loading.

use std::path::PathBuf;

use thiserror::Error;
use usage_grammar_match::InvalidGrammar;

/// Errors that can occur while loading grammars or run configuration.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// File extension is not one of `json`, `yaml`, `yml`.
    #[error("unsupported grammar file format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// Document parsed but failed grammar validation.
    #[error(transparent)]
    InvalidGrammar(#[from] InvalidGrammar),
}

/// Convenience alias for results with [`LoaderError`].
pub type Result<T> = std::result::Result<T, LoaderError>;
