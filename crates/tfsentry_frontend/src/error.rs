//! Error types for the front-end stage.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for front-end operations.
pub type FrontendResult<T> = Result<T, FrontendError>;

/// Errors that can occur during discovery and compilation.
#[derive(Error, Debug)]
pub enum FrontendError {
    #[error("source root not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no front end registered for language: {0}")]
    UnsupportedLanguage(String),

    #[error("failed to parse {file}: {message}")]
    ParseFailure { file: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
