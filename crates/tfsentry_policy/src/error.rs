//! Error types for policy compilation.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for policy operations.
pub type PolicyResult<T> = Result<T, PolicyError>;

/// Errors that can occur while compiling policy into rules.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("policy source not found: {0}")]
    NotFound(PathBuf),

    #[error("rule compiler failed: {0}")]
    CompileFailure(String),

    #[error("rule compiler produced no documents")]
    EmptyOutput,

    #[error("tool error: {0}")]
    Exec(#[from] tfsentry_exec::ExecError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
