//! Error types for tool invocation.

use thiserror::Error;

/// Result type alias for tool invocation.
pub type ExecResult<T> = Result<T, ExecError>;

/// Errors that can occur while invoking an external tool.
#[derive(Error, Debug)]
pub enum ExecError {
    #[error("tool not found: {0}")]
    ToolNotFound(String),

    #[error("failed to spawn {program}: {message}")]
    Spawn { program: String, message: String },

    #[error("tool {0} timed out after {1} seconds")]
    Timeout(String, u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
