//! Error types for event synthesis.

use thiserror::Error;

/// Result type alias for synthesis operations.
pub type EventsResult<T> = Result<T, EventsError>;

/// Errors that can occur during event synthesis.
#[derive(Error, Debug)]
pub enum EventsError {
    #[error("no synthesizer registered for event format: {0}")]
    UnsupportedFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
