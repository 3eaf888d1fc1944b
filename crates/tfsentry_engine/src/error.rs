//! Error types for the validation engine.

use thiserror::Error;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that can occur during validation.
#[derive(Error, Debug)]
pub enum EngineError {
    /// The external evaluator failed or produced no usable verdict for
    /// some rule/event pair. A missing verdict is never pass or fail.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    #[error("tool error: {0}")]
    Exec(#[from] tfsentry_exec::ExecError),

    #[error("front end error: {0}")]
    Frontend(#[from] tfsentry_frontend::FrontendError),

    #[error("event synthesis error: {0}")]
    Events(#[from] tfsentry_events::EventsError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
