//! Domain error type shared by the tracker, application state and handlers

use axum::http::StatusCode;
use thiserror::Error;

/// Errors produced while mutating the exercise tracker
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackerError {
    /// No exercise with the given id exists
    #[error("exercise {0} not found")]
    NotFound(u64),

    /// An add-exercise submission failed validation
    #[error("invalid exercise: {0}")]
    InvalidExercise(String),

    /// A previous holder of the tracker lock panicked
    #[error("tracker state lock poisoned")]
    LockPoisoned,
}

impl TrackerError {
    /// HTTP status used when this error reaches a handler boundary.
    ///
    /// Invalid submissions are not surfaced as errors; handlers turn them
    /// into an `ignored` response before this is consulted.
    pub fn status_code(&self) -> StatusCode {
        match self {
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::InvalidExercise(_) => StatusCode::UNPROCESSABLE_ENTITY,
            TrackerError::LockPoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
