//! Shared error types for the services crate.

use thiserror::Error;

use coach_core::model::{SessionSummaryError, WorkoutError};
use storage::repository::SourceError;

/// Errors emitted by session services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("invalid workout: {0}")]
    InvalidWorkout(#[from] WorkoutError),
    #[error("session ended without a summary")]
    Closed,
    #[error(transparent)]
    Summary(#[from] SessionSummaryError),
    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Errors emitted while building a `SessionConfig`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("tick period must be greater than zero")]
    ZeroTick,
    #[error("invalid rest seconds: {raw}")]
    InvalidRestSecs { raw: String },
}
