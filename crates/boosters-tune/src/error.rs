//! Call-level errors of the grid search.
//!
//! Per-combination failures never surface here: they become records with
//! unavailable metrics (see [`crate::tune::ResultRecord`]).

/// Errors that abort a whole [`GridSearchRunner::run`](crate::tune::GridSearchRunner::run).
#[derive(Debug, thiserror::Error)]
pub enum TuneError {
    /// Rejected before any cross-validation call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The cross-validation backend cannot be invoked at all.
    #[error("grid search aborted: {0}")]
    CollaboratorUnavailable(String),
}

pub type Result<T> = std::result::Result<T, TuneError>;
