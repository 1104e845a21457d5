//! Error types.
//!
//! Generation itself can only fail on its preconditions. Everything else a
//! run encounters (conflicting candidates, unfillable slots) is resolved
//! inside the engine and never surfaces as an error.

use chrono::NaiveDate;

use crate::validation::ValidationError;

/// Why a generation run refused to start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreconditionError {
    #[error("cannot generate: no employees configured")]
    NoEmployees,
    #[error("cannot generate: no shifts configured")]
    NoShifts,
    #[error("cannot generate: start date {start} must be before end date {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },
}

/// Storage failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid stored data: {0}")]
    Json(#[from] serde_json::Error),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Failures of the generation service.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("a generation run is already in progress for this roster")]
    Busy,
    #[error("the stored schedule changed after the proposal was made")]
    StaleProposal,
    #[error("invalid configuration: {}", join_messages(.0))]
    Invalid(Vec<ValidationError>),
    #[error(transparent)]
    Precondition(#[from] PreconditionError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
