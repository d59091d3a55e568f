//! Grader error types.
//!
//! One crate-wide error enum covering every failure class the grading
//! pipeline can surface. Validation failures are the caller's fault and map
//! to 4xx responses at the API layer; everything else maps to 5xx.

use thiserror::Error;

/// Represents all error types that can occur in the grading pipeline.
#[derive(Debug, Error)]
pub enum GraderError {
    /// Missing or malformed request fields. Never retried.
    #[error("invalid request: {0}")]
    Validation(String),

    /// Repository or branch unreachable during workspace acquisition.
    #[error("failed to acquire repository: {0}")]
    Acquisition(String),

    /// The acquired workspace contained no gradable source files.
    /// A submission defect, not a system defect.
    #[error("no gradable source files found in submission")]
    EmptyCorpus,

    /// External scoring service failure, rate-limit, timeout, or a response
    /// that could not be parsed into the expected shape.
    #[error("scoring service failure: {0}")]
    Scoring(String),

    /// Result store read or write failure.
    #[error("review store failure: {0}")]
    Persistence(String),
}

impl GraderError {
    /// Stable machine-readable code for this error class, used in the
    /// failure body of the grading endpoint.
    pub fn code(&self) -> &'static str {
        match self {
            GraderError::Validation(_) => "VALIDATION_ERROR",
            GraderError::Acquisition(_) => "ACQUISITION_ERROR",
            GraderError::EmptyCorpus => "EMPTY_CORPUS",
            GraderError::Scoring(_) => "SCORING_ERROR",
            GraderError::Persistence(_) => "PERSISTENCE_ERROR",
        }
    }

    /// Whether this error is the caller's fault (4xx) rather than ours (5xx).
    pub fn is_client_error(&self) -> bool {
        matches!(self, GraderError::Validation(_))
    }
}
