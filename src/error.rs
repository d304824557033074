//! Scheduler error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur while building, evaluating, or optimizing schedules.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid configuration: {}", join_messages(.0))]
    Configuration(Vec<ValidationError>),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),

    #[error("job {job_id} did not finish within {limit} rounds")]
    NonTermination { job_id: u32, limit: u64 },

    #[error("malformed schedule graph: {0}")]
    Format(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScheduleError {
    /// Whether this error came from input or parameter validation.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<Vec<ValidationError>> for ScheduleError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Configuration(errors)
    }
}

fn join_messages(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
