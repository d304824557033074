//! Input validation for scheduling problems.
//!
//! Checks structural integrity of jobs and parameters before any build
//! attempt. Detects:
//! - Zero machines or a zero time quantum
//! - Empty job lists and jobs without operations
//! - Duplicate job IDs
//! - Operation IDs that are not the sequence `1..=n`
//! - Unusable annealing parameters
//!
//! Every check runs; all detected issues are reported together.

use std::collections::HashSet;

use crate::anneal::AnnealingConfig;
use crate::models::ScheduledJob;
use crate::scheduler::SchedulerConfig;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Machine count is zero.
    NoMachines,
    /// Time quantum is zero.
    ZeroQuantum,
    /// No jobs to schedule.
    EmptyJobList,
    /// A job has no operations.
    EmptyJob,
    /// Two jobs share the same ID.
    DuplicateId,
    /// Operation IDs do not follow the job's sequence.
    OperationSequence,
    /// Initial temperature is not a positive finite number.
    InvalidTemperature,
    /// Iteration count is zero.
    ZeroIterations,
    /// Random operation times have an empty range.
    InvalidTimeRange,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates jobs and scheduler parameters.
///
/// Checks:
/// 1. At least one machine
/// 2. Positive time quantum
/// 3. At least one job
/// 4. No duplicate job IDs
/// 5. Every job has at least one operation
/// 6. Operation IDs run `1, 2, ..., n` in order
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(jobs: &[ScheduledJob], config: &SchedulerConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if config.machines == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::NoMachines,
            "Machine count must be at least 1",
        ));
    }
    if config.quantum == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroQuantum,
            "Time quantum must be at least 1",
        ));
    }

    if jobs.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyJobList,
            "No jobs to schedule",
        ));
    }

    let mut job_ids = HashSet::new();
    for job in jobs {
        if !job_ids.insert(job.job_id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate job ID: {}", job.job_id),
            ));
        }

        if job.operations.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyJob,
                format!("Job {} has no operations", job.job_id),
            ));
        }

        for (expected, op) in (1..).zip(&job.operations) {
            if op.id != expected {
                errors.push(ValidationError::new(
                    ValidationErrorKind::OperationSequence,
                    format!(
                        "Job {}: operation at position {} has ID {}",
                        job.job_id, expected, op.id
                    ),
                ));
                break;
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validates annealing parameters.
pub fn validate_annealing(config: &AnnealingConfig) -> ValidationResult {
    let mut errors = Vec::new();

    if !(config.initial_temperature.is_finite() && config.initial_temperature > 0.0) {
        errors.push(ValidationError::new(
            ValidationErrorKind::InvalidTemperature,
            format!(
                "Initial temperature must be positive and finite, got {}",
                config.initial_temperature
            ),
        ));
    }
    if config.iterations == 0 {
        errors.push(ValidationError::new(
            ValidationErrorKind::ZeroIterations,
            "Iteration count must be at least 1",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
