//! Operation and job input model.
//!
//! A job is an ordered sequence of operations. Order encodes precedence:
//! operation *k* may only be processed once operation *k-1* is exhausted.
//!
//! # Reference
//! Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 1

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ScheduleResult;
use crate::validation::{ValidationError, ValidationErrorKind};

/// A unit of required processing time within a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation {
    /// Position within the parent job (1-based).
    pub id: u32,
    /// Processing time still required.
    pub time: u32,
}

impl Operation {
    /// Creates a new operation.
    pub fn new(id: u32, time: u32) -> Self {
        Self { id, time }
    }

    /// Whether no processing time remains.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.time < 1
    }
}

/// A job waiting to be scheduled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledJob {
    /// Job identity.
    pub job_id: u32,
    /// Operations in precedence order.
    pub operations: Vec<Operation>,
}

impl ScheduledJob {
    /// Creates a job with no operations.
    pub fn new(job_id: u32) -> Self {
        Self {
            job_id,
            operations: Vec::new(),
        }
    }

    /// Creates a job from processing times, numbering operations from 1.
    pub fn from_times(job_id: u32, times: &[u32]) -> Self {
        times
            .iter()
            .fold(Self::new(job_id), |job, &time| job.with_time(time))
    }

    /// Appends an operation.
    pub fn with_operation(mut self, operation: Operation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Appends an operation with the next sequence id.
    ///
    /// Ids saturate at `u32::MAX`; `validate_input` rejects the repeated id.
    pub fn with_time(self, time: u32) -> Self {
        let id = u32::try_from(self.operations.len()).map_or(u32::MAX, |n| n.saturating_add(1));
        self.with_operation(Operation::new(id, time))
    }

    /// Total processing time across all operations.
    pub fn total_time(&self) -> u64 {
        self.operations.iter().map(|op| u64::from(op.time)).sum()
    }

    /// Whether this job has any operations.
    pub fn has_operations(&self) -> bool {
        !self.operations.is_empty()
    }

    /// Number of operations.
    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }
}

/// Generates random jobs `1..=num_jobs` in shuffled order.
///
/// Each job receives `operations_per_job` operations with processing
/// times drawn uniformly from `1..=max_time`.
///
/// # Errors
/// `Configuration` if `max_time` is zero.
pub fn generate_jobs<R: Rng>(
    num_jobs: u32,
    operations_per_job: u32,
    max_time: u32,
    rng: &mut R,
) -> ScheduleResult<Vec<ScheduledJob>> {
    if max_time == 0 {
        return Err(vec![ValidationError {
            kind: ValidationErrorKind::InvalidTimeRange,
            message: "Maximum operation time must be at least 1".into(),
        }]
        .into());
    }

    let mut jobs: Vec<ScheduledJob> = (1..=num_jobs)
        .map(|job_id| {
            (0..operations_per_job).fold(ScheduledJob::new(job_id), |job, _| {
                job.with_time(rng.random_range(1..=max_time))
            })
        })
        .collect();
    jobs.shuffle(rng);
    Ok(jobs)
}
