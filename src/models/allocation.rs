//! Remaining-time bookkeeping for a single schedule build.
//!
//! `JobAllocations` is rebuilt from the job list at the start of every
//! build and drained to zero as slices are handed out. Input jobs are
//! never touched.

use std::collections::{BTreeMap, HashMap};

use super::ScheduledJob;
use crate::error::{ScheduleError, ScheduleResult};

/// Mapping `job_id → (operation_id → remaining time)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobAllocations {
    remaining: HashMap<u32, BTreeMap<u32, u32>>,
}

impl JobAllocations {
    /// Snapshots remaining time for every operation of every job.
    pub fn from_jobs<'a, I>(jobs: I) -> Self
    where
        I: IntoIterator<Item = &'a ScheduledJob>,
    {
        let mut remaining: HashMap<u32, BTreeMap<u32, u32>> = HashMap::new();
        for job in jobs {
            let entry = remaining.entry(job.job_id).or_default();
            for op in &job.operations {
                entry.insert(op.id, op.time);
            }
        }
        Self { remaining }
    }

    /// Remaining time of one operation.
    pub fn operation_remaining(&self, job_id: u32, operation_id: u32) -> Option<u32> {
        self.remaining.get(&job_id)?.get(&operation_id).copied()
    }

    /// Total remaining time of a job (0 for unknown jobs).
    pub fn job_remaining(&self, job_id: u32) -> u64 {
        self.remaining
            .get(&job_id)
            .map(|ops| ops.values().map(|&t| u64::from(t)).sum())
            .unwrap_or(0)
    }

    /// Whether every operation of the job is exhausted.
    pub fn is_exhausted(&self, job_id: u32) -> bool {
        self.job_remaining(job_id) == 0
    }

    /// The first operation of the job with time left, if any.
    pub fn current_operation(&self, job_id: u32) -> Option<u32> {
        self.remaining
            .get(&job_id)?
            .iter()
            .find(|(_, time)| **time > 0)
            .map(|(&id, _)| id)
    }

    /// Consumes `amount` units from the job in operation order.
    ///
    /// Work starts on the current operation and moves to the next one
    /// once it is exhausted. Asking for more than the job has left is an
    /// invariant violation: the allocation is left untouched.
    pub fn consume(&mut self, job_id: u32, amount: u32) -> ScheduleResult<()> {
        let available = self.job_remaining(job_id);
        if u64::from(amount) > available {
            return Err(ScheduleError::InvariantViolation(format!(
                "job {job_id}: consuming {amount} would leave negative remaining time ({available} left)"
            )));
        }

        let ops = self.remaining.get_mut(&job_id).ok_or_else(|| {
            ScheduleError::InvariantViolation(format!("job {job_id} has no allocation"))
        })?;

        let mut left = amount;
        for time in ops.values_mut() {
            if left == 0 {
                break;
            }
            let take = left.min(*time);
            *time -= take;
            left -= take;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> JobAllocations {
        let jobs = vec![
            ScheduledJob::from_times(1, &[3, 6]),
            ScheduledJob::from_times(2, &[10, 1]),
        ];
        JobAllocations::from_jobs(&jobs)
    }

    #[test]
    fn test_from_jobs() {
        let alloc = sample();
        assert_eq!(alloc.operation_remaining(1, 1), Some(3));
        assert_eq!(alloc.operation_remaining(2, 2), Some(1));
        assert_eq!(alloc.operation_remaining(3, 1), None);
        assert_eq!(alloc.job_remaining(1), 9);
        assert_eq!(alloc.job_remaining(99), 0);
    }

    #[test]
    fn test_consume_spills_into_next_operation() {
        let mut alloc = sample();
        alloc.consume(1, 2).unwrap();
        assert_eq!(alloc.current_operation(1), Some(1));
        assert_eq!(alloc.operation_remaining(1, 1), Some(1));

        alloc.consume(1, 2).unwrap();
        assert_eq!(alloc.operation_remaining(1, 1), Some(0));
        assert_eq!(alloc.operation_remaining(1, 2), Some(5));
        assert_eq!(alloc.current_operation(1), Some(2));
    }

    #[test]
    fn test_consume_to_exhaustion() {
        let mut alloc = sample();
        alloc.consume(2, 11).unwrap();
        assert!(alloc.is_exhausted(2));
        assert_eq!(alloc.current_operation(2), None);
        assert!(!alloc.is_exhausted(1));
    }

    #[test]
    fn test_overdraw_is_invariant_violation() {
        let mut alloc = sample();
        let err = alloc.consume(1, 10).unwrap_err();
        assert!(matches!(err, ScheduleError::InvariantViolation(_)));
        // Untouched on failure
        assert_eq!(alloc.job_remaining(1), 9);
    }

    #[test]
    fn test_unknown_job_is_invariant_violation() {
        let mut alloc = sample();
        assert!(alloc.consume(42, 0).is_err());
    }
}
