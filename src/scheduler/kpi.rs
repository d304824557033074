//! Schedule quality metrics (KPIs).
//!
//! Computes performance indicators from a built schedule and the machine
//! pool it was built for.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Makespan (C_max) | Sum of per-round maxima |
//! | Total Work | Sum of all slice durations |
//! | Idle Time | Makespan × machines - total work |
//! | Quantum Shortfall | Sum of `Q - slice` over every job's slices |
//! | Rounds | Number of round groups across all jobs |
//! | Utilization | Total work / (makespan × machines) |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use super::SchedulerConfig;
use crate::models::{EdgeKey, Schedule};

/// Schedule performance indicators.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleKpi {
    /// Overlap-aware completion time.
    pub makespan: u64,
    /// Total processed time.
    pub total_work: u64,
    /// Machine time within the makespan not spent working.
    pub idle_time: u64,
    /// Per-job `Q - slice` totals; a shared round is counted by each job.
    pub quantum_shortfall: u64,
    /// Number of distinct rounds across all jobs.
    pub rounds: usize,
    /// Fraction of machine time spent working (0.0..1.0).
    pub utilization: f64,
    /// Makespan contribution per job ID.
    pub makespan_by_job: HashMap<u32, u64>,
}

impl ScheduleKpi {
    /// Computes KPIs for a schedule built with `config`.
    pub fn calculate(schedule: &Schedule, config: &SchedulerConfig) -> Self {
        let makespan = schedule.makespan();
        let total_work = schedule.total_work();

        let mut rounds = 0;
        for job in &schedule.jobs {
            let mut groups: HashSet<&[EdgeKey]> = HashSet::new();
            for link in job.operations.links() {
                if !link.parallel_machines.is_empty() {
                    groups.insert(link.parallel_machines.as_slice());
                }
            }
            rounds += groups.len();
        }

        let capacity = makespan * config.machines as u64;
        let utilization = if capacity > 0 {
            total_work as f64 / capacity as f64
        } else {
            0.0
        };

        let makespan_by_job = schedule
            .jobs
            .iter()
            .map(|j| (j.id, j.makespan()))
            .collect();

        Self {
            makespan,
            total_work,
            idle_time: capacity.saturating_sub(total_work),
            quantum_shortfall: schedule.quantum_shortfall(),
            rounds,
            utilization,
            makespan_by_job,
        }
    }
}
