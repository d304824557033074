//! Round-robin schedule graph builder.
//!
//! # Algorithm
//!
//! Machines are visited in a fixed rotation `1..=M`. One pass over the
//! rotation is a *round*, during which each machine can absorb at most
//! `Q` units of work (the quantum).
//!
//! 1. The machine under the cursor receives `min(spare capacity, job's
//!    remaining time)`. The slice drains the job's current operation and
//!    continues into the next one once it is exhausted.
//! 2. Each slice becomes a node, linked from the machine's previous node
//!    (or the job's entry node) with the slice as weight.
//! 3. The cursor moves on once the machine's capacity is used up.
//!    Wrapping past machine `M` closes the round: every link the job
//!    created in it is tagged with the round's `parallel_machines` group.
//! 4. When a job finishes mid-round, the cursor stays put and the next
//!    job continues with whatever capacity the round has left.
//!
//! # Complexity
//! O(W / Q + M) slices per job, where W is the job's total processing time.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{
    EdgeKey, Job, JobAllocations, JobGraph, Link, NodeId, Schedule, ScheduledJob,
};
use crate::validation::validate_input;

/// Machine pool parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Number of interchangeable machines.
    pub machines: usize,
    /// Work one machine can absorb per round.
    pub quantum: u32,
}

impl SchedulerConfig {
    /// Creates a configuration.
    pub fn new(machines: usize, quantum: u32) -> Self {
        Self { machines, quantum }
    }
}

/// Machine-rotation state threaded from one job build to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineCursor {
    machine: usize,
    spare: Vec<u32>,
    quantum: u32,
    rounds_closed: u64,
}

impl MachineCursor {
    /// A cursor at machine 1 with a fresh round.
    pub fn new(config: &SchedulerConfig) -> Self {
        Self {
            machine: 0,
            spare: vec![config.quantum; config.machines],
            quantum: config.quantum,
            rounds_closed: 0,
        }
    }

    /// Current machine (1-based).
    pub fn machine(&self) -> usize {
        self.machine + 1
    }

    /// Capacity the current machine has left in the open round.
    pub fn spare(&self) -> u32 {
        self.spare[self.machine]
    }

    /// Capacity left per machine in the open round.
    pub fn spare_capacity(&self) -> &[u32] {
        &self.spare
    }

    /// Number of rounds closed since the cursor was created.
    pub fn rounds_closed(&self) -> u64 {
        self.rounds_closed
    }

    /// Whether this cursor was made for `config`'s machine pool.
    pub fn fits(&self, config: &SchedulerConfig) -> bool {
        self.spare.len() == config.machines && self.quantum == config.quantum
    }

    fn occupy(&mut self, amount: u32) {
        self.spare[self.machine] -= amount;
    }

    /// Moves to the next machine. Returns `true` if this closed the round.
    fn advance(&mut self) -> bool {
        self.machine += 1;
        if self.machine < self.spare.len() {
            return false;
        }
        self.machine = 0;
        self.spare.fill(self.quantum);
        self.rounds_closed += 1;
        true
    }
}

/// Result of building one job.
#[derive(Debug, Clone)]
pub struct JobBuild {
    /// The built job graph.
    pub job: Job,
    /// Cursor to hand to the next job.
    pub cursor: MachineCursor,
    /// Last node produced (the next job's entry node).
    pub last_node: NodeId,
}

/// Builds time-sliced schedule graphs.
///
/// # Example
///
/// ```
/// use u_jobshop::models::ScheduledJob;
/// use u_jobshop::scheduler::{ScheduleBuilder, SchedulerConfig};
///
/// let jobs = vec![
///     ScheduledJob::from_times(1, &[3, 6]),
///     ScheduledJob::from_times(2, &[10, 1]),
/// ];
/// let builder = ScheduleBuilder::new(SchedulerConfig::new(2, 2));
/// let schedule = builder.build_schedule(&jobs).unwrap();
/// assert_eq!(schedule.job_order(), vec![1, 2]);
/// assert_eq!(schedule.total_work(), 20);
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleBuilder {
    config: SchedulerConfig,
}

impl ScheduleBuilder {
    /// Creates a builder.
    pub fn new(config: SchedulerConfig) -> Self {
        Self { config }
    }

    /// Machine pool this builder schedules onto.
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// A fresh cursor for this builder's machine pool.
    pub fn cursor(&self) -> MachineCursor {
        MachineCursor::new(&self.config)
    }

    /// Builds the full schedule for `jobs` in the given order.
    ///
    /// The rotation starts at machine 1 with a fresh round on every call,
    /// so the result depends only on the jobs and the configuration.
    ///
    /// # Errors
    /// `Configuration` if validation fails; `NonTermination` or
    /// `InvariantViolation` if a job cannot be drained.
    pub fn build_schedule(&self, jobs: &[ScheduledJob]) -> ScheduleResult<Schedule> {
        validate_input(jobs, &self.config)?;
        self.build_unchecked(jobs.iter())
    }

    /// Builds one job starting from `entry` with the given cursor.
    ///
    /// # Errors
    /// `Configuration` if the job is invalid; `InvariantViolation` if the
    /// cursor was made for a different machine pool.
    pub fn build_job(
        &self,
        job: &ScheduledJob,
        entry: &NodeId,
        cursor: MachineCursor,
    ) -> ScheduleResult<JobBuild> {
        validate_input(std::slice::from_ref(job), &self.config)?;
        if !cursor.fits(&self.config) {
            return Err(ScheduleError::InvariantViolation(format!(
                "cursor for {} machines with quantum {} used with {} machines and quantum {}",
                cursor.spare.len(),
                cursor.quantum,
                self.config.machines,
                self.config.quantum
            )));
        }
        let mut allocations = JobAllocations::from_jobs([job]);
        self.drain_job(job.job_id, &mut allocations, entry, cursor)
    }

    /// Builds jobs that have already been validated together.
    pub(crate) fn build_unchecked<'a, I>(&self, jobs: I) -> ScheduleResult<Schedule>
    where
        I: Iterator<Item = &'a ScheduledJob> + Clone,
    {
        let mut allocations = JobAllocations::from_jobs(jobs.clone());
        let mut cursor = self.cursor();
        let mut entry = NodeId::start();
        let mut built = Vec::new();

        for job in jobs {
            let result = self.drain_job(job.job_id, &mut allocations, &entry, cursor)?;
            cursor = result.cursor;
            entry = result.last_node;
            built.push(result.job);
        }

        Ok(Schedule::new(built))
    }

    fn drain_job(
        &self,
        job_id: u32,
        allocations: &mut JobAllocations,
        entry: &NodeId,
        mut cursor: MachineCursor,
    ) -> ScheduleResult<JobBuild> {
        let quantum = self.config.quantum;
        let limit = round_limit(allocations.job_remaining(job_id), quantum);

        let mut graph = JobGraph::new();
        graph.add_node(entry.clone());

        let mut previous = vec![entry.clone(); self.config.machines];
        let mut sequence = vec![0u32; self.config.machines];
        let mut round: Vec<EdgeKey> = Vec::new();
        let mut rounds: u64 = 1;
        let mut idle: u64 = 0;
        let mut last_node = entry.clone();

        while !allocations.is_exhausted(job_id) {
            let idx = cursor.machine;
            let remaining = allocations.job_remaining(job_id);
            let slice = u32::try_from(remaining).map_or(cursor.spare(), |r| r.min(cursor.spare()));

            if slice > 0 {
                allocations.consume(job_id, slice)?;
                cursor.occupy(slice);

                sequence[idx] += 1;
                let node = NodeId::slice(job_id, idx + 1, sequence[idx]);
                let link = Link::new(previous[idx].clone(), node.clone(), slice);
                trace!(
                    job = job_id,
                    machine = idx + 1,
                    slice,
                    source = %link.source,
                    target = %link.target,
                    "assigned slice"
                );
                round.push(link.key());
                graph.add_link(link);

                previous[idx] = node.clone();
                last_node = node;
                idle += u64::from(quantum - slice);
            }

            if cursor.spare() == 0 && cursor.advance() {
                close_round(&mut graph, &mut round);
                rounds += 1;
                if rounds > limit {
                    warn!(job = job_id, limit, "round limit exceeded");
                    return Err(ScheduleError::NonTermination { job_id, limit });
                }
            }
        }
        close_round(&mut graph, &mut round);

        debug!(
            job = job_id,
            slices = graph.link_count(),
            idle,
            next_machine = cursor.machine(),
            "built job"
        );

        Ok(JobBuild {
            job: Job::new(job_id, graph).with_idle_time(idle),
            cursor,
            last_node,
        })
    }
}

/// Upper bound on the rounds one job may span.
///
/// Only the first round can be partial, so a job never needs more than
/// `ceil(total / quantum) + 2` rounds.
fn round_limit(total: u64, quantum: u32) -> u64 {
    total.div_ceil(u64::from(quantum.max(1))) + 2
}

/// Tags every link of the finished round with the round's group.
fn close_round(graph: &mut JobGraph, round: &mut Vec<EdgeKey>) {
    if round.is_empty() {
        return;
    }
    let group = std::mem::take(round);
    for key in &group {
        graph.set_parallel_machines(key, group.clone());
    }
}
