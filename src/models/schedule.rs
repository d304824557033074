//! Schedule (solution) model.
//!
//! A schedule is the ordered list of built job graphs produced by one
//! builder run. It is evaluated once by the makespan calculator and then
//! either kept as the annealer's current solution or discarded.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::graph::{JobGraph, NodeId};
use super::node_link::NodeLinkGraph;
use crate::error::ScheduleResult;
use crate::scheduler::makespan;

/// A built job: its identity plus the graph of processed slices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Job identity.
    pub id: u32,
    /// Slices and their round groups.
    pub operations: JobGraph,
    /// Sum of `Q - slice` over this job's own slices.
    ///
    /// Capacity a job leaves in an open round may be filled by the next
    /// job, which then counts its own shortfall for the same machine. For
    /// machine time actually spent idle see `ScheduleKpi::idle_time`.
    pub idle_time: u64,
}

/// Serialized form of a [`Job`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Job identity.
    pub id: u32,
    /// Node-link form of the job graph.
    pub operations: NodeLinkGraph,
}

impl Job {
    /// Creates a built job with no idle time recorded.
    pub fn new(id: u32, operations: JobGraph) -> Self {
        Self {
            id,
            operations,
            idle_time: 0,
        }
    }

    /// Sets the idle time.
    pub fn with_idle_time(mut self, idle_time: u64) -> Self {
        self.idle_time = idle_time;
        self
    }

    /// Makespan contribution of this job alone.
    pub fn makespan(&self) -> u64 {
        makespan::job_makespan(&self.operations, false)
    }

    /// Converts to the node-link record form.
    pub fn to_record(&self) -> JobRecord {
        JobRecord {
            id: self.id,
            operations: self.operations.to_node_link(),
        }
    }

    /// Rebuilds a job from its record form. Idle time is not part of the
    /// wire format and comes back as 0.
    pub fn from_record(record: JobRecord) -> ScheduleResult<Self> {
        Ok(Self::new(record.id, JobGraph::from_node_link(record.operations)?))
    }
}

/// A complete candidate solution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schedule {
    /// Built jobs in processing order.
    pub jobs: Vec<Job>,
    /// Log each round's makespan contribution.
    pub debug: bool,
}

impl Schedule {
    /// Creates a schedule from built jobs.
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { jobs, debug: false }
    }

    /// Enables or disables per-round logging.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Total completion time, collapsing concurrent slices per round.
    pub fn makespan(&self) -> u64 {
        makespan::compute_makespan(self)
    }

    /// Job identities in processing order.
    pub fn job_order(&self) -> Vec<u32> {
        self.jobs.iter().map(|j| j.id).collect()
    }

    /// Finds a built job by id.
    pub fn job(&self, id: u32) -> Option<&Job> {
        self.jobs.iter().find(|j| j.id == id)
    }

    /// Sum of every job's `idle_time`.
    pub fn quantum_shortfall(&self) -> u64 {
        self.jobs.iter().map(|j| j.idle_time).sum()
    }

    /// Total processed time across all links.
    pub fn total_work(&self) -> u64 {
        self.jobs.iter().map(|j| j.operations.total_weight()).sum()
    }

    /// Number of jobs.
    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Nodes that no link enters, across all job graphs.
    ///
    /// For a builder-produced schedule this is exactly the start node.
    pub fn root_nodes(&self) -> Vec<NodeId> {
        let targets: HashSet<&NodeId> = self
            .jobs
            .iter()
            .flat_map(|j| j.operations.links().iter().map(|l| &l.target))
            .collect();

        let mut seen = HashSet::new();
        self.jobs
            .iter()
            .flat_map(|j| j.operations.nodes().iter())
            .filter(|id| !targets.contains(id) && seen.insert(*id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Link;

    fn two_slice_job(id: u32) -> Job {
        let mut g = JobGraph::new();
        g.add_link(Link::new("start", "a", 2));
        g.add_link(Link::new("a", "b", 1));
        Job::new(id, g).with_idle_time(1)
    }

    #[test]
    fn test_empty_schedule() {
        let s = Schedule::new(Vec::new());
        assert_eq!(s.makespan(), 0);
        assert_eq!(s.job_count(), 0);
        assert!(s.root_nodes().is_empty());
    }

    #[test]
    fn test_schedule_accessors() {
        let s = Schedule::new(vec![two_slice_job(4), two_slice_job(1)]).with_debug(true);
        assert!(s.debug);
        assert_eq!(s.job_order(), vec![4, 1]);
        assert_eq!(s.quantum_shortfall(), 2);
        assert_eq!(s.total_work(), 6);
        assert!(s.job(1).is_some());
        assert!(s.job(9).is_none());
    }

    #[test]
    fn test_root_nodes() {
        let s = Schedule::new(vec![two_slice_job(1)]);
        assert_eq!(s.root_nodes(), vec![NodeId::start()]);
    }

    #[test]
    fn test_job_record_round_trip() {
        let job = two_slice_job(3);
        let json = serde_json::to_string(&job.to_record()).unwrap();
        let record: JobRecord = serde_json::from_str(&json).unwrap();
        let restored = Job::from_record(record).unwrap();

        assert_eq!(restored.id, 3);
        assert_eq!(restored.operations, job.operations);
        assert_eq!(restored.idle_time, 0);
    }
}
