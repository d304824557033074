//! Schedule construction and evaluation.
//!
//! # Algorithm
//!
//! `ScheduleBuilder` time-slices every job across a rotating pool of
//! identical machines, one quantum per machine per round. The rotation
//! carries over from one job to the next, so job order changes how
//! rounds are filled and therefore the makespan.
//!
//! `compute_makespan` sums, per round, the longest slice rather than
//! all slices: machines in one round run concurrently.
//!
//! # KPI
//!
//! `ScheduleKpi` adds total work, idle time, round count and utilization.
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 5
//! - Silberschatz et al. (2018), "Operating System Concepts", Ch. 5.3 (Round-Robin)

mod builder;
mod kpi;
pub mod makespan;

pub use builder::{JobBuild, MachineCursor, ScheduleBuilder, SchedulerConfig};
pub use kpi::ScheduleKpi;
pub use makespan::{compute_makespan, job_makespan};
