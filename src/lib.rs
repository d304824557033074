//! Round-robin job-shop scheduling.
//!
//! Jobs made of timed operations are time-sliced across a pool of
//! identical machines, one quantum per machine per round. The resulting
//! schedule is a set of per-job graphs whose links carry slice durations
//! and are grouped by the round they ran in. Job order affects how rounds
//! fill up, so the crate also searches orderings for a lower makespan.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `ScheduledJob`, `Operation`, `JobGraph`,
//!   `Schedule`, and the node-link wire format
//! - **`scheduler`**: `ScheduleBuilder`, overlap-aware makespan, KPIs
//! - **`anneal`**: Simulated annealing over job orderings
//! - **`validation`**: Input and parameter checks
//! - **`error`**: `ScheduleError` and the `ScheduleResult` alias
//!
//! # Example
//!
//! ```
//! use u_jobshop::models::ScheduledJob;
//! use u_jobshop::scheduler::{ScheduleBuilder, SchedulerConfig};
//!
//! let jobs = vec![
//!     ScheduledJob::from_times(1, &[3, 6]),
//!     ScheduledJob::from_times(2, &[10, 1]),
//!     ScheduledJob::from_times(3, &[3, 2]),
//!     ScheduledJob::from_times(4, &[2, 4]),
//!     ScheduledJob::from_times(5, &[8, 8]),
//! ];
//! let schedule = ScheduleBuilder::new(SchedulerConfig::new(2, 2))
//!     .build_schedule(&jobs)
//!     .unwrap();
//! assert_eq!(schedule.makespan(), 27);
//! ```
//!
//! # References
//!
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems"
//! - Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

pub mod anneal;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{ScheduleError, ScheduleResult};
