//! Simulated annealing over job orderings.
//!
//! The search space is the set of permutations of the input jobs. Every
//! candidate ordering is rebuilt with the round-robin builder and scored
//! with the overlap-aware makespan.
//!
//! # Submodules
//!
//! - [`config`]: Annealing parameters and JSON problem instances
//! - [`optimizer`]: The annealing loop and its telemetry

pub mod config;
pub mod optimizer;

pub use config::{AnnealingConfig, ProblemInstance, COOLING_RATE};
pub use optimizer::{
    swap_positions, AnnealingHistory, AnnealingOutcome, ScheduleOptimizer,
};
