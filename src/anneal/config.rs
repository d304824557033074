//! Annealing parameters and complete problem instances.

use serde::{Deserialize, Serialize};

use crate::error::ScheduleResult;
use crate::models::ScheduledJob;
use crate::scheduler::SchedulerConfig;
use crate::validation::{validate_annealing, validate_input};

/// Geometric cooling factor applied after every iteration.
pub const COOLING_RATE: f64 = 0.99;

/// Simulated annealing parameters.
///
/// Missing fields fall back to the defaults when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnealingConfig {
    /// Starting temperature (default 1000).
    pub initial_temperature: f64,
    /// Length of the telemetry series, including the initial schedule (default 400).
    pub iterations: usize,
    /// RNG seed; `None` seeds from the operating system.
    pub seed: Option<u64>,
}

impl Default for AnnealingConfig {
    fn default() -> Self {
        Self {
            initial_temperature: 1000.0,
            iterations: 400,
            seed: None,
        }
    }
}

impl AnnealingConfig {
    /// Sets the starting temperature.
    pub fn with_initial_temperature(mut self, temperature: f64) -> Self {
        self.initial_temperature = temperature;
        self
    }

    /// Sets the iteration count.
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Fixes the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// A complete scheduling problem: machine pool, jobs in their initial
/// order, and annealing parameters.
///
/// # Example
///
/// ```
/// use u_jobshop::anneal::ProblemInstance;
///
/// let problem = ProblemInstance::from_json(r#"{
///     "machines": 2,
///     "quantum": 2,
///     "jobs": [
///         {"job_id": 1, "operations": [{"id": 1, "time": 3}, {"id": 2, "time": 6}]}
///     ]
/// }"#).unwrap();
/// assert_eq!(problem.annealing.iterations, 400);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemInstance {
    /// Number of interchangeable machines.
    pub machines: usize,
    /// Work one machine can absorb per round.
    pub quantum: u32,
    /// Jobs in their initial order.
    pub jobs: Vec<ScheduledJob>,
    /// Optional; defaults apply when absent.
    #[serde(default)]
    pub annealing: AnnealingConfig,
}

impl ProblemInstance {
    /// Parses and validates a problem from JSON.
    ///
    /// # Errors
    /// `Json` if the text does not parse, `Configuration` if the jobs or
    /// parameters are unusable.
    pub fn from_json(text: &str) -> ScheduleResult<Self> {
        let problem: Self = serde_json::from_str(text)?;
        problem.validate()?;
        Ok(problem)
    }

    /// Machine pool parameters for the builder.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new(self.machines, self.quantum)
    }

    /// Runs every input and parameter check, reporting all issues together.
    pub fn validate(&self) -> ScheduleResult<()> {
        let mut errors = Vec::new();
        if let Err(mut e) = validate_input(&self.jobs, &self.scheduler_config()) {
            errors.append(&mut e);
        }
        if let Err(mut e) = validate_annealing(&self.annealing) {
            errors.append(&mut e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors.into())
        }
    }
}
