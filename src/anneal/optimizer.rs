//! Simulated annealing over job orderings.
//!
//! # Algorithm
//!
//! 1. Build the schedule for the initial ordering; this is the current state.
//! 2. Each step swaps two distinct positions of the current ordering and
//!    rebuilds the schedule from scratch.
//! 3. With `delta = makespan(current) - makespan(candidate)`, an improving
//!    candidate is always accepted. Otherwise it is accepted when a uniform
//!    draw `r` satisfies `r < exp(delta / T)` (Metropolis criterion).
//! 4. `T` is multiplied by [`COOLING_RATE`] after every step.
//!
//! The best ordering seen is kept separately from the current one, so the
//! reported best never exceeds the initial makespan.
//!
//! # Reference
//! Kirkpatrick, Gelatt & Vecchi (1983), "Optimization by Simulated Annealing"

use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, trace};

use super::config::{AnnealingConfig, COOLING_RATE};
use crate::error::{ScheduleError, ScheduleResult};
use crate::models::{Schedule, ScheduledJob};
use crate::scheduler::{ScheduleBuilder, SchedulerConfig};
use crate::validation::{validate_annealing, validate_input};

/// Per-iteration telemetry of one annealing run.
///
/// All series have one entry per iteration; index 0 is the initial schedule.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AnnealingHistory {
    /// Makespan of the current schedule after each iteration.
    pub makespans: Vec<u64>,
    /// Acceptance probability computed for each candidate (0 when the
    /// candidate improved and was accepted outright).
    pub acceptance: Vec<f64>,
    /// Temperature each iteration was evaluated at.
    pub temperatures: Vec<f64>,
}

impl AnnealingHistory {
    fn with_capacity(iterations: usize) -> Self {
        Self {
            makespans: Vec::with_capacity(iterations),
            acceptance: Vec::with_capacity(iterations),
            temperatures: Vec::with_capacity(iterations),
        }
    }

    fn record(&mut self, makespan: u64, probability: f64, temperature: f64) {
        self.makespans.push(makespan);
        self.acceptance.push(probability);
        self.temperatures.push(temperature);
    }

    /// Number of recorded iterations.
    pub fn len(&self) -> usize {
        self.makespans.len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.makespans.is_empty()
    }
}

/// Result of one annealing run.
#[derive(Debug, Clone)]
pub struct AnnealingOutcome {
    /// Makespan of the input ordering.
    pub initial_makespan: u64,
    /// Makespan of the state the run ended in.
    pub current_makespan: u64,
    /// Job IDs of the state the run ended in.
    pub current_order: Vec<u32>,
    /// Lowest makespan seen during the run.
    pub best_makespan: u64,
    /// Job IDs of the best ordering.
    pub best_order: Vec<u32>,
    /// Schedule built for the best ordering.
    pub best_schedule: Schedule,
    /// Candidates accepted, improving or not.
    pub accepted: usize,
    /// Per-iteration telemetry.
    pub history: AnnealingHistory,
}

impl AnnealingOutcome {
    /// Makespan reduction from the initial ordering to the best one.
    pub fn improvement(&self) -> u64 {
        self.initial_makespan - self.best_makespan
    }
}

/// Searches job orderings for a lower makespan.
///
/// The jobs are borrowed and never modified; each run keeps its ordering
/// as indices into them.
///
/// # Example
///
/// ```
/// use u_jobshop::anneal::{AnnealingConfig, ScheduleOptimizer};
/// use u_jobshop::models::ScheduledJob;
/// use u_jobshop::scheduler::SchedulerConfig;
///
/// let jobs = vec![
///     ScheduledJob::from_times(1, &[3, 6]),
///     ScheduledJob::from_times(2, &[10, 1]),
///     ScheduledJob::from_times(3, &[3, 2]),
/// ];
/// let optimizer = ScheduleOptimizer::new(&jobs, SchedulerConfig::new(2, 2))
///     .unwrap()
///     .with_config(AnnealingConfig::default().with_iterations(50).with_seed(42))
///     .unwrap();
/// let outcome = optimizer.optimize().unwrap();
/// assert!(outcome.best_makespan <= outcome.initial_makespan);
/// assert_eq!(outcome.history.len(), 50);
/// ```
#[derive(Debug, Clone)]
pub struct ScheduleOptimizer<'a> {
    jobs: &'a [ScheduledJob],
    builder: ScheduleBuilder,
    config: AnnealingConfig,
}

impl<'a> ScheduleOptimizer<'a> {
    /// Creates an optimizer with default annealing parameters.
    ///
    /// # Errors
    /// `Configuration` if the jobs or machine pool are invalid.
    pub fn new(jobs: &'a [ScheduledJob], scheduler: SchedulerConfig) -> ScheduleResult<Self> {
        validate_input(jobs, &scheduler)?;
        Ok(Self {
            jobs,
            builder: ScheduleBuilder::new(scheduler),
            config: AnnealingConfig::default(),
        })
    }

    /// Replaces the annealing parameters.
    ///
    /// # Errors
    /// `Configuration` if the temperature or iteration count is unusable.
    pub fn with_config(mut self, config: AnnealingConfig) -> ScheduleResult<Self> {
        validate_annealing(&config)?;
        self.config = config;
        Ok(self)
    }

    /// Annealing parameters in use.
    pub fn config(&self) -> &AnnealingConfig {
        &self.config
    }

    /// Builds the schedule for the jobs in their given order.
    pub fn initial_schedule(&self) -> ScheduleResult<Schedule> {
        self.build(&self.identity())
    }

    /// Runs one annealing pass seeded from the config (or the OS).
    pub fn optimize(&self) -> ScheduleResult<AnnealingOutcome> {
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        self.optimize_with(&mut rng)
    }

    /// Runs one annealing pass drawing from `rng`.
    pub fn optimize_with<R: Rng>(&self, rng: &mut R) -> ScheduleResult<AnnealingOutcome> {
        let iterations = self.config.iterations;
        let mut temperature = self.config.initial_temperature;
        let mut history = AnnealingHistory::with_capacity(iterations);

        let mut order = self.identity();
        let mut current = self.build(&order)?;
        let mut current_makespan = current.makespan();
        let initial_makespan = current_makespan;

        let mut best_order = order.clone();
        let mut best_makespan = current_makespan;
        let mut best_schedule = current.clone();
        let mut accepted = 0;

        info!(
            jobs = self.jobs.len(),
            iterations,
            temperature,
            initial_makespan,
            "annealing started"
        );
        history.record(current_makespan, 0.0, temperature);
        temperature *= COOLING_RATE;

        for step in 1..iterations {
            let candidate_order = self.neighbor(&order, rng);
            let candidate = self.build(&candidate_order)?;
            let candidate_makespan = candidate.makespan();

            let delta = current_makespan as f64 - candidate_makespan as f64;
            let (accept, probability) = metropolis(delta, temperature, || rng.random::<f64>());
            trace!(step, candidate_makespan, delta, probability, accept, "candidate");

            if accept {
                order = candidate_order;
                current = candidate;
                current_makespan = candidate_makespan;
                accepted += 1;

                if current_makespan < best_makespan {
                    debug!(step, makespan = current_makespan, "new best ordering");
                    best_makespan = current_makespan;
                    best_order = order.clone();
                    best_schedule = current.clone();
                }
            }

            history.record(current_makespan, probability, temperature);
            temperature *= COOLING_RATE;
        }

        info!(
            initial_makespan,
            best_makespan,
            current_makespan,
            accepted,
            "annealing finished"
        );

        Ok(AnnealingOutcome {
            initial_makespan,
            current_makespan,
            current_order: self.job_ids(&order),
            best_makespan,
            best_order: self.job_ids(&best_order),
            best_schedule,
            accepted,
            history,
        })
    }

    /// Runs one independent annealing pass per seed, each on its own thread.
    ///
    /// Runs share only the borrowed jobs and parameters. Outcomes are
    /// returned in seed order.
    pub fn run_independent(&self, seeds: &[u64]) -> ScheduleResult<Vec<AnnealingOutcome>> {
        thread::scope(|scope| {
            let handles: Vec<_> = seeds
                .iter()
                .map(|&seed| {
                    scope.spawn(move || {
                        let mut rng = StdRng::seed_from_u64(seed);
                        self.optimize_with(&mut rng)
                    })
                })
                .collect();

            handles
                .into_iter()
                .map(|handle| {
                    handle.join().unwrap_or_else(|_| {
                        Err(ScheduleError::InvariantViolation(
                            "annealing worker panicked".into(),
                        ))
                    })
                })
                .collect()
        })
    }

    fn identity(&self) -> Vec<usize> {
        (0..self.jobs.len()).collect()
    }

    fn build(&self, order: &[usize]) -> ScheduleResult<Schedule> {
        self.builder
            .build_unchecked(order.iter().map(|&i| &self.jobs[i]))
    }

    fn job_ids(&self, order: &[usize]) -> Vec<u32> {
        order.iter().map(|&i| self.jobs[i].job_id).collect()
    }

    /// Swaps two distinct, uniformly chosen positions.
    fn neighbor<R: Rng>(&self, order: &[usize], rng: &mut R) -> Vec<usize> {
        let len = order.len();
        if len < 2 {
            return order.to_vec();
        }
        let i = rng.random_range(0..len);
        let mut j = rng.random_range(0..len - 1);
        if j >= i {
            j += 1;
        }
        swap_positions(order, i, j)
    }
}

/// Metropolis criterion for a candidate whose makespan is `delta` lower
/// than the current one.
///
/// An improvement is accepted without drawing and records probability 0.
/// Otherwise `p = exp(delta / temperature)` and the candidate is accepted
/// when the draw is strictly below `p`.
fn metropolis<F: FnOnce() -> f64>(delta: f64, temperature: f64, draw: F) -> (bool, f64) {
    if delta > 0.0 {
        return (true, 0.0);
    }
    let p = (delta / temperature).exp();
    (draw() < p, p)
}

/// Returns a copy of `order` with positions `i` and `j` exchanged.
///
/// # Panics
/// Panics if either position is out of bounds.
pub fn swap_positions<T: Clone>(order: &[T], i: usize, j: usize) -> Vec<T> {
    let mut swapped = order.to_vec();
    swapped.swap(i, j);
    swapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;

    fn reference_jobs() -> Vec<ScheduledJob> {
        vec![
            ScheduledJob::from_times(1, &[3, 6]),
            ScheduledJob::from_times(2, &[10, 1]),
            ScheduledJob::from_times(3, &[3, 2]),
            ScheduledJob::from_times(4, &[2, 4]),
            ScheduledJob::from_times(5, &[8, 8]),
        ]
    }

    /// Reference jobs in the order 4, 1, 5, 3, 2.
    fn shuffled_jobs() -> Vec<ScheduledJob> {
        let jobs = reference_jobs();
        [3, 0, 4, 2, 1].iter().map(|&i| jobs[i].clone()).collect()
    }

    fn config() -> SchedulerConfig {
        SchedulerConfig::new(2, 2)
    }

    #[test]
    fn test_initial_schedule_follows_input_order() {
        let jobs = shuffled_jobs();
        let optimizer = ScheduleOptimizer::new(&jobs, config()).unwrap();
        let schedule = optimizer.initial_schedule().unwrap();
        assert_eq!(schedule.job_order(), vec![4, 1, 5, 3, 2]);
        assert_eq!(schedule.makespan(), 28);
    }

    #[test]
    fn test_optimize_reaches_reference_makespan() {
        let jobs = shuffled_jobs();
        let optimizer = ScheduleOptimizer::new(&jobs, config()).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let outcome = optimizer.optimize_with(&mut rng).unwrap();

        assert_eq!(outcome.initial_makespan, 28);
        assert!(outcome.best_makespan <= 27);
        assert_eq!(outcome.best_schedule.makespan(), outcome.best_makespan);
        assert_eq!(outcome.best_schedule.job_order(), outcome.best_order);
    }

    #[test]
    fn test_best_never_regresses() {
        let jobs = reference_jobs();
        let optimizer = ScheduleOptimizer::new(&jobs, config())
            .unwrap()
            .with_config(AnnealingConfig::default().with_iterations(100))
            .unwrap();

        for seed in 0..5 {
            let mut rng = SmallRng::seed_from_u64(seed);
            let outcome = optimizer.optimize_with(&mut rng).unwrap();
            assert!(outcome.best_makespan <= outcome.initial_makespan);
            assert!(outcome.best_makespan <= outcome.current_makespan);
            assert_eq!(
                outcome.history.makespans.iter().min(),
                Some(&outcome.best_makespan)
            );
        }
    }

    #[test]
    fn test_history_shape() {
        let jobs = reference_jobs();
        let optimizer = ScheduleOptimizer::new(&jobs, config())
            .unwrap()
            .with_config(AnnealingConfig::default().with_iterations(30))
            .unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let outcome = optimizer.optimize_with(&mut rng).unwrap();
        let history = &outcome.history;

        assert_eq!(history.len(), 30);
        assert_eq!(history.acceptance.len(), 30);
        assert_eq!(history.temperatures.len(), 30);
        assert_eq!(history.makespans[0], outcome.initial_makespan);
        assert_eq!(history.acceptance[0], 0.0);
        assert_eq!(history.temperatures[0], 1000.0);
        assert!((history.temperatures[1] - 990.0).abs() < 1e-9);
        assert!(history
            .acceptance
            .iter()
            .all(|p| (0.0..=1.0).contains(p)));
        assert_eq!(history.makespans.last(), Some(&outcome.current_makespan));
    }

    #[test]
    fn test_single_iteration_only_records_initial() {
        let jobs = reference_jobs();
        let optimizer = ScheduleOptimizer::new(&jobs, config())
            .unwrap()
            .with_config(AnnealingConfig::default().with_iterations(1))
            .unwrap();
        let outcome = optimizer.optimize_with(&mut SmallRng::seed_from_u64(1)).unwrap();
        assert_eq!(outcome.history.len(), 1);
        assert_eq!(outcome.accepted, 0);
        assert_eq!(outcome.best_order, vec![1, 2, 3, 4, 5]);
        assert_eq!(outcome.best_makespan, 27);
    }

    #[test]
    fn test_same_seed_same_outcome() {
        let jobs = shuffled_jobs();
        let optimizer = ScheduleOptimizer::new(&jobs, config())
            .unwrap()
            .with_config(AnnealingConfig::default().with_iterations(80).with_seed(9))
            .unwrap();
        let a = optimizer.optimize().unwrap();
        let b = optimizer.optimize().unwrap();
        assert_eq!(a.best_order, b.best_order);
        assert_eq!(a.history, b.history);
        assert_eq!(a.best_schedule, b.best_schedule);
    }

    #[test]
    fn test_input_jobs_untouched() {
        let jobs = shuffled_jobs();
        let before = jobs.clone();
        let optimizer = ScheduleOptimizer::new(&jobs, config()).unwrap();
        optimizer.optimize_with(&mut SmallRng::seed_from_u64(42)).unwrap();
        assert_eq!(jobs, before);
    }

    #[test]
    fn test_single_job_neighbor_is_identity() {
        let jobs = vec![ScheduledJob::from_times(4, &[2, 4])];
        let optimizer = ScheduleOptimizer::new(&jobs, config())
            .unwrap()
            .with_config(AnnealingConfig::default().with_iterations(10))
            .unwrap();
        let outcome = optimizer.optimize_with(&mut SmallRng::seed_from_u64(42)).unwrap();

        assert_eq!(outcome.best_order, vec![4]);
        assert!(outcome.history.makespans.iter().all(|&m| m == 4));
        // delta is 0, so p = exp(0) = 1 and every candidate is accepted
        assert!(outcome.history.acceptance[1..].iter().all(|&p| p == 1.0));
        assert_eq!(outcome.accepted, 9);
    }

    #[test]
    fn test_metropolis_rule() {
        let (accept, p) = metropolis(3.0, 10.0, || panic!("improvements do not draw"));
        assert!(accept);
        assert_eq!(p, 0.0);

        // exp(-1) ~= 0.368
        let (accept, p) = metropolis(-1.0, 1.0, || 0.5);
        assert!(!accept);
        assert!((p - (-1.0f64).exp()).abs() < 1e-12);
        assert!(metropolis(-1.0, 1.0, || 0.2).0);

        // Equal makespan: p = 1, every draw in [0, 1) accepts.
        assert!(metropolis(0.0, 1.0, || 0.999).0);
        // A draw equal to p is rejected.
        assert!(!metropolis(-1.0, 1.0, || (-1.0f64).exp()).0);
    }

    #[test]
    fn test_cold_run_rejects_worse_candidates() {
        let jobs = reference_jobs();
        let optimizer = ScheduleOptimizer::new(&jobs, config())
            .unwrap()
            .with_config(
                AnnealingConfig::default()
                    .with_initial_temperature(1e-6)
                    .with_iterations(200),
            )
            .unwrap();
        let outcome = optimizer.optimize_with(&mut SmallRng::seed_from_u64(3)).unwrap();
        let history = &outcome.history;

        assert!(history.makespans.windows(2).all(|w| w[1] <= w[0]));
        // Worse candidates get exp(delta / T) = 0; ties get exp(0) = 1.
        assert!(history.acceptance.iter().all(|&p| p == 0.0 || p == 1.0));
        assert_eq!(outcome.current_makespan, outcome.best_makespan);
    }

    #[test]
    fn test_swap_symmetry() {
        let jobs = reference_jobs();
        let optimizer = ScheduleOptimizer::new(&jobs, config()).unwrap();
        let order = optimizer.identity();

        let swapped = swap_positions(&order, 1, 3);
        assert_eq!(swapped, vec![0, 3, 2, 1, 4]);
        let restored = swap_positions(&swapped, 1, 3);
        assert_eq!(restored, order);
        assert_eq!(
            optimizer.build(&restored).unwrap().makespan(),
            optimizer.build(&order).unwrap().makespan()
        );
    }

    #[test]
    fn test_neighbor_swaps_two_distinct_positions() {
        let jobs = reference_jobs();
        let optimizer = ScheduleOptimizer::new(&jobs, config()).unwrap();
        let order = optimizer.identity();
        let mut rng = SmallRng::seed_from_u64(42);

        for _ in 0..50 {
            let next = optimizer.neighbor(&order, &mut rng);
            let moved = order.iter().zip(&next).filter(|(a, b)| a != b).count();
            assert_eq!(moved, 2);
            let mut sorted = next.clone();
            sorted.sort_unstable();
            assert_eq!(sorted, order);
        }
    }

    #[test]
    fn test_invalid_annealing_config() {
        let jobs = reference_jobs();
        let optimizer = ScheduleOptimizer::new(&jobs, config()).unwrap();

        let zero = optimizer
            .clone()
            .with_config(AnnealingConfig::default().with_iterations(0));
        assert!(zero.unwrap_err().is_configuration());

        let cold = optimizer.with_config(AnnealingConfig::default().with_initial_temperature(0.0));
        assert!(cold.unwrap_err().is_configuration());
    }

    #[test]
    fn test_invalid_jobs_rejected() {
        let err = ScheduleOptimizer::new(&[], config()).unwrap_err();
        assert!(err.is_configuration());

        let jobs = reference_jobs();
        let err = ScheduleOptimizer::new(&jobs, SchedulerConfig::new(0, 2)).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_run_independent() {
        let jobs = shuffled_jobs();
        let optimizer = ScheduleOptimizer::new(&jobs, config())
            .unwrap()
            .with_config(AnnealingConfig::default().with_iterations(60))
            .unwrap();

        let outcomes = optimizer.run_independent(&[1, 2, 3]).unwrap();
        assert_eq!(outcomes.len(), 3);
        for outcome in &outcomes {
            assert_eq!(outcome.initial_makespan, 28);
            assert!(outcome.best_makespan <= 28);
            assert_eq!(outcome.history.len(), 60);
        }

        // Each worker is equivalent to a sequential run with the same seed.
        let sequential = optimizer
            .optimize_with(&mut StdRng::seed_from_u64(2))
            .unwrap();
        assert_eq!(outcomes[1].history, sequential.history);
    }
}
