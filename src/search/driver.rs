//! Tabu-guided iterated local search.
//!
//! # Algorithm
//!
//! Outer loop, until the deadline expires or is cancelled:
//!
//! 1. Pick a start: the first random solution on the first iteration, the
//!    greedy seed on the second (when enabled), afterwards a perturbation of
//!    the best solution so far or a fresh random solution.
//! 2. Run [`descend`] from it.
//! 3. Keep the best overall and the best feasible result.
//!
//! Inner loop ([`descend`]): generate the neighborhood, move to the best
//! neighbor whose move is not tabu (or that beats the inner best by the
//! aspiration margin), record the move's inverse as tabu. Stops on an empty
//! admissible set, on a run of non-improving steps, or on the step limit.
//!
//! # Reference
//!
//! Glover, F. (1989). "Tabu Search - Part I", *ORSA Journal on Computing*
//! 1(3), 190-206.
//! Lourenço, H.R., Martin, O.C. & Stützle, T. (2003). "Iterated Local
//! Search", *Handbook of Metaheuristics*, 320-353.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use super::TabuList;
use crate::constructive::{random_solution, urgency_first};
use crate::error::{RoutingError, RoutingResult};
use crate::local_search::{Neighbor, NeighborhoodGenerator};
use crate::models::{Environment, Solution};

/// Tuning of the search loops.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Moves remembered by the tabu list.
    pub tabu_size: usize,
    /// Relative margin by which a tabu neighbor must beat the inner best.
    pub aspiration_margin: f64,
    /// Non-improving steps tolerated once the inner best is feasible.
    pub max_no_improvement_feasible: usize,
    /// Non-improving steps tolerated while the inner best is infeasible.
    pub max_no_improvement_infeasible: usize,
    /// Hard cap on steps per descent.
    pub max_inner_steps: usize,
    /// Random moves applied when perturbing the incumbent.
    pub perturbation_strength: usize,
    /// Chance of restarting from a perturbation rather than a fresh random solution.
    pub perturbation_probability: f64,
    /// Optional cap on outer iterations, on top of the deadline.
    pub max_outer_iterations: Option<usize>,
    /// Also descend from the deadline-ordered greedy seed.
    pub use_greedy_seed: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tabu_size: 50,
            aspiration_margin: 0.05,
            max_no_improvement_feasible: 10,
            max_no_improvement_infeasible: 20,
            max_inner_steps: 500,
            perturbation_strength: 3,
            perturbation_probability: 0.7,
            max_outer_iterations: None,
            use_greedy_seed: true,
        }
    }
}

impl SearchConfig {
    pub fn with_tabu_size(mut self, size: usize) -> Self {
        self.tabu_size = size;
        self
    }

    pub fn with_aspiration_margin(mut self, margin: f64) -> Self {
        self.aspiration_margin = margin;
        self
    }

    pub fn with_max_inner_steps(mut self, steps: usize) -> Self {
        self.max_inner_steps = steps;
        self
    }

    pub fn with_max_outer_iterations(mut self, iterations: usize) -> Self {
        self.max_outer_iterations = Some(iterations);
        self
    }

    pub fn with_greedy_seed(mut self, enabled: bool) -> Self {
        self.use_greedy_seed = enabled;
        self
    }

    pub fn validate(&self) -> RoutingResult<()> {
        if !self.aspiration_margin.is_finite() || self.aspiration_margin < 0.0 {
            return Err(RoutingError::InvalidConfig(format!(
                "aspiration_margin must be finite and non-negative, got {}",
                self.aspiration_margin
            )));
        }
        if !(0.0..=1.0).contains(&self.perturbation_probability) {
            return Err(RoutingError::InvalidConfig(format!(
                "perturbation_probability must lie in [0, 1], got {}",
                self.perturbation_probability
            )));
        }
        if self.max_no_improvement_feasible == 0 || self.max_no_improvement_infeasible == 0 {
            return Err(RoutingError::InvalidConfig(
                "no-improvement thresholds must be positive".into(),
            ));
        }
        if self.max_inner_steps == 0 {
            return Err(RoutingError::InvalidConfig("max_inner_steps must be positive".into()));
        }
        Ok(())
    }
}

/// Wall-clock limit with an optional external stop flag.
#[derive(Debug, Clone)]
pub struct Deadline {
    at: Instant,
    cancel: Option<Arc<AtomicBool>>,
}

impl Deadline {
    pub fn after(budget: Duration) -> Self {
        Self::at(Instant::now() + budget)
    }

    pub fn at(at: Instant) -> Self {
        Self { at, cancel: None }
    }

    /// Also expires once `flag` is set.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
            || self
                .cancel
                .as_ref()
                .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// Why a descent stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every neighbor was tabu without aspiration, or none was produced.
    NoAdmissibleNeighbor,
    /// The no-improvement threshold was reached.
    NoImprovement,
    /// The per-descent step cap was reached.
    StepLimit,
}

/// Result of one descent.
#[derive(Debug, Clone)]
pub struct LocalSearchOutcome {
    pub best: Solution,
    pub steps: usize,
    pub termination: Termination,
}

/// Runs the tabu-guided inner loop from `start`.
///
/// Deterministic for a given start, configuration and generator state.
/// The returned best is never ranked below `start`.
pub fn descend<R: Rng>(
    start: &Solution,
    generator: &NeighborhoodGenerator,
    config: &SearchConfig,
    rng: &mut R,
) -> LocalSearchOutcome {
    let mut tabu = TabuList::new(config.tabu_size);
    let mut current = start.clone();
    let mut best = start.clone();
    let mut no_improvement = 0;
    let mut steps = 0;

    let termination = loop {
        let threshold = if best.is_feasible() {
            config.max_no_improvement_feasible
        } else {
            config.max_no_improvement_infeasible
        };
        if no_improvement >= threshold {
            break Termination::NoImprovement;
        }
        if steps >= config.max_inner_steps {
            break Termination::StepLimit;
        }

        let bar = aspiration_bar(best.fitness(), config.aspiration_margin);
        let chosen = generator
            .generate(&current, rng)
            .into_iter()
            .filter(|n| is_admissible(n, &tabu, bar))
            .reduce(|a, b| if b.solution.is_better_than(&a.solution) { b } else { a });
        let Some(neighbor) = chosen else {
            break Termination::NoAdmissibleNeighbor;
        };

        if let Some(inverse) = neighbor.mv.inverse() {
            tabu.push(inverse);
        }
        current = neighbor.solution;
        steps += 1;
        trace!(
            step = steps,
            mv = %neighbor.mv,
            fitness = current.fitness(),
            feasible = current.is_feasible(),
            "accepted neighbor"
        );

        if current.is_better_than(&best) {
            best = current.clone();
            no_improvement = 0;
        } else {
            no_improvement += 1;
        }
    };

    LocalSearchOutcome {
        best,
        steps,
        termination,
    }
}

/// A neighbor is admissible when its move is not tabu, or when it beats the
/// aspiration bar.
fn is_admissible(neighbor: &Neighbor, tabu: &TabuList, bar: f64) -> bool {
    !tabu.contains(&neighbor.mv) || neighbor.solution.fitness() > bar
}

/// Fitness a tabu neighbor must exceed to be admitted anyway.
fn aspiration_bar(best: f64, margin: f64) -> f64 {
    best + margin * best.abs().max(1.0)
}

/// Result of a full search run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Best feasible solution if any was found, else the best overall, compressed.
    pub solution: Solution,
    /// Fitness of the first random solution.
    pub initial_fitness: f64,
    pub outer_iterations: usize,
    pub inner_steps: usize,
    pub found_feasible: bool,
}

/// Time-bounded iterated local search over one environment.
#[derive(Debug, Clone, Default)]
pub struct SearchDriver {
    config: SearchConfig,
    generator: NeighborhoodGenerator,
}

impl SearchDriver {
    pub fn new(config: SearchConfig, generator: NeighborhoodGenerator) -> Self {
        Self { config, generator }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Searches until `deadline` expires; the first descent always runs.
    pub fn run<R: Rng>(&self, env: &Arc<Environment>, deadline: &Deadline, rng: &mut R) -> SearchOutcome {
        let initial = random_solution(env, rng);
        let initial_fitness = initial.fitness();
        info!(
            vehicles = env.vehicle_ids().len(),
            stops = initial.service_stop_count(),
            initial_fitness,
            "search started"
        );

        let first = descend(&initial, &self.generator, &self.config, rng);
        let mut inner_steps = first.steps;
        let mut best = first.best;
        let mut best_feasible = best.is_feasible().then(|| best.clone());
        let mut outer_iterations = 1;

        while !deadline.is_expired()
            && self
                .config
                .max_outer_iterations
                .map_or(true, |cap| outer_iterations < cap)
        {
            let start = if outer_iterations == 1 && self.config.use_greedy_seed {
                debug!("restart from greedy seed");
                urgency_first(env)
            } else if rng.random_bool(self.config.perturbation_probability.clamp(0.0, 1.0)) {
                let base = best_feasible.as_ref().unwrap_or(&best);
                self.generator
                    .perturb(base, self.config.perturbation_strength, rng)
            } else {
                debug!(iteration = outer_iterations, "restart from random solution");
                random_solution(env, rng)
            };

            let outcome = descend(&start, &self.generator, &self.config, rng);
            outer_iterations += 1;
            inner_steps += outcome.steps;
            let candidate = outcome.best;

            if candidate.is_feasible()
                && best_feasible
                    .as_ref()
                    .map_or(true, |f| candidate.fitness() > f.fitness())
            {
                debug!(
                    iteration = outer_iterations,
                    fitness = candidate.fitness(),
                    "new best feasible"
                );
                best_feasible = Some(candidate.clone());
            }
            if candidate.is_better_than(&best) {
                debug!(
                    iteration = outer_iterations,
                    fitness = candidate.fitness(),
                    feasible = candidate.is_feasible(),
                    "new best overall"
                );
                best = candidate;
            }
        }

        let found_feasible = best_feasible.is_some();
        if !found_feasible {
            warn!(fitness = best.fitness(), "search ended without a feasible solution");
        }
        let mut solution = best_feasible.unwrap_or(best);
        solution.compress();
        info!(
            outer_iterations,
            inner_steps,
            fitness = solution.fitness(),
            feasible = solution.is_feasible(),
            "search finished"
        );

        SearchOutcome {
            solution,
            initial_fitness,
            outer_iterations,
            inner_steps,
            found_feasible,
        }
    }
}
