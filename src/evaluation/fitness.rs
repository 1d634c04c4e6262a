//! Fitness model: delivery value minus penalties.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Diagnostic, RouteTrace};

/// Floor for every fitness value. Non-finite results collapse onto it so
/// solutions stay totally ordered.
pub const FITNESS_SENTINEL: f64 = -1.0e12;

/// Maps NaN and infinities to [`FITNESS_SENTINEL`] and floors the rest.
///
/// ```
/// use glp_routing::evaluation::{clamp_fitness, FITNESS_SENTINEL};
///
/// assert_eq!(clamp_fitness(f64::NAN), FITNESS_SENTINEL);
/// assert_eq!(clamp_fitness(f64::NEG_INFINITY), FITNESS_SENTINEL);
/// assert_eq!(clamp_fitness(12.5), 12.5);
/// ```
pub fn clamp_fitness(value: f64) -> f64 {
    if value.is_finite() {
        value.max(FITNESS_SENTINEL)
    } else {
        FITNESS_SENTINEL
    }
}

/// Rewards and penalty rates.
///
/// Every penalty is linear in its violation size; `infeasibility_offset` is
/// charged once per diagnostic so that, for sensible rates, any feasible
/// plan ranks above any infeasible one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitnessWeights {
    /// Value per unit delivered on time.
    pub delivery_value: f64,
    /// Value multiplier for urgent orders.
    pub urgency_multiplier: f64,
    /// Extra value fraction for delivering a full horizon ahead of the deadline.
    pub earliness_bonus: f64,
    /// Penalty per unit delivered per minute late.
    pub lateness: f64,
    /// Penalty per unit of missing product at a delivery.
    pub product_deficit: f64,
    /// Penalty per gallon of missing fuel.
    pub fuel_deficit: f64,
    /// Soft penalty per refilled unit left behind because the tank was full.
    pub capacity_overflow: f64,
    /// Penalty per unit left undelivered.
    pub undelivered: f64,
    /// Penalty per gallon below the final fuel reserve.
    pub low_final_fuel: f64,
    /// Flat penalty per unreachable leg.
    pub unreachable: f64,
    /// Flat penalty per diagnostic.
    pub infeasibility_offset: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            delivery_value: 10.0,
            urgency_multiplier: 1.5,
            earliness_bonus: 0.5,
            lateness: 1.0,
            product_deficit: 100.0,
            fuel_deficit: 50.0,
            capacity_overflow: 1.0,
            undelivered: 20.0,
            low_final_fuel: 10.0,
            unreachable: 1_000.0,
            infeasibility_offset: 10_000.0,
        }
    }
}

/// Per-term totals of one simulation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FitnessBreakdown {
    pub delivery_value: f64,
    pub late_penalty: f64,
    pub deficit_penalty: f64,
    pub fuel_penalty: f64,
    pub capacity_penalty: f64,
    pub undelivered_penalty: f64,
    pub low_fuel_penalty: f64,
    pub unreachable_penalty: f64,
    pub infeasibility_offset: f64,
}

impl FitnessBreakdown {
    pub fn total_penalty(&self) -> f64 {
        self.late_penalty
            + self.deficit_penalty
            + self.fuel_penalty
            + self.capacity_penalty
            + self.undelivered_penalty
            + self.low_fuel_penalty
            + self.unreachable_penalty
            + self.infeasibility_offset
    }

    /// Value minus penalties, clamped.
    pub fn fitness(&self) -> f64 {
        clamp_fitness(self.delivery_value - self.total_penalty())
    }
}

impl fmt::Display for FitnessBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "  delivery value      {:>14.2}", self.delivery_value)?;
        writeln!(f, "  late penalty        {:>14.2}", -self.late_penalty)?;
        writeln!(f, "  GLP deficit         {:>14.2}", -self.deficit_penalty)?;
        writeln!(f, "  fuel deficit        {:>14.2}", -self.fuel_penalty)?;
        writeln!(f, "  refill left behind  {:>14.2}", -self.capacity_penalty)?;
        writeln!(f, "  undelivered         {:>14.2}", -self.undelivered_penalty)?;
        writeln!(f, "  low final fuel      {:>14.2}", -self.low_fuel_penalty)?;
        writeln!(f, "  unreachable         {:>14.2}", -self.unreachable_penalty)?;
        writeln!(f, "  infeasibility       {:>14.2}", -self.infeasibility_offset)
    }
}

/// Result of simulating every route of a solution once.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    fitness: f64,
    breakdown: FitnessBreakdown,
    diagnostics: Vec<Diagnostic>,
    traces: Vec<RouteTrace>,
}

impl Evaluation {
    pub(crate) fn new(
        breakdown: FitnessBreakdown,
        diagnostics: Vec<Diagnostic>,
        traces: Vec<RouteTrace>,
    ) -> Self {
        Self {
            fitness: breakdown.fitness(),
            breakdown,
            diagnostics,
            traces,
        }
    }

    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    /// `true` when the simulation recorded no diagnostic.
    pub fn is_feasible(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn breakdown(&self) -> &FitnessBreakdown {
        &self.breakdown
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Per-vehicle timing, fuel and load traces.
    pub fn traces(&self) -> &[RouteTrace] {
        &self.traces
    }
}
