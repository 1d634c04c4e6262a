//! Route simulation and fitness.
//!
//! A solution is priced by walking every route once with
//! [`RouteSimulator`]: the clock, fuel and load evolve stop by stop, every
//! violated constraint becomes a [`Diagnostic`], and the totals are folded
//! into an [`Evaluation`].

mod diagnostic;
mod fitness;
mod simulator;

pub use diagnostic::Diagnostic;
pub use fitness::{clamp_fitness, Evaluation, FitnessBreakdown, FitnessWeights, FITNESS_SENTINEL};
pub use simulator::{RouteSimulator, RouteTrace, SimulationParams, TravelRounding, Visit};
