//! Neighborhood generation.
//!
//! # Algorithm
//!
//! 1. Strip the Start and Return markers from every route of the incumbent.
//! 2. For every enabled operator, draw up to `neighbors_per_operator`
//!    candidates. Each candidate gets `attempts_per_neighbor` tries to
//!    sample a move that fits and applies to a fresh copy of the trimmed
//!    routes; when every try fails the candidate is skipped.
//! 3. Re-attach the markers, yielding a [`Solution`] per candidate.
//!
//! # Complexity
//!
//! O(K · N · A · S) where K is the operator count, N the neighbors per
//! operator, A the attempts and S the total stop count (one copy per try).

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{inter, intra, route, Move, MoveKind};
use crate::error::{RoutingError, RoutingResult};
use crate::models::{RouteMap, Solution};

/// Neighborhood size and operator selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeighborhoodConfig {
    /// Candidates requested from each operator.
    pub neighbors_per_operator: usize,
    /// Sampling tries per requested candidate.
    pub attempts_per_neighbor: usize,
    /// Enabled operators.
    pub operators: Vec<MoveKind>,
}

impl Default for NeighborhoodConfig {
    fn default() -> Self {
        Self {
            neighbors_per_operator: 10,
            attempts_per_neighbor: 10,
            operators: MoveKind::ALL.to_vec(),
        }
    }
}

impl NeighborhoodConfig {
    pub fn with_neighbors_per_operator(mut self, n: usize) -> Self {
        self.neighbors_per_operator = n;
        self
    }

    pub fn with_attempts_per_neighbor(mut self, n: usize) -> Self {
        self.attempts_per_neighbor = n;
        self
    }

    pub fn with_operators(mut self, operators: Vec<MoveKind>) -> Self {
        self.operators = operators;
        self
    }

    /// Rejects configurations that can never produce a neighbor.
    pub fn validate(&self) -> RoutingResult<()> {
        if self.neighbors_per_operator == 0 {
            return Err(RoutingError::InvalidConfig(
                "neighbors_per_operator must be positive".into(),
            ));
        }
        if self.attempts_per_neighbor == 0 {
            return Err(RoutingError::InvalidConfig(
                "attempts_per_neighbor must be positive".into(),
            ));
        }
        if self.operators.is_empty() {
            return Err(RoutingError::InvalidConfig(
                "at least one neighborhood operator must be enabled".into(),
            ));
        }
        Ok(())
    }
}

/// A candidate solution together with the move that produced it.
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub solution: Solution,
    pub mv: Move,
}

/// Produces randomized neighbors of a solution.
#[derive(Debug, Clone, Default)]
pub struct NeighborhoodGenerator {
    config: NeighborhoodConfig,
}

impl NeighborhoodGenerator {
    pub fn new(config: NeighborhoodConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NeighborhoodConfig {
        &self.config
    }

    /// One batch of neighbors, grouped by operator in configuration order.
    pub fn generate<R: Rng>(&self, solution: &Solution, rng: &mut R) -> Vec<Neighbor> {
        let trimmed = solution.interiors();
        let mut out = Vec::with_capacity(self.config.operators.len() * self.config.neighbors_per_operator);
        for &kind in &self.config.operators {
            let before = out.len();
            for _ in 0..self.config.neighbors_per_operator {
                if let Some((routes, mv)) = self.try_operator(kind, &trimmed, rng) {
                    out.push(Neighbor {
                        solution: Solution::with_interiors(solution.environment().clone(), routes),
                        mv,
                    });
                }
            }
            trace!(operator = ?kind, produced = out.len() - before, "neighborhood operator");
        }
        out
    }

    /// Applies `strength` random moves in sequence; failed draws are skipped.
    pub fn perturb<R: Rng>(&self, solution: &Solution, strength: usize, rng: &mut R) -> Solution {
        let mut routes = solution.interiors();
        if !self.config.operators.is_empty() {
            for _ in 0..strength {
                let kind = self.config.operators[rng.random_range(0..self.config.operators.len())];
                if let Some(mv) = sample(kind, &routes, rng) {
                    mv.apply(&mut routes, rng);
                }
            }
        }
        Solution::with_interiors(solution.environment().clone(), routes)
    }

    fn try_operator<R: Rng>(
        &self,
        kind: MoveKind,
        trimmed: &RouteMap,
        rng: &mut R,
    ) -> Option<(RouteMap, Move)> {
        for _ in 0..self.config.attempts_per_neighbor {
            let Some(mv) = sample(kind, trimmed, rng) else {
                continue;
            };
            let mut routes = trimmed.clone();
            if mv.apply(&mut routes, rng) {
                return Some((routes, mv));
            }
        }
        None
    }
}

/// Draws a random move of `kind` that fits `routes`.
pub(crate) fn sample<R: Rng>(kind: MoveKind, routes: &RouteMap, rng: &mut R) -> Option<Move> {
    match kind {
        k if k.is_intra() => intra::sample(k, routes, rng),
        MoveKind::InterRelocate | MoveKind::InterSwap | MoveKind::CrossExchange => {
            inter::sample(kind, routes, rng)
        }
        _ => route::sample(kind, routes, rng),
    }
}
