//! Planner configuration.
//!
//! Every section has defaults, so a partial JSON document only overrides
//! what it names:
//!
//! ```
//! use glp_routing::config::PlannerConfig;
//!
//! let config = PlannerConfig::from_json_str(r#"{
//!     "search": { "tabu_size": 20 },
//!     "chunks": { "delivery_chunk": 10 }
//! }"#).unwrap();
//! assert_eq!(config.search.tabu_size, 20);
//! assert_eq!(config.chunks.delivery_chunk, 10);
//! assert_eq!(config.simulation.speed_kmh, 50.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{RoutingError, RoutingResult};
use crate::evaluation::{FitnessWeights, SimulationParams};
use crate::local_search::{NeighborhoodConfig, NeighborhoodGenerator};
use crate::models::ChunkPolicy;
use crate::search::{SearchConfig, SearchDriver};

/// All tunables of one planning run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub simulation: SimulationParams,
    pub fitness: FitnessWeights,
    pub chunks: ChunkPolicy,
    pub neighborhood: NeighborhoodConfig,
    pub search: SearchConfig,
}

impl PlannerConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> RoutingResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> RoutingResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Rejects values the simulator or the search cannot work with.
    pub fn validate(&self) -> RoutingResult<()> {
        let sim = &self.simulation;
        if !(sim.speed_kmh.is_finite() && sim.speed_kmh > 0.0) {
            return Err(invalid("simulation.speed_kmh must be positive"));
        }
        if !(sim.fuel_divisor.is_finite() && sim.fuel_divisor > 0.0) {
            return Err(invalid("simulation.fuel_divisor must be positive"));
        }
        if sim.delivery_dwell_minutes < 0 || sim.refill_dwell_minutes < 0 {
            return Err(invalid("simulation dwell times must not be negative"));
        }
        if !(0.0..=1.0).contains(&sim.min_final_fuel_ratio) {
            return Err(invalid("simulation.min_final_fuel_ratio must lie in [0, 1]"));
        }

        let weights = [
            ("delivery_value", self.fitness.delivery_value),
            ("urgency_multiplier", self.fitness.urgency_multiplier),
            ("earliness_bonus", self.fitness.earliness_bonus),
            ("lateness", self.fitness.lateness),
            ("product_deficit", self.fitness.product_deficit),
            ("fuel_deficit", self.fitness.fuel_deficit),
            ("capacity_overflow", self.fitness.capacity_overflow),
            ("undelivered", self.fitness.undelivered),
            ("low_final_fuel", self.fitness.low_final_fuel),
            ("unreachable", self.fitness.unreachable),
            ("infeasibility_offset", self.fitness.infeasibility_offset),
        ];
        if let Some((name, _)) = weights.iter().find(|(_, w)| !(w.is_finite() && *w >= 0.0)) {
            return Err(invalid(&format!("fitness.{name} must be finite and non-negative")));
        }

        if self.chunks.delivery_chunk == 0 || self.chunks.refill_chunk == 0 {
            return Err(invalid("chunk ceilings must be positive"));
        }
        if self.chunks.relaxed_factor == 0 {
            return Err(invalid("chunks.relaxed_factor must be positive"));
        }

        self.neighborhood.validate()?;
        self.search.validate()
    }

    /// A search driver wired with this configuration.
    pub fn driver(&self) -> SearchDriver {
        SearchDriver::new(
            self.search.clone(),
            NeighborhoodGenerator::new(self.neighborhood.clone()),
        )
    }
}

fn invalid(message: &str) -> RoutingError {
    RoutingError::InvalidConfig(message.to_string())
}
