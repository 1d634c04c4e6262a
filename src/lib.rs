//! # glp-routing
//!
//! Route optimization engine for a liquefied-gas (GLP) delivery fleet:
//! per-horizon snapshots, discrete-event route simulation, randomized
//! neighborhood moves and a time-bounded tabu-guided local search.
//!
//! ## Modules
//!
//! - [`models`]: Domain types (Position, Time, Vehicle, Order, Warehouse, Stop, Environment, Solution)
//! - [`distance`]: Distance oracles (Manhattan, blockage-aware grid) and the per-snapshot cache
//! - [`evaluation`]: Route simulation, diagnostics and fitness
//! - [`constructive`]: Starting solutions (random, urgency-first greedy)
//! - [`local_search`]: Move descriptors and the neighborhood generator
//! - [`search`]: Iterated local search driver with tabu memory
//! - [`config`]: JSON-loadable planner configuration
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use glp_routing::config::PlannerConfig;
//! use glp_routing::models::*;
//! use glp_routing::rng::create_rng;
//! use glp_routing::search::Deadline;
//!
//! let now = Time::from_ymd_hm(2025, 1, 1, 8, 0).unwrap();
//! let mut config = PlannerConfig::default();
//! config.search.max_outer_iterations = Some(3);
//!
//! let env = Environment::new(
//!     now,
//!     12 * 60,
//!     vec![Vehicle::new(VehicleId(1), 25, Position::new(12.0, 8.0)).with_current_load(25)],
//!     vec![Order::new(OrderId(1), Position::new(20.0, 8.0), 10, now.add_minutes(600))],
//!     vec![Warehouse::main(WarehouseId(0), Position::new(12.0, 8.0), 500)],
//! )
//! .unwrap()
//! .with_config(&config);
//!
//! let outcome = config
//!     .driver()
//!     .run(&Arc::new(env), &Deadline::after(Duration::from_secs(5)), &mut create_rng(7));
//! assert!(outcome.solution.is_feasible());
//! ```

pub mod config;
pub mod constructive;
pub mod distance;
pub mod error;
pub mod evaluation;
pub mod local_search;
pub mod models;
pub mod rng;
pub mod search;
