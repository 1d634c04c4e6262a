//! Domain model types for GLP fleet routing.
//!
//! Provides the leaf values (positions, minute-resolution time, ids), the
//! fleet, order and warehouse rosters, time-bounded blockages, the closed
//! [`Stop`] variant set, the per-horizon [`Environment`] snapshot, and the
//! candidate [`Solution`].

mod blockage;
mod environment;
mod ids;
mod order;
mod position;
mod solution;
mod stop;
mod time;
mod vehicle;
mod warehouse;

pub use blockage::{Blockage, Cell};
pub use environment::{split_amount, ChunkPolicy, Environment, StopUniverse};
pub use ids::{OrderId, VehicleId, WarehouseId};
pub use order::Order;
pub use position::{Position, PositionKey};
pub use solution::{RouteMap, Solution};
pub use stop::Stop;
pub use time::Time;
pub use vehicle::Vehicle;
pub use warehouse::Warehouse;
