//! Travel distances between grid positions.
//!
//! The engine only talks to a [`DistanceOracle`]; two reference oracles are
//! provided, and [`DistanceCache`] memoizes answers for one snapshot.

mod cache;
mod grid;
mod oracle;

pub use cache::DistanceCache;
pub use grid::GridOracle;
pub use oracle::{DistanceOracle, ManhattanOracle};
