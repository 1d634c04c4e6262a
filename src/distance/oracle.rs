//! Distance oracle trait and the obstacle-free reference oracle.

use std::fmt;

use crate::models::{Blockage, Position};

/// Travel distance between two grid positions under a set of closures.
///
/// Implementations must return `Some(0.0)` for identical positions and
/// `None` when no open path exists. Queries may be expensive; the
/// [`Environment`](crate::models::Environment) caches them per snapshot.
pub trait DistanceOracle: Send + Sync + fmt::Debug {
    /// Shortest open-street distance from `from` to `to`, in kilometres.
    fn distance(&self, from: Position, to: Position, blockages: &[Blockage]) -> Option<f64>;
}

/// Manhattan distance that ignores every closure.
///
/// # Examples
///
/// ```
/// use glp_routing::distance::{DistanceOracle, ManhattanOracle};
/// use glp_routing::models::Position;
///
/// let d = ManhattanOracle.distance(Position::new(0.0, 0.0), Position::new(3.0, 4.0), &[]);
/// assert_eq!(d, Some(7.0));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ManhattanOracle;

impl DistanceOracle for ManhattanOracle {
    fn distance(&self, from: Position, to: Position, _blockages: &[Blockage]) -> Option<f64> {
        Some(from.manhattan_to(to))
    }
}
