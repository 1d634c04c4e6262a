//! Grid positions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A point on the city grid, in kilometres.
///
/// Warehouses and orders always sit on integer cells. Vehicles may be caught
/// between two cells when a horizon ends mid-leg, so coordinates are real.
///
/// # Examples
///
/// ```
/// use glp_routing::models::Position;
///
/// let p = Position::new(2.4, 7.6);
/// assert!(!p.is_integer());
/// assert_eq!(p.round(), Position::new(2.0, 8.0));
/// assert_eq!(p.round().manhattan_to(Position::new(0.0, 0.0)), 10.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Hashable identity of a [`Position`], used as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey(u64, u64);

impl Position {
    /// Creates a position.
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Nearest integer cell.
    pub fn round(&self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }

    /// Returns `true` if both coordinates are whole numbers.
    pub fn is_integer(&self) -> bool {
        self.x.fract() == 0.0 && self.y.fract() == 0.0
    }

    /// Manhattan (grid) distance, ignoring obstructions.
    pub fn manhattan_to(&self, other: Position) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Bitwise identity for hashing. `-0.0` is folded onto `0.0`.
    pub fn key(&self) -> PositionKey {
        let norm = |v: f64| if v == 0.0 { 0.0f64 } else { v };
        PositionKey(norm(self.x).to_bits(), norm(self.y).to_bits())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}
