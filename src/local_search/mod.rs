//! Neighborhood moves for route improvement.
//!
//! - [`Move`]: value-comparable step descriptor with an algebraic inverse
//! - [`NeighborhoodGenerator`]: randomized candidate batches per operator
//!
//! Operators work on marker-free routes:
//!
//! - `intra`: relocate, swap, 2-opt, route reverse, route shuffle
//! - `inter`: relocate, swap, cross-exchange between two routes
//! - `route`: vehicle swap, route split, route merge

mod inter;
mod intra;
mod moves;
mod neighborhood;
mod route;

pub use moves::{Move, MoveKind};
pub use neighborhood::{Neighbor, NeighborhoodConfig, NeighborhoodGenerator};
