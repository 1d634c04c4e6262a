//! Move descriptors.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{inter, intra, route};
use crate::models::{RouteMap, Stop, VehicleId};

/// Operator families of the neighborhood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveKind {
    /// Move one stop to another position of the same route.
    IntraRelocate,
    /// Exchange two stops of the same route.
    IntraSwap,
    /// Reverse the segment `(from, to]` of one route.
    TwoOpt,
    /// Reverse a whole route.
    RouteReverse,
    /// Shuffle a whole route.
    RouteShuffle,
    /// Move one stop into another vehicle's route.
    InterRelocate,
    /// Exchange one stop between two routes.
    InterSwap,
    /// Exchange the tails of two routes.
    CrossExchange,
    /// Exchange two vehicles' whole routes.
    VehicleSwap,
    /// Hand the tail of a route to an idle vehicle.
    RouteSplit,
    /// Append a whole route to another vehicle's route.
    RouteMerge,
}

impl MoveKind {
    /// Every operator, in generation order.
    pub const ALL: [MoveKind; 11] = [
        MoveKind::IntraRelocate,
        MoveKind::IntraSwap,
        MoveKind::TwoOpt,
        MoveKind::RouteReverse,
        MoveKind::RouteShuffle,
        MoveKind::InterRelocate,
        MoveKind::InterSwap,
        MoveKind::CrossExchange,
        MoveKind::VehicleSwap,
        MoveKind::RouteSplit,
        MoveKind::RouteMerge,
    ];

    /// Operators that touch a single route.
    pub fn is_intra(self) -> bool {
        matches!(
            self,
            MoveKind::IntraRelocate
                | MoveKind::IntraSwap
                | MoveKind::TwoOpt
                | MoveKind::RouteReverse
                | MoveKind::RouteShuffle
        )
    }

    /// Operators that undo themselves and do not care which endpoint
    /// comes first.
    pub fn is_self_inverse(self) -> bool {
        matches!(
            self,
            MoveKind::IntraSwap
                | MoveKind::TwoOpt
                | MoveKind::RouteReverse
                | MoveKind::InterSwap
                | MoveKind::CrossExchange
                | MoveKind::VehicleSwap
        )
    }
}

/// A value-comparable description of one neighborhood step.
///
/// Indices refer to marker-free routes. For single-route kinds
/// `from_vehicle == to_vehicle`. Self-inverse kinds are stored with their
/// lower endpoint first, so a swap of `(3, 1)` equals a swap of `(1, 3)`.
///
/// # Examples
///
/// ```
/// use glp_routing::local_search::{Move, MoveKind};
/// use glp_routing::models::VehicleId;
///
/// let mv = Move::inter(MoveKind::InterRelocate, VehicleId(1), 0, VehicleId(2), 3);
/// let back = mv.inverse().unwrap();
/// assert_eq!(back.from_vehicle(), VehicleId(2));
/// assert!(back.is_inverse_of(&mv));
/// assert_eq!(back.inverse(), Some(mv));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    from_vehicle: VehicleId,
    to_vehicle: VehicleId,
    from_index: usize,
    to_index: usize,
}

impl Move {
    /// A move inside one route.
    pub fn intra(kind: MoveKind, vehicle: VehicleId, from_index: usize, to_index: usize) -> Self {
        Self::inter(kind, vehicle, from_index, vehicle, to_index)
    }

    /// A move between two routes.
    pub fn inter(
        kind: MoveKind,
        from_vehicle: VehicleId,
        from_index: usize,
        to_vehicle: VehicleId,
        to_index: usize,
    ) -> Self {
        if kind.is_self_inverse() && (to_vehicle, to_index) < (from_vehicle, from_index) {
            return Self {
                kind,
                from_vehicle: to_vehicle,
                to_vehicle: from_vehicle,
                from_index: to_index,
                to_index: from_index,
            };
        }
        Self {
            kind,
            from_vehicle,
            to_vehicle,
            from_index,
            to_index,
        }
    }

    pub fn kind(&self) -> MoveKind {
        self.kind
    }

    pub fn from_vehicle(&self) -> VehicleId {
        self.from_vehicle
    }

    pub fn to_vehicle(&self) -> VehicleId {
        self.to_vehicle
    }

    pub fn from_index(&self) -> usize {
        self.from_index
    }

    pub fn to_index(&self) -> usize {
        self.to_index
    }

    /// The move that undoes this one, if the operator has one.
    ///
    /// Swaps, reversals and cross-exchanges undo themselves. Relocations
    /// exchange their endpoints, and a split and a merge undo each other. A
    /// shuffle cannot be undone by a descriptor.
    pub fn inverse(&self) -> Option<Move> {
        if self.kind.is_self_inverse() {
            return Some(*self);
        }
        let swapped = Move {
            kind: self.kind,
            from_vehicle: self.to_vehicle,
            to_vehicle: self.from_vehicle,
            from_index: self.to_index,
            to_index: self.from_index,
        };
        match self.kind {
            MoveKind::RouteShuffle => None,
            MoveKind::RouteSplit => Some(Move {
                kind: MoveKind::RouteMerge,
                ..swapped
            }),
            MoveKind::RouteMerge => Some(Move {
                kind: MoveKind::RouteSplit,
                ..swapped
            }),
            _ => Some(swapped),
        }
    }

    /// Returns `true` if `other` undoes `self`.
    pub fn is_inverse_of(&self, other: &Move) -> bool {
        other.inverse().as_ref() == Some(self)
    }

    /// Applies the move to marker-free routes.
    ///
    /// Returns `false`, leaving `routes` untouched, when the move does not
    /// fit them (index out of range, missing vehicle, unmet precondition).
    pub fn apply<R: Rng>(&self, routes: &mut RouteMap, rng: &mut R) -> bool {
        let (i, j) = (self.from_index, self.to_index);
        if self.kind.is_intra() {
            let Some(r) = routes.get_mut(&self.from_vehicle) else {
                return false;
            };
            return match self.kind {
                MoveKind::IntraRelocate => intra::relocate(r, i, j),
                MoveKind::IntraSwap => intra::swap(r, i, j),
                MoveKind::TwoOpt => intra::two_opt(r, i, j),
                MoveKind::RouteReverse => intra::reverse(r),
                _ => intra::shuffle(r, rng),
            };
        }
        with_pair(routes, self.from_vehicle, self.to_vehicle, |a, b| match self.kind {
            MoveKind::InterRelocate => inter::relocate(a, i, b, j),
            MoveKind::InterSwap => inter::swap(a, i, b, j),
            MoveKind::CrossExchange => inter::cross_exchange(a, i, b, j),
            MoveKind::VehicleSwap => route::vehicle_swap(a, b),
            MoveKind::RouteSplit => route::split(a, i, b, j),
            _ => route::merge(a, b, j),
        })
    }
}

/// Runs `f` on two distinct routes. Returns `false` if either is missing.
fn with_pair<F>(routes: &mut RouteMap, a: VehicleId, b: VehicleId, f: F) -> bool
where
    F: FnOnce(&mut Vec<Stop>, &mut Vec<Stop>) -> bool,
{
    if a == b {
        return false;
    }
    let Some(mut first) = routes.remove(&a) else {
        return false;
    };
    let applied = match routes.get_mut(&b) {
        Some(second) => f(&mut first, second),
        None => false,
    };
    routes.insert(a, first);
    applied
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind.is_intra() {
            write!(
                f,
                "{:?}(v{} {}->{})",
                self.kind, self.from_vehicle, self.from_index, self.to_index
            )
        } else {
            write!(
                f,
                "{:?}(v{}[{}] -> v{}[{}])",
                self.kind, self.from_vehicle, self.from_index, self.to_vehicle, self.to_index
            )
        }
    }
}
