//! Whole-route operators: vehicle swap, split and merge.
//!
//! A split hands the tail of a route to an idle vehicle; a merge appends a
//! whole route to the end of another non-empty route. Each undoes the
//! other, which keeps both usable as tabu entries.

use rand::Rng;

use super::inter::pick_pair;
use super::{Move, MoveKind};
use crate::models::{RouteMap, Stop, VehicleId};

/// Draws a random whole-route move of `kind`, or `None` if nothing fits.
pub(crate) fn sample<R: Rng>(kind: MoveKind, routes: &RouteMap, rng: &mut R) -> Option<Move> {
    match kind {
        MoveKind::VehicleSwap => {
            let ((a, _), (b, _)) = pick_pair(routes, true, false, rng)?;
            Some(Move::inter(kind, a, 0, b, 0))
        }
        MoveKind::RouteSplit => {
            let long: Vec<(VehicleId, usize)> = routes
                .iter()
                .filter(|(_, r)| r.len() >= 2)
                .map(|(id, r)| (*id, r.len()))
                .collect();
            let idle: Vec<VehicleId> = routes
                .iter()
                .filter(|(_, r)| r.is_empty())
                .map(|(id, _)| *id)
                .collect();
            if long.is_empty() || idle.is_empty() {
                return None;
            }
            let (a, n) = long[rng.random_range(0..long.len())];
            let b = idle[rng.random_range(0..idle.len())];
            let at = rng.random_range(1..n);
            Some(Move::inter(kind, a, at, b, 0))
        }
        MoveKind::RouteMerge => {
            let ((from, _), (into, len)) = pick_pair(routes, true, true, rng)?;
            Some(Move::inter(kind, from, 0, into, len))
        }
        _ => None,
    }
}

pub(crate) fn vehicle_swap(a: &mut Vec<Stop>, b: &mut Vec<Stop>) -> bool {
    if a.is_empty() && b.is_empty() {
        return false;
    }
    std::mem::swap(a, b);
    true
}

/// Moves `from[at..]` to the idle route `to`; `to_index` must be zero.
pub(crate) fn split(from: &mut Vec<Stop>, at: usize, to: &mut Vec<Stop>, to_index: usize) -> bool {
    if !to.is_empty() || to_index != 0 || at == 0 || at >= from.len() {
        return false;
    }
    *to = from.split_off(at);
    true
}

/// Appends all of `from` to `into`, whose current length must be `at`.
pub(crate) fn merge(from: &mut Vec<Stop>, into: &mut Vec<Stop>, at: usize) -> bool {
    if from.is_empty() || into.is_empty() || into.len() != at {
        return false;
    }
    into.append(from);
    true
}
