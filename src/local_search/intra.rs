//! Single-route operators: relocate, swap, 2-opt, reverse, shuffle.
//!
//! # Algorithm
//!
//! Each sampler picks a random route long enough for its operator, then
//! random positions inside it. Positions refer to the marker-free route, so
//! the Start and Return markers can never be picked.
//!
//! 2-opt reverses the segment strictly after `i` up to `j`:
//!
//! ```text
//! [s0, .., si, si+1, .., sj, ..]  ->  [s0, .., si, sj, .., si+1, ..]
//! ```
//!
//! # Reference
//!
//! Croes, G.A. (1958). "A method for solving traveling salesman problems",
//! *Operations Research* 6(6), 791-812.

use rand::seq::SliceRandom;
use rand::Rng;

use super::{Move, MoveKind};
use crate::models::{RouteMap, Stop, VehicleId};

/// Picks a random route with at least `min_len` stops.
fn pick_route<R: Rng>(routes: &RouteMap, min_len: usize, rng: &mut R) -> Option<(VehicleId, usize)> {
    let eligible: Vec<(VehicleId, usize)> = routes
        .iter()
        .filter(|(_, r)| r.len() >= min_len)
        .map(|(id, r)| (*id, r.len()))
        .collect();
    if eligible.is_empty() {
        return None;
    }
    Some(eligible[rng.random_range(0..eligible.len())])
}

/// Draws a random single-route move of `kind`, or `None` if no route fits.
pub(crate) fn sample<R: Rng>(kind: MoveKind, routes: &RouteMap, rng: &mut R) -> Option<Move> {
    match kind {
        MoveKind::IntraRelocate | MoveKind::IntraSwap => {
            let (v, n) = pick_route(routes, 2, rng)?;
            let from = rng.random_range(0..n);
            let to = rng.random_range(0..n);
            if from == to {
                return None;
            }
            if kind == MoveKind::IntraSwap {
                Some(Move::intra(kind, v, from.min(to), from.max(to)))
            } else {
                Some(Move::intra(kind, v, from, to))
            }
        }
        MoveKind::TwoOpt => {
            let (v, n) = pick_route(routes, 4, rng)?;
            let i = rng.random_range(0..n - 2);
            let j = rng.random_range(i + 2..n);
            Some(Move::intra(kind, v, i, j))
        }
        MoveKind::RouteReverse => {
            let (v, n) = pick_route(routes, 2, rng)?;
            Some(Move::intra(kind, v, 0, n - 1))
        }
        MoveKind::RouteShuffle => {
            let (v, n) = pick_route(routes, 3, rng)?;
            Some(Move::intra(kind, v, 0, n - 1))
        }
        _ => None,
    }
}

/// Removes the stop at `from` and reinserts it so it ends up at `to`.
pub(crate) fn relocate(route: &mut Vec<Stop>, from: usize, to: usize) -> bool {
    let n = route.len();
    if from >= n || to >= n || from == to {
        return false;
    }
    let stop = route.remove(from);
    route.insert(to, stop);
    true
}

pub(crate) fn swap(route: &mut [Stop], i: usize, j: usize) -> bool {
    if i == j || i.max(j) >= route.len() {
        return false;
    }
    route.swap(i, j);
    true
}

/// Reverses `(min(i, j), max(i, j)]`; the segment must hold two stops or more.
pub(crate) fn two_opt(route: &mut [Stop], i: usize, j: usize) -> bool {
    let (lo, hi) = (i.min(j), i.max(j));
    if hi >= route.len() || hi < lo + 2 {
        return false;
    }
    route[lo + 1..=hi].reverse();
    true
}

pub(crate) fn reverse(route: &mut [Stop]) -> bool {
    if route.len() < 2 {
        return false;
    }
    route.reverse();
    true
}

pub(crate) fn shuffle<R: Rng>(route: &mut [Stop], rng: &mut R) -> bool {
    if route.len() < 3 {
        return false;
    }
    route.shuffle(rng);
    true
}
