//! Two-route operators: relocate, swap and cross-exchange.
//!
//! # Algorithm
//!
//! Samplers pick a source route and a distinct target route, then random
//! positions. Cross-exchange (2-opt*) swaps the tails after `i` and `j`:
//!
//! ```text
//! A = [a0, .., ai, ai+1, ..]      A' = [a0, .., ai, bj+1, ..]
//! B = [b0, .., bj, bj+1, ..]  ->  B' = [b0, .., bj, ai+1, ..]
//! ```
//!
//! # Reference
//!
//! Potvin, J.-Y. & Rousseau, J.-M. (1995). "An Exchange Heuristic for
//! Routeing Problems with Time Windows", *Journal of the Operational Research
//! Society* 46(12), 1433-1446.

use rand::Rng;

use super::{Move, MoveKind};
use crate::models::{RouteMap, Stop, VehicleId};

/// Picks two distinct routes; each may be required to be non-empty.
pub(crate) fn pick_pair<R: Rng>(
    routes: &RouteMap,
    source_non_empty: bool,
    target_non_empty: bool,
    rng: &mut R,
) -> Option<((VehicleId, usize), (VehicleId, usize))> {
    let all: Vec<(VehicleId, usize)> = routes.iter().map(|(id, r)| (*id, r.len())).collect();
    let sources: Vec<(VehicleId, usize)> = all
        .iter()
        .copied()
        .filter(|(_, n)| !source_non_empty || *n > 0)
        .collect();
    if sources.is_empty() {
        return None;
    }
    let source = sources[rng.random_range(0..sources.len())];
    let targets: Vec<(VehicleId, usize)> = all
        .iter()
        .copied()
        .filter(|(id, n)| *id != source.0 && (!target_non_empty || *n > 0))
        .collect();
    if targets.is_empty() {
        return None;
    }
    Some((source, targets[rng.random_range(0..targets.len())]))
}

/// Draws a random two-route move of `kind`, or `None` if no pair fits.
pub(crate) fn sample<R: Rng>(kind: MoveKind, routes: &RouteMap, rng: &mut R) -> Option<Move> {
    match kind {
        MoveKind::InterRelocate => {
            let ((a, na), (b, nb)) = pick_pair(routes, true, false, rng)?;
            let i = rng.random_range(0..na);
            let j = rng.random_range(0..=nb);
            Some(Move::inter(kind, a, i, b, j))
        }
        MoveKind::InterSwap => {
            let ((a, na), (b, nb)) = pick_pair(routes, true, true, rng)?;
            let i = rng.random_range(0..na);
            let j = rng.random_range(0..nb);
            Some(Move::inter(kind, a, i, b, j))
        }
        MoveKind::CrossExchange => {
            let ((a, na), (b, nb)) = pick_pair(routes, true, true, rng)?;
            let i = rng.random_range(0..na);
            let j = rng.random_range(0..nb);
            if i + 1 == na && j + 1 == nb {
                return None;
            }
            Some(Move::inter(kind, a, i, b, j))
        }
        _ => None,
    }
}

/// Moves `from[i]` so it lands at `to[j]`.
pub(crate) fn relocate(from: &mut Vec<Stop>, i: usize, to: &mut Vec<Stop>, j: usize) -> bool {
    if i >= from.len() || j > to.len() {
        return false;
    }
    let stop = from.remove(i);
    to.insert(j, stop);
    true
}

pub(crate) fn swap(a: &mut [Stop], i: usize, b: &mut [Stop], j: usize) -> bool {
    if i >= a.len() || j >= b.len() {
        return false;
    }
    std::mem::swap(&mut a[i], &mut b[j]);
    true
}

/// Swaps the tails after `a[i]` and `b[j]`; at least one tail must be non-empty.
pub(crate) fn cross_exchange(a: &mut Vec<Stop>, i: usize, b: &mut Vec<Stop>, j: usize) -> bool {
    if i >= a.len() || j >= b.len() || (i + 1 == a.len() && j + 1 == b.len()) {
        return false;
    }
    let tail_a = a.split_off(i + 1);
    let tail_b = b.split_off(j + 1);
    a.extend(tail_b);
    b.extend(tail_a);
    true
}
