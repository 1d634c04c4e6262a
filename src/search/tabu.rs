//! Bounded FIFO tabu memory of moves.

use std::collections::VecDeque;

use crate::local_search::Move;

/// Recently forbidden moves, oldest first.
///
/// The search records the inverse of every accepted move, so the list
/// forbids stepping straight back. Pushing a move also drops any stored
/// entry it undoes, since that entry no longer describes a way back.
///
/// # Examples
///
/// ```
/// use glp_routing::local_search::{Move, MoveKind};
/// use glp_routing::models::VehicleId;
/// use glp_routing::search::TabuList;
///
/// let mut tabu = TabuList::new(2);
/// let mv = Move::intra(MoveKind::IntraSwap, VehicleId(1), 0, 3);
/// tabu.push(mv);
/// assert!(tabu.contains(&mv));
/// ```
#[derive(Debug, Clone)]
pub struct TabuList {
    entries: VecDeque<Move>,
    capacity: usize,
}

impl TabuList {
    /// A list holding at most `capacity` moves; zero disables it.
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, mv: Move) {
        if self.capacity == 0 {
            return;
        }
        self.entries.retain(|e| !e.is_inverse_of(&mv) && *e != mv);
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(mv);
    }

    pub fn contains(&self, mv: &Move) -> bool {
        self.entries.contains(mv)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local_search::MoveKind;
    use crate::models::{OrderId, Position, RouteMap, Stop, VehicleId};
    use crate::rng::create_rng;

    fn relocate(i: usize, j: usize) -> Move {
        Move::intra(MoveKind::IntraRelocate, VehicleId(1), i, j)
    }

    #[test]
    fn test_fifo_eviction() {
        let mut tabu = TabuList::new(2);
        tabu.push(relocate(0, 1));
        tabu.push(relocate(0, 2));
        tabu.push(relocate(0, 3));
        assert_eq!(tabu.len(), 2);
        assert!(!tabu.contains(&relocate(0, 1)));
        assert!(tabu.contains(&relocate(0, 3)));
    }

    #[test]
    fn test_push_drops_undone_entry() {
        let mut tabu = TabuList::new(5);
        tabu.push(relocate(1, 4));
        tabu.push(relocate(4, 1));
        assert_eq!(tabu.len(), 1);
        assert!(tabu.contains(&relocate(4, 1)));
    }

    #[test]
    fn test_duplicate_is_refreshed() {
        let mut tabu = TabuList::new(2);
        tabu.push(relocate(0, 1));
        tabu.push(relocate(0, 2));
        tabu.push(relocate(0, 1));
        tabu.push(relocate(0, 3));
        assert!(tabu.contains(&relocate(0, 1)));
        assert!(!tabu.contains(&relocate(0, 2)));
    }

    #[test]
    fn test_zero_capacity_disables() {
        let mut tabu = TabuList::new(0);
        tabu.push(relocate(0, 1));
        assert!(tabu.is_empty());
        assert_eq!(tabu.capacity(), 0);
    }

    #[test]
    fn test_undoing_a_symmetric_move_is_tabu() {
        let mut rng = create_rng(3);
        let v = VehicleId(1);
        let line: Vec<Stop> = (0..5)
            .map(|o| Stop::Deliver {
                order: OrderId(o),
                position: Position::new(f64::from(o), 0.0),
                amount: 1,
            })
            .collect();
        let before: RouteMap = [(v, line)].into_iter().collect();

        for (kind, i, j) in [
            (MoveKind::IntraSwap, 0, 2),
            (MoveKind::TwoOpt, 0, 3),
            (MoveKind::RouteReverse, 0, 4),
        ] {
            let accepted = Move::intra(kind, v, i, j);
            let mut tabu = TabuList::new(4);
            tabu.push(accepted.inverse().expect("invertible"));

            let mut routes = before.clone();
            assert!(accepted.apply(&mut routes, &mut rng));
            // Written with its endpoints the other way round, the step back
            // is still the same move.
            let undo = Move::intra(kind, v, j, i);
            assert!(undo.apply(&mut routes, &mut rng));
            assert_eq!(routes, before, "{kind:?}");
            assert!(tabu.contains(&undo), "{kind:?}");
        }
    }
}
