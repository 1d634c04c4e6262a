//! Per-snapshot memo of oracle answers.

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::models::{Position, PositionKey};

/// Thread-safe memo of `(from, to) -> distance` answers.
///
/// Reads take a shared lock; a miss is computed outside any lock and then
/// inserted under the write lock. Two threads racing on the same miss both
/// ask the oracle and store the same answer.
#[derive(Debug, Default)]
pub struct DistanceCache {
    entries: RwLock<HashMap<(PositionKey, PositionKey), Option<f64>>>,
}

impl DistanceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached answer, or computes and stores it with `compute`.
    pub fn get_or_insert_with<F>(&self, from: Position, to: Position, compute: F) -> Option<f64>
    where
        F: FnOnce() -> Option<f64>,
    {
        let key = (from.key(), to.key());
        if let Some(hit) = self.entries.read().get(&key) {
            return *hit;
        }
        let value = compute();
        self.entries.write().entry(key).or_insert(value);
        value
    }

    /// Number of memoized pairs.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
