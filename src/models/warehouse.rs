//! Refill points.

use serde::{Deserialize, Serialize};

use super::{Position, WarehouseId};

/// A place where vehicles load product and, normally, refuel.
///
/// Exactly one warehouse per snapshot is the *main* plant, where every
/// route ends. A broken-down vehicle can be offered as a temporary
/// warehouse (`was_vehicle`) so others can drain its tank; those do not
/// refuel the visiting vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warehouse {
    id: WarehouseId,
    position: Position,
    stock: u32,
    #[serde(default)]
    is_main: bool,
    #[serde(default)]
    was_vehicle: bool,
}

impl Warehouse {
    /// Creates a secondary warehouse holding `stock` units.
    pub fn new(id: WarehouseId, position: Position, stock: u32) -> Self {
        Self {
            id,
            position,
            stock,
            is_main: false,
            was_vehicle: false,
        }
    }

    /// Creates the main plant.
    pub fn main(id: WarehouseId, position: Position, stock: u32) -> Self {
        Self::new(id, position, stock).with_main(true)
    }

    pub fn with_main(mut self, is_main: bool) -> Self {
        self.is_main = is_main;
        self
    }

    pub fn with_was_vehicle(mut self, was_vehicle: bool) -> Self {
        self.was_vehicle = was_vehicle;
        self
    }

    pub fn id(&self) -> WarehouseId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn is_main(&self) -> bool {
        self.is_main
    }

    /// `true` when this depot is a stranded vehicle rather than a plant.
    pub fn was_vehicle(&self) -> bool {
        self.was_vehicle
    }
}
