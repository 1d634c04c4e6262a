//! Route stops.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{OrderId, Position, VehicleId, WarehouseId};

/// One visit in a vehicle's route.
///
/// Every route is `Start, (Deliver | Refill)*, Return`. The markers are
/// owned by their vehicle and never move between routes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Stop {
    /// Where the vehicle stands when the horizon opens.
    Start {
        vehicle: VehicleId,
        position: Position,
    },
    /// Hand over `amount` units of an order.
    Deliver {
        order: OrderId,
        position: Position,
        amount: u32,
    },
    /// Load `amount` units at a warehouse.
    Refill {
        warehouse: WarehouseId,
        position: Position,
        amount: u32,
    },
    /// Mandatory final stop at the main warehouse.
    Return {
        vehicle: VehicleId,
        position: Position,
    },
}

impl Stop {
    pub fn position(&self) -> Position {
        match self {
            Stop::Start { position, .. }
            | Stop::Deliver { position, .. }
            | Stop::Refill { position, .. }
            | Stop::Return { position, .. } => *position,
        }
    }

    /// Returns `true` for `Start` and `Return`.
    pub fn is_marker(&self) -> bool {
        matches!(self, Stop::Start { .. } | Stop::Return { .. })
    }

    /// Product moved by this stop; zero for markers.
    pub fn amount(&self) -> u32 {
        match self {
            Stop::Deliver { amount, .. } | Stop::Refill { amount, .. } => *amount,
            Stop::Start { .. } | Stop::Return { .. } => 0,
        }
    }

    pub fn order(&self) -> Option<OrderId> {
        match self {
            Stop::Deliver { order, .. } => Some(*order),
            _ => None,
        }
    }

    pub fn warehouse(&self) -> Option<WarehouseId> {
        match self {
            Stop::Refill { warehouse, .. } => Some(*warehouse),
            _ => None,
        }
    }

    /// Returns `true` if `other` services the same order or warehouse, so
    /// the two can be served back to back without a new dwell.
    pub fn same_target(&self, other: &Stop) -> bool {
        match (self, other) {
            (Stop::Deliver { order: a, .. }, Stop::Deliver { order: b, .. }) => a == b,
            (Stop::Refill { warehouse: a, .. }, Stop::Refill { warehouse: b, .. }) => a == b,
            _ => false,
        }
    }

    /// Absorbs `other` into `self` when both service the same target.
    ///
    /// Returns `false` (leaving `self` untouched) otherwise.
    pub fn merge(&mut self, other: &Stop) -> bool {
        if !self.same_target(other) {
            return false;
        }
        match self {
            Stop::Deliver { amount, .. } | Stop::Refill { amount, .. } => {
                *amount += other.amount();
                true
            }
            Stop::Start { .. } | Stop::Return { .. } => false,
        }
    }
}

impl fmt::Display for Stop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stop::Start { vehicle, position } => write!(f, "start[{vehicle}] {position}"),
            Stop::Deliver {
                order,
                position,
                amount,
            } => write!(f, "deliver {amount} to order {order} at {position}"),
            Stop::Refill {
                warehouse,
                position,
                amount,
            } => write!(f, "refill {amount} at warehouse {warehouse} {position}"),
            Stop::Return { vehicle, position } => write!(f, "return[{vehicle}] {position}"),
        }
    }
}
