//! Constraint violations found while simulating a solution.

use std::fmt;

use serde::Serialize;

use crate::models::{OrderId, VehicleId};

/// A constraint violation recorded during simulation.
///
/// Diagnostics never abort a simulation; each one is priced into the
/// fitness and makes the solution infeasible.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A delivery was attempted with less product on board than promised.
    ProductDeficit {
        vehicle: VehicleId,
        order: OrderId,
        /// Units that were not on board.
        shortfall: u32,
    },
    /// A leg needed more fuel than was left in the tank.
    FuelDeficit {
        vehicle: VehicleId,
        /// Index of the stop the leg leads to.
        stop_index: usize,
        needed: f64,
        available: f64,
    },
    /// A delivery arrived after the order's deadline.
    LateDelivery {
        vehicle: VehicleId,
        order: OrderId,
        minutes_late: i64,
    },
    /// No open path leads to a service stop.
    UnreachableStop { vehicle: VehicleId, stop_index: usize },
    /// No open path leads back to the main warehouse.
    ReturnNotReached { vehicle: VehicleId },
    /// The vehicle finished below its fuel reserve.
    LowFinalFuel {
        vehicle: VehicleId,
        fuel: f64,
        reserve: f64,
    },
    /// An order due within the horizon was not fully served.
    Undelivered { order: OrderId, remaining: u32 },
}

impl Diagnostic {
    /// The vehicle the violation belongs to, if any.
    pub fn vehicle(&self) -> Option<VehicleId> {
        match self {
            Diagnostic::ProductDeficit { vehicle, .. }
            | Diagnostic::FuelDeficit { vehicle, .. }
            | Diagnostic::LateDelivery { vehicle, .. }
            | Diagnostic::UnreachableStop { vehicle, .. }
            | Diagnostic::ReturnNotReached { vehicle }
            | Diagnostic::LowFinalFuel { vehicle, .. } => Some(*vehicle),
            Diagnostic::Undelivered { .. } => None,
        }
    }

    pub fn is_product_deficit(&self) -> bool {
        matches!(self, Diagnostic::ProductDeficit { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::ProductDeficit {
                vehicle,
                order,
                shortfall,
            } => write!(
                f,
                "vehicle {vehicle}: GLP deficit of {shortfall} delivering order {order}"
            ),
            Diagnostic::FuelDeficit {
                vehicle,
                stop_index,
                needed,
                available,
            } => write!(
                f,
                "vehicle {vehicle}: fuel deficit before stop {stop_index} \
                 (needs {needed:.2}, has {available:.2})"
            ),
            Diagnostic::LateDelivery {
                vehicle,
                order,
                minutes_late,
            } => write!(
                f,
                "vehicle {vehicle}: order {order} delivered {minutes_late} min late"
            ),
            Diagnostic::UnreachableStop {
                vehicle,
                stop_index,
            } => write!(f, "vehicle {vehicle}: stop {stop_index} is unreachable"),
            Diagnostic::ReturnNotReached { vehicle } => {
                write!(f, "vehicle {vehicle}: cannot reach the main warehouse")
            }
            Diagnostic::LowFinalFuel {
                vehicle,
                fuel,
                reserve,
            } => write!(
                f,
                "vehicle {vehicle}: ends with {fuel:.2} fuel, below reserve {reserve:.2}"
            ),
            Diagnostic::Undelivered { order, remaining } => {
                write!(f, "order {order}: {remaining} units undelivered")
            }
        }
    }
}
