//! Configuration and snapshot errors.
//!
//! Constraint violations found while simulating a route are *not* errors;
//! they are [`Diagnostic`](crate::evaluation::Diagnostic)s folded into the
//! fitness. The variants here describe malformed input that no amount of
//! searching can repair.

use thiserror::Error;

use crate::models::{OrderId, VehicleId, WarehouseId};

/// Errors raised while building a snapshot, a solution, or a configuration.
#[derive(Debug, Error)]
pub enum RoutingError {
    #[error("no warehouse is flagged as the main warehouse")]
    NoMainWarehouse,

    #[error("vehicle {0} is not part of the snapshot")]
    UnknownVehicle(VehicleId),

    #[error("order {0} is not part of the snapshot")]
    UnknownOrder(OrderId),

    #[error("warehouse {0} is not part of the snapshot")]
    UnknownWarehouse(WarehouseId),

    #[error("vehicle {0} has no route")]
    MissingRoute(VehicleId),

    #[error("route of vehicle {vehicle} is malformed: {reason}")]
    MalformedRoute { vehicle: VehicleId, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("configuration parse error: {0}")]
    ConfigParse(#[from] serde_json::Error),
}

/// Shorthand result type for fallible constructors in this crate.
pub type RoutingResult<T> = Result<T, RoutingError>;
