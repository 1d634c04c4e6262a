//! Fleet vehicles as seen by one planning snapshot.

use serde::{Deserialize, Serialize};

use super::{Position, VehicleId};

/// A tank truck with its live product load and fuel level.
///
/// Capacity and load are in cubic metres of product, fuel in gallons,
/// tare weight in tonnes.
///
/// # Examples
///
/// ```
/// use glp_routing::models::{Position, Vehicle, VehicleId};
///
/// let v = Vehicle::new(VehicleId(1), 25, Position::new(12.0, 8.0))
///     .with_current_load(10)
///     .with_weight(2.5);
/// assert_eq!(v.capacity(), 25);
/// assert_eq!(v.current_load(), 10);
/// assert_eq!(v.max_fuel(), 25.0);
/// assert!(v.is_available());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    id: VehicleId,
    capacity: u32,
    current_load: u32,
    max_fuel: f64,
    current_fuel: f64,
    weight: f64,
    position: Position,
    #[serde(default = "default_available")]
    available: bool,
    #[serde(default)]
    wait_minutes: i64,
}

fn default_available() -> bool {
    true
}

impl Vehicle {
    /// Creates an empty vehicle with a full 25-gallon tank and a 2.5 t tare.
    pub fn new(id: VehicleId, capacity: u32, position: Position) -> Self {
        Self {
            id,
            capacity,
            current_load: 0,
            max_fuel: 25.0,
            current_fuel: 25.0,
            weight: 2.5,
            position,
            available: true,
            wait_minutes: 0,
        }
    }

    /// Sets the product currently on board (clamped to capacity).
    pub fn with_current_load(mut self, load: u32) -> Self {
        self.current_load = load.min(self.capacity);
        self
    }

    /// Sets tank size and refuels to full.
    pub fn with_max_fuel(mut self, max_fuel: f64) -> Self {
        self.max_fuel = max_fuel;
        self.current_fuel = max_fuel;
        self
    }

    /// Sets the current fuel level (clamped to the tank size).
    pub fn with_current_fuel(mut self, fuel: f64) -> Self {
        self.current_fuel = fuel.clamp(0.0, self.max_fuel);
        self
    }

    /// Sets tare weight in tonnes.
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Marks the vehicle as out of service for this horizon.
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Minutes the vehicle must wait before it can depart, e.g. while
    /// finishing a transfer or leaving maintenance.
    pub fn with_wait_minutes(mut self, minutes: i64) -> Self {
        self.wait_minutes = minutes.max(0);
        self
    }

    pub fn id(&self) -> VehicleId {
        self.id
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn current_load(&self) -> u32 {
        self.current_load
    }

    pub fn max_fuel(&self) -> f64 {
        self.max_fuel
    }

    pub fn current_fuel(&self) -> f64 {
        self.current_fuel
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn wait_minutes(&self) -> i64 {
        self.wait_minutes
    }
}
