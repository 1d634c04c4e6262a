//! GLP orders placed by customers.

use serde::{Deserialize, Serialize};

use super::{OrderId, Position, Time};

/// Product still owed to a customer, with its delivery deadline.
///
/// `forgiveness` scales both the reward and the lateness penalty of this
/// order. Values below `1.0` de-prioritize orders that were already
/// penalized in an earlier horizon.
///
/// # Examples
///
/// ```
/// use glp_routing::models::{Order, OrderId, Position, Time};
///
/// let due = Time::from_ymd_hm(2025, 1, 1, 18, 0).unwrap();
/// let o = Order::new(OrderId(9), Position::new(40.0, 20.0), 12, due).with_urgent(true);
/// assert_eq!(o.amount(), 12);
/// assert!(o.is_urgent());
/// assert_eq!(o.forgiveness(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    id: OrderId,
    position: Position,
    amount: u32,
    deadline: Time,
    #[serde(default)]
    urgent: bool,
    #[serde(default = "default_forgiveness")]
    forgiveness: f64,
}

fn default_forgiveness() -> f64 {
    1.0
}

impl Order {
    pub fn new(id: OrderId, position: Position, amount: u32, deadline: Time) -> Self {
        Self {
            id,
            position,
            amount,
            deadline,
            urgent: false,
            forgiveness: 1.0,
        }
    }

    pub fn with_urgent(mut self, urgent: bool) -> Self {
        self.urgent = urgent;
        self
    }

    /// Sets the forgiveness multiplier (negative values become zero).
    pub fn with_forgiveness(mut self, forgiveness: f64) -> Self {
        self.forgiveness = forgiveness.max(0.0);
        self
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn position(&self) -> Position {
        self.position
    }

    /// Remaining amount to deliver.
    pub fn amount(&self) -> u32 {
        self.amount
    }

    pub fn deadline(&self) -> Time {
        self.deadline
    }

    pub fn is_urgent(&self) -> bool {
        self.urgent
    }

    pub fn forgiveness(&self) -> f64 {
        self.forgiveness
    }
}
