//! Deadline-ordered greedy construction.
//!
//! # Algorithm
//!
//! 1. Sort delivery chunks by deadline, urgent orders first among ties.
//! 2. For each chunk, among vehicles whose tracked load already covers it,
//!    pick the one with the fewest assigned stops.
//! 3. Otherwise take the vehicle with the most spare capacity and insert
//!    refill chunks (secondary warehouses first) ahead of the delivery
//!    until the load covers it, never loading past capacity.
//! 4. If refill stock runs out, the chunk goes to the vehicle carrying the
//!    most product; the simulator reports the shortfall.
//!
//! The result is deterministic and ignores travel distances. It serves as
//! an optional extra seed for the search.
//!
//! # Complexity
//!
//! O(D log D + D · V + R) where D = delivery chunks, V = vehicles and
//! R = refill chunks.

use std::sync::Arc;

use crate::models::{Environment, RouteMap, Solution, Stop, VehicleId};

struct Truck {
    id: VehicleId,
    load: u32,
    capacity: u32,
    stops: usize,
}

/// Index of the truck maximizing `key`, lowest id on ties. `trucks` is non-empty.
fn spare_leader(trucks: &[Truck], key: impl Fn(&Truck) -> u32) -> usize {
    let mut best = 0;
    for (idx, t) in trucks.iter().enumerate().skip(1) {
        if key(t) > key(&trucks[best]) {
            best = idx;
        }
    }
    best
}

/// Builds a greedy solution that serves the most pressing deliveries first.
pub fn urgency_first(env: &Arc<Environment>) -> Solution {
    let mut trucks: Vec<Truck> = env
        .vehicles()
        .map(|v| Truck {
            id: v.id(),
            load: v.current_load(),
            capacity: v.capacity(),
            stops: 0,
        })
        .collect();
    let mut interiors: RouteMap = trucks.iter().map(|t| (t.id, Vec::new())).collect();
    if trucks.is_empty() {
        return Solution::with_interiors(Arc::clone(env), interiors);
    }

    let mut deliveries: Vec<&Stop> = env.stops().deliveries().iter().collect();
    deliveries.sort_by_key(|s| {
        let order = s.order().and_then(|id| env.order(id));
        (
            order.map(|o| o.deadline()),
            order.map(|o| !o.is_urgent()),
            s.order(),
        )
    });
    let mut refills = env.stops().refills().iter().peekable();

    for delivery in deliveries {
        let amount = delivery.amount();
        let covered = trucks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.load >= amount)
            .min_by_key(|(_, t)| (t.stops, t.id))
            .map(|(idx, _)| idx);

        let idx = match covered {
            Some(idx) => idx,
            None => {
                let roomiest = spare_leader(&trucks, |t| t.capacity - t.load);
                let t = &mut trucks[roomiest];
                while t.load < amount {
                    let Some(refill) = refills.next_if(|r| t.load + r.amount() <= t.capacity) else {
                        break;
                    };
                    t.load += refill.amount();
                    t.stops += 1;
                    if let Some(route) = interiors.get_mut(&t.id) {
                        route.push(refill.clone());
                    }
                }
                if t.load >= amount {
                    roomiest
                } else {
                    spare_leader(&trucks, |t| t.load)
                }
            }
        };

        let truck = &mut trucks[idx];
        truck.load = truck.load.saturating_sub(amount);
        truck.stops += 1;
        if let Some(route) = interiors.get_mut(&truck.id) {
            route.push(delivery.clone());
        }
    }

    Solution::with_interiors(Arc::clone(env), interiors)
}
