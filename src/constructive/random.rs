//! Random assignment of service stops.
//!
//! Shuffles every Deliver and Refill stop of the stop universe and hands
//! each one to a uniformly chosen vehicle, appending it to that vehicle's
//! route. Used as the restart point of the iterated local search.
//!
//! # Complexity
//!
//! O(S) where S = number of service stops.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::models::{Environment, RouteMap, Solution};

/// Builds a solution that visits every service stop once, in random order
/// on random vehicles.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use glp_routing::constructive::random_solution;
/// use glp_routing::models::*;
/// use glp_routing::rng::create_rng;
///
/// let now = Time::from_ymd_hm(2025, 1, 1, 0, 0).unwrap();
/// let env = Arc::new(Environment::new(
///     now,
///     24 * 60,
///     vec![
///         Vehicle::new(VehicleId(1), 25, Position::new(0.0, 0.0)),
///         Vehicle::new(VehicleId(2), 15, Position::new(0.0, 0.0)),
///     ],
///     vec![Order::new(OrderId(1), Position::new(4.0, 4.0), 12, now.add_minutes(600))],
///     vec![Warehouse::main(WarehouseId(0), Position::new(0.0, 0.0), 100)],
/// ).unwrap());
///
/// let mut rng = create_rng(42);
/// let solution = random_solution(&env, &mut rng);
/// assert_eq!(solution.service_stop_count(), env.stops().service_stops().count());
/// ```
pub fn random_solution<R: Rng>(env: &Arc<Environment>, rng: &mut R) -> Solution {
    let vehicles = env.vehicle_ids();
    let mut interiors: RouteMap = vehicles.iter().map(|id| (*id, Vec::new())).collect();
    if vehicles.is_empty() {
        return Solution::with_interiors(Arc::clone(env), interiors);
    }

    let mut pool: Vec<_> = env.stops().service_stops().cloned().collect();
    pool.shuffle(rng);
    for stop in pool {
        let vehicle = vehicles[rng.random_range(0..vehicles.len())];
        if let Some(route) = interiors.get_mut(&vehicle) {
            route.push(stop);
        }
    }
    Solution::with_interiors(Arc::clone(env), interiors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Order, OrderId, Position, Stop, Time, Vehicle, VehicleId, Warehouse, WarehouseId};
    use crate::rng::create_rng;

    fn env(vehicles: usize) -> Arc<Environment> {
        let now = Time::from_ymd_hm(2025, 3, 1, 8, 0).expect("valid time");
        let fleet = (0..vehicles)
            .map(|i| Vehicle::new(VehicleId(i as u32 + 1), 10, Position::new(i as f64, 0.0)))
            .collect();
        let orders = vec![
            Order::new(OrderId(1), Position::new(3.0, 3.0), 9, now.add_minutes(300)),
            Order::new(OrderId(2), Position::new(6.0, 1.0), 4, now.add_minutes(500)),
        ];
        let warehouses = vec![
            Warehouse::main(WarehouseId(1), Position::new(0.0, 0.0), 50),
            Warehouse::new(WarehouseId(2), Position::new(9.0, 9.0), 10),
        ];
        Arc::new(Environment::new(now, 720, fleet, orders, warehouses).expect("valid env"))
    }

    #[test]
    fn test_every_stop_assigned_once() {
        let env = env(3);
        let mut rng = create_rng(17);
        let solution = random_solution(&env, &mut rng);
        assert_eq!(solution.routes().len(), 3);
        assert_eq!(solution.service_stop_count(), env.stops().service_stops().count());
        let delivered: u32 = solution
            .routes()
            .values()
            .flatten()
            .filter(|s| matches!(s, Stop::Deliver { .. }))
            .map(Stop::amount)
            .sum();
        assert_eq!(delivered, 13);
    }

    #[test]
    fn test_same_seed_same_solution() {
        let env = env(2);
        let a = random_solution(&env, &mut create_rng(3));
        let b = random_solution(&env, &mut create_rng(3));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_fleet() {
        let env = env(0);
        let solution = random_solution(&env, &mut create_rng(1));
        assert!(solution.routes().is_empty());
    }
}
