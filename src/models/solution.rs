//! Candidate solutions and their memoized evaluation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use super::{Environment, Stop, VehicleId};
use crate::error::{RoutingError, RoutingResult};
use crate::evaluation::{Diagnostic, Evaluation, RouteSimulator};

/// One ordered stop sequence per vehicle.
pub type RouteMap = BTreeMap<VehicleId, Vec<Stop>>;

/// A complete plan for one snapshot.
///
/// Fitness, feasibility and diagnostics come from a single simulation that
/// runs on first access and is cached. Every mutation drops the cache, and
/// `clone()` never carries it over.
pub struct Solution {
    env: Arc<Environment>,
    routes: RouteMap,
    evaluation: OnceLock<Evaluation>,
}

impl Solution {
    /// Builds a solution from full routes, markers included.
    ///
    /// Every vehicle of the snapshot needs exactly one route, shaped
    /// `Start, service stops..., Return`, whose markers belong to it and whose
    /// stops reference known orders and warehouses.
    pub fn from_routes(env: Arc<Environment>, routes: RouteMap) -> RoutingResult<Self> {
        for (id, stops) in &routes {
            if env.vehicle(*id).is_none() {
                return Err(RoutingError::UnknownVehicle(*id));
            }
            validate_route(&env, *id, stops)?;
        }
        if let Some(missing) = env.vehicle_ids().into_iter().find(|id| !routes.contains_key(id)) {
            return Err(RoutingError::MissingRoute(missing));
        }
        Ok(Self::new_unchecked(env, routes))
    }

    /// Wraps marker-free routes with each vehicle's Start and Return.
    ///
    /// Vehicles absent from `interiors` get an empty route. Fails on a
    /// vehicle outside the snapshot, a marker among the service stops, or a
    /// stop referencing an unknown order or warehouse.
    pub fn from_interiors(env: Arc<Environment>, interiors: RouteMap) -> RoutingResult<Self> {
        if let Some(unknown) = interiors.keys().find(|id| env.vehicle(**id).is_none()) {
            return Err(RoutingError::UnknownVehicle(*unknown));
        }
        let solution = Self::with_interiors(env, interiors);
        for (id, stops) in &solution.routes {
            validate_route(&solution.env, *id, stops)?;
        }
        Ok(solution)
    }

    /// Unchecked [`from_interiors`](Self::from_interiors) for routes built
    /// from the snapshot's own stop universe.
    pub(crate) fn with_interiors(env: Arc<Environment>, mut interiors: RouteMap) -> Self {
        let mut routes = RouteMap::new();
        for id in env.vehicle_ids() {
            let Some((start, ret)) = env.stops().markers(id) else {
                continue;
            };
            let body = interiors.remove(&id).unwrap_or_default();
            let mut route = Vec::with_capacity(body.len() + 2);
            route.push(start.clone());
            route.extend(body);
            route.push(ret.clone());
            routes.insert(id, route);
        }
        Self::new_unchecked(env, routes)
    }

    fn new_unchecked(env: Arc<Environment>, routes: RouteMap) -> Self {
        Self {
            env,
            routes,
            evaluation: OnceLock::new(),
        }
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.env
    }

    /// Full routes, markers included.
    pub fn routes(&self) -> &RouteMap {
        &self.routes
    }

    pub fn route(&self, vehicle: VehicleId) -> Option<&[Stop]> {
        self.routes.get(&vehicle).map(Vec::as_slice)
    }

    /// Copies of the routes without their Start and Return markers.
    pub fn interiors(&self) -> RouteMap {
        self.routes
            .iter()
            .map(|(id, stops)| {
                let body = stops.iter().filter(|s| !s.is_marker()).cloned().collect();
                (*id, body)
            })
            .collect()
    }

    /// Number of service stops across all routes.
    pub fn service_stop_count(&self) -> usize {
        self.routes
            .values()
            .map(|r| r.iter().filter(|s| !s.is_marker()).count())
            .sum()
    }

    /// The simulation result, computed on first access.
    pub fn evaluation(&self) -> &Evaluation {
        self.evaluation
            .get_or_init(|| RouteSimulator::new(&self.env).evaluate(&self.routes))
    }

    /// Returns `true` once the simulation has run for the current routes.
    pub fn is_evaluated(&self) -> bool {
        self.evaluation.get().is_some()
    }

    pub fn fitness(&self) -> f64 {
        self.evaluation().fitness()
    }

    pub fn is_feasible(&self) -> bool {
        self.evaluation().is_feasible()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        self.evaluation().diagnostics()
    }

    /// Ranks feasible solutions above infeasible ones, then by fitness.
    pub fn is_better_than(&self, other: &Solution) -> bool {
        match (self.is_feasible(), other.is_feasible()) {
            (true, false) => true,
            (false, true) => false,
            _ => self.fitness() > other.fitness(),
        }
    }

    /// Merges back-to-back stops that serve the same order or warehouse.
    ///
    /// Totals per order and warehouse are preserved, markers are untouched,
    /// and running it twice changes nothing.
    pub fn compress(&mut self) {
        for stops in self.routes.values_mut() {
            let mut merged: Vec<Stop> = Vec::with_capacity(stops.len());
            for stop in stops.drain(..) {
                if let Some(last) = merged.last_mut() {
                    if last.merge(&stop) {
                        continue;
                    }
                }
                merged.push(stop);
            }
            *stops = merged;
        }
        self.evaluation = OnceLock::new();
    }

    /// Human-readable summary: fitness, breakdown, diagnostics and routes.
    pub fn report(&self) -> String {
        self.to_string()
    }
}

fn validate_route(env: &Environment, id: VehicleId, stops: &[Stop]) -> RoutingResult<()> {
    let malformed = |reason: &str| RoutingError::MalformedRoute {
        vehicle: id,
        reason: reason.to_string(),
    };
    match stops.first() {
        Some(Stop::Start { vehicle, .. }) if *vehicle == id => {}
        _ => return Err(malformed("route must begin with its own start marker")),
    }
    match stops.last() {
        Some(Stop::Return { vehicle, .. }) if *vehicle == id && stops.len() >= 2 => {}
        _ => return Err(malformed("route must end with its own return marker")),
    }
    for stop in &stops[1..stops.len() - 1] {
        match stop {
            Stop::Start { .. } | Stop::Return { .. } => {
                return Err(malformed("markers may only appear at the route ends"));
            }
            Stop::Deliver { order, .. } => {
                if env.order(*order).is_none() {
                    return Err(RoutingError::UnknownOrder(*order));
                }
            }
            Stop::Refill { warehouse, .. } => {
                if env.warehouse(*warehouse).is_none() {
                    return Err(RoutingError::UnknownWarehouse(*warehouse));
                }
            }
        }
    }
    Ok(())
}

impl Clone for Solution {
    fn clone(&self) -> Self {
        Self::new_unchecked(Arc::clone(&self.env), self.routes.clone())
    }
}

impl PartialEq for Solution {
    /// Structural equality of the routes; the snapshot must be the same
    /// instance.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.env, &other.env) && self.routes == other.routes
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Solution")
            .field("routes", &self.routes)
            .field("evaluated", &self.is_evaluated())
            .finish()
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let eval = self.evaluation();
        writeln!(f, "feasible: {}", eval.is_feasible())?;
        writeln!(f, "fitness:  {:.2}", eval.fitness())?;
        write!(f, "{}", eval.breakdown())?;
        writeln!(f, "diagnostics: {}", eval.diagnostics().len())?;
        for d in eval.diagnostics() {
            writeln!(f, "  - {d}")?;
        }
        for (id, stops) in &self.routes {
            writeln!(f, "vehicle {id}: {} stops", stops.len())?;
            for stop in stops {
                writeln!(f, "    {stop}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Order, OrderId, Position, Time, Vehicle, Warehouse, WarehouseId};

    fn env() -> Arc<Environment> {
        let now = Time::from_ymd_hm(2025, 1, 1, 0, 0).expect("valid");
        Arc::new(
            Environment::new(
                now,
                24 * 60,
                vec![
                    Vehicle::new(VehicleId(1), 25, Position::new(0.0, 0.0)).with_current_load(10),
                    Vehicle::new(VehicleId(2), 25, Position::new(4.0, 0.0)),
                ],
                vec![Order::new(OrderId(1), Position::new(5.0, 5.0), 10, now.add_minutes(600))],
                vec![Warehouse::main(WarehouseId(0), Position::new(0.0, 0.0), 500)],
            )
            .expect("valid snapshot"),
        )
    }

    fn deliver(amount: u32) -> Stop {
        Stop::Deliver {
            order: OrderId(1),
            position: Position::new(5.0, 5.0),
            amount,
        }
    }

    fn refill(amount: u32) -> Stop {
        Stop::Refill {
            warehouse: WarehouseId(0),
            position: Position::new(0.0, 0.0),
            amount,
        }
    }

    fn two_chunks_on_first() -> Solution {
        let mut interiors = RouteMap::new();
        interiors.insert(VehicleId(1), vec![deliver(5), deliver(5)]);
        Solution::from_interiors(env(), interiors).expect("valid interiors")
    }

    #[test]
    fn test_from_interiors_adds_markers() {
        let mut sol = two_chunks_on_first();
        for (id, stops) in sol.routes() {
            assert!(matches!(stops.first(), Some(Stop::Start { vehicle, .. }) if vehicle == id));
            assert!(matches!(stops.last(), Some(Stop::Return { vehicle, .. }) if vehicle == id));
        }
        assert_eq!(sol.route(VehicleId(2)).map(<[Stop]>::len), Some(2));
        assert_eq!(sol.service_stop_count(), 2);
    }

    #[test]
    fn test_from_routes_validation() {
        let env = env();
        let good = two_chunks_on_first().routes().clone();
        assert!(Solution::from_routes(Arc::clone(&env), good.clone()).is_ok());

        let mut missing = good.clone();
        missing.remove(&VehicleId(2));
        assert!(matches!(
            Solution::from_routes(Arc::clone(&env), missing),
            Err(RoutingError::MissingRoute(VehicleId(2)))
        ));

        let mut unknown = good.clone();
        unknown.insert(VehicleId(9), vec![]);
        assert!(matches!(
            Solution::from_routes(Arc::clone(&env), unknown),
            Err(RoutingError::UnknownVehicle(VehicleId(9)))
        ));

        let mut swapped = good.clone();
        let first = swapped.get(&VehicleId(1)).cloned().unwrap_or_default();
        swapped.insert(VehicleId(2), first);
        assert!(matches!(
            Solution::from_routes(Arc::clone(&env), swapped),
            Err(RoutingError::MalformedRoute { .. })
        ));

        let mut bad_order = good;
        if let Some(route) = bad_order.get_mut(&VehicleId(1)) {
            route.insert(
                1,
                Stop::Deliver {
                    order: OrderId(77),
                    position: Position::new(1.0, 1.0),
                    amount: 1,
                },
            );
        }
        assert!(matches!(
            Solution::from_routes(env, bad_order),
            Err(RoutingError::UnknownOrder(OrderId(77)))
        ));
    }

    #[test]
    fn test_evaluation_is_memoized() {
        let sol = two_chunks_on_first();
        assert!(!sol.is_evaluated());
        let first = sol.fitness();
        assert!(sol.is_evaluated());
        assert!(std::ptr::eq(sol.evaluation(), sol.evaluation()));
        assert_eq!(first, sol.fitness());
        assert_eq!(sol.is_feasible(), sol.is_feasible());
    }

    #[test]
    fn test_clone_resets_memo() {
        let sol = two_chunks_on_first();
        let _ = sol.fitness();
        let copy = sol.clone();
        assert!(!copy.is_evaluated());
        assert_eq!(copy, sol);
        assert_eq!(copy.fitness(), sol.fitness());
        assert!(!std::ptr::eq(copy.evaluation(), sol.evaluation()));
    }

    #[test]
    fn test_compress_merges_adjacent_same_order() {
        let mut sol = two_chunks_on_first();
        let _ = sol.fitness();
        sol.compress();
        assert!(!sol.is_evaluated());
        let route = sol.route(VehicleId(1)).unwrap_or_default();
        assert_eq!(route.len(), 3);
        assert_eq!(route[1].amount(), 10);

        let once = sol.routes().clone();
        sol.compress();
        assert_eq!(sol.routes(), &once);
    }

    #[test]
    fn test_compress_keeps_separated_chunks() {
        let mut interiors = RouteMap::new();
        interiors.insert(VehicleId(1), vec![deliver(5), refill(5), deliver(5)]);
        interiors.insert(VehicleId(2), vec![refill(5), refill(5)]);
        let mut sol = Solution::from_interiors(env(), interiors).expect("valid interiors");
        sol.compress();
        assert_eq!(sol.route(VehicleId(1)).map(<[Stop]>::len), Some(5));
        let second = sol.route(VehicleId(2)).unwrap_or_default();
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].amount(), 10);
    }

    #[test]
    fn test_better_prefers_feasibility() {
        let feasible = two_chunks_on_first();
        assert!(feasible.is_feasible(), "{}", feasible.report());
        let mut interiors = RouteMap::new();
        interiors.insert(VehicleId(2), vec![deliver(5), deliver(5)]);
        let infeasible = Solution::from_interiors(env(), interiors).expect("valid interiors");
        assert!(!infeasible.is_feasible());
        assert!(feasible.is_better_than(&infeasible));
        assert!(!infeasible.is_better_than(&feasible));
    }

    #[test]
    fn test_report_lists_diagnostics() {
        let mut interiors = RouteMap::new();
        interiors.insert(VehicleId(2), vec![deliver(5), deliver(5)]);
        let sol = Solution::from_interiors(env(), interiors).expect("valid interiors");
        let text = sol.report();
        assert!(text.contains("feasible: false"));
        assert!(text.contains("GLP deficit"));
        assert!(text.contains("vehicle 2"));
    }

    #[test]
    fn test_from_interiors_rejects_foreign_routes() {
        let mut interiors = RouteMap::new();
        interiors.insert(VehicleId(9), vec![deliver(5)]);
        let err = Solution::from_interiors(env(), interiors).unwrap_err();
        assert!(matches!(err, RoutingError::UnknownVehicle(VehicleId(9))));

        let mut interiors = RouteMap::new();
        interiors.insert(
            VehicleId(1),
            vec![Stop::Deliver {
                order: OrderId(42),
                position: Position::new(1.0, 1.0),
                amount: 5,
            }],
        );
        let err = Solution::from_interiors(env(), interiors).unwrap_err();
        assert!(matches!(err, RoutingError::UnknownOrder(OrderId(42))));

        let mut interiors = RouteMap::new();
        interiors.insert(
            VehicleId(1),
            vec![Stop::Return {
                vehicle: VehicleId(1),
                position: Position::new(0.0, 0.0),
            }],
        );
        let err = Solution::from_interiors(env(), interiors).unwrap_err();
        assert!(matches!(err, RoutingError::MalformedRoute { .. }));
    }
}
