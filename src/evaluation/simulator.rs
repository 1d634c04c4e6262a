//! Discrete-event simulation of routes.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::{Diagnostic, Evaluation, FitnessBreakdown};
use crate::models::{Environment, Order, OrderId, RouteMap, Stop, Time, Vehicle, VehicleId};

/// Granularity travel times are rounded up to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelRounding {
    /// Whole minutes.
    #[default]
    Minute,
    /// Whole hours; every leg, however short, costs at least an hour.
    Hour,
}

/// Physical constants of the simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    /// Cruising speed in km/h.
    pub speed_kmh: f64,
    pub travel_rounding: TravelRounding,
    /// Fuel per leg is `km * (tare + 0.5 * load) / fuel_divisor` gallons.
    pub fuel_divisor: f64,
    /// Service time after the last consecutive delivery to one order.
    pub delivery_dwell_minutes: i64,
    /// Service time after the last consecutive refill at one warehouse.
    pub refill_dwell_minutes: i64,
    /// Fraction of the tank that must remain when a vehicle returns.
    pub min_final_fuel_ratio: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            speed_kmh: 50.0,
            travel_rounding: TravelRounding::Minute,
            fuel_divisor: 180.0,
            delivery_dwell_minutes: 15,
            refill_dwell_minutes: 10,
            min_final_fuel_ratio: 0.3,
        }
    }
}

impl SimulationParams {
    /// Minutes needed to drive `distance` km, rounded up to the configured
    /// granularity.
    pub fn travel_minutes(&self, distance: f64) -> i64 {
        let hours = distance / self.speed_kmh;
        match self.travel_rounding {
            TravelRounding::Minute => (hours * 60.0).ceil() as i64,
            TravelRounding::Hour => hours.ceil() as i64 * 60,
        }
    }

    /// Gallons burnt driving `distance` km with `load` units on board.
    pub fn fuel_cost(&self, distance: f64, tare: f64, load: u32) -> f64 {
        distance * (tare + 0.5 * f64::from(load)) / self.fuel_divisor
    }

    fn dwell_after(&self, stop: &Stop) -> i64 {
        match stop {
            Stop::Deliver { .. } => self.delivery_dwell_minutes,
            Stop::Refill { .. } => self.refill_dwell_minutes,
            Stop::Start { .. } | Stop::Return { .. } => 0,
        }
    }
}

/// Timing and tank state after serving one stop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Visit {
    /// Index of the stop in its route.
    pub stop_index: usize,
    pub arrival: Time,
    pub departure: Time,
    pub load_after: u32,
    pub fuel_after: f64,
}

/// What happened to one vehicle during simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteTrace {
    pub vehicle: VehicleId,
    pub departure: Time,
    pub visits: Vec<Visit>,
    pub distance: f64,
    /// The vehicle reached its return marker.
    pub completed: bool,
    /// The walk stopped at the end of the horizon.
    pub cut_off: bool,
    pub final_fuel: f64,
    pub final_load: u32,
}

/// Simulates routes against one snapshot.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use glp_routing::evaluation::RouteSimulator;
/// use glp_routing::models::*;
///
/// let now = Time::from_ymd_hm(2025, 1, 1, 8, 0).unwrap();
/// let env = Environment::new(
///     now,
///     24 * 60,
///     vec![Vehicle::new(VehicleId(1), 10, Position::new(0.0, 0.0)).with_current_load(5)],
///     vec![Order::new(OrderId(1), Position::new(10.0, 0.0), 5, now.add_minutes(240))],
///     vec![Warehouse::main(WarehouseId(0), Position::new(0.0, 0.0), 100)],
/// )
/// .unwrap();
/// let route = vec![
///     Stop::Start { vehicle: VehicleId(1), position: Position::new(0.0, 0.0) },
///     Stop::Deliver { order: OrderId(1), position: Position::new(10.0, 0.0), amount: 5 },
///     Stop::Return { vehicle: VehicleId(1), position: Position::new(0.0, 0.0) },
/// ];
/// let sim = RouteSimulator::new(&env);
/// let eval = sim.evaluate(&[(VehicleId(1), route)].into_iter().collect());
/// assert!(eval.is_feasible());
/// assert!(eval.fitness() > 0.0);
/// // 10 km at 50 km/h = 12 min, then 15 min of service.
/// assert_eq!(eval.traces()[0].visits[0].arrival, now.add_minutes(12));
/// assert_eq!(eval.traces()[0].visits[0].departure, now.add_minutes(27));
/// ```
pub struct RouteSimulator<'a> {
    env: &'a Environment,
}

/// Mutable state shared by all routes of one evaluation.
struct Ledger<'b> {
    remaining: HashMap<OrderId, u32>,
    breakdown: &'b mut FitnessBreakdown,
    diagnostics: &'b mut Vec<Diagnostic>,
}

impl<'a> RouteSimulator<'a> {
    pub fn new(env: &'a Environment) -> Self {
        Self { env }
    }

    /// Simulates every route and prices the result.
    pub fn evaluate(&self, routes: &RouteMap) -> Evaluation {
        let weights = self.env.weights();
        let mut breakdown = FitnessBreakdown::default();
        let mut diagnostics = Vec::new();
        let mut traces = Vec::with_capacity(routes.len());
        let mut ledger = Ledger {
            remaining: self.env.orders().map(|o| (o.id(), o.amount())).collect(),
            breakdown: &mut breakdown,
            diagnostics: &mut diagnostics,
        };

        for (id, stops) in routes {
            if let Some(vehicle) = self.env.vehicle(*id) {
                traces.push(self.simulate_route(vehicle, stops, &mut ledger));
            }
        }

        let horizon_end = self.env.horizon_end();
        for order in self.env.orders() {
            let remaining = ledger.remaining.get(&order.id()).copied().unwrap_or(0);
            if remaining == 0 {
                continue;
            }
            ledger.breakdown.undelivered_penalty +=
                weights.undelivered * f64::from(remaining) * order.forgiveness();
            if !order.deadline().is_after(horizon_end) {
                ledger.diagnostics.push(Diagnostic::Undelivered {
                    order: order.id(),
                    remaining,
                });
            }
        }

        breakdown.infeasibility_offset = weights.infeasibility_offset * diagnostics.len() as f64;
        Evaluation::new(breakdown, diagnostics, traces)
    }

    /// Walks one route, charging its violations to `ledger`.
    fn simulate_route(&self, vehicle: &Vehicle, stops: &[Stop], ledger: &mut Ledger<'_>) -> RouteTrace {
        let params = self.env.simulation();
        let weights = self.env.weights();
        let horizon_end = self.env.horizon_end();
        let id = vehicle.id();

        let mut clock = self.env.current_time().add_minutes(vehicle.wait_minutes());
        let mut fuel = vehicle.current_fuel();
        let mut load = vehicle.current_load();
        let mut trace = RouteTrace {
            vehicle: id,
            departure: clock,
            visits: Vec::with_capacity(stops.len().saturating_sub(1)),
            distance: 0.0,
            completed: false,
            cut_off: false,
            final_fuel: fuel,
            final_load: load,
        };

        for (i, pair) in stops.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            let index = i + 1;
            if !clock.is_before(horizon_end) {
                trace.cut_off = true;
                break;
            }

            let Some(distance) = self.env.distance(prev.position(), next.position()) else {
                ledger.diagnostics.push(match next {
                    Stop::Return { .. } => Diagnostic::ReturnNotReached { vehicle: id },
                    _ => Diagnostic::UnreachableStop {
                        vehicle: id,
                        stop_index: index,
                    },
                });
                ledger.breakdown.unreachable_penalty += weights.unreachable;
                break;
            };

            let needed = params.fuel_cost(distance, vehicle.weight(), load);
            if needed > fuel {
                ledger.diagnostics.push(Diagnostic::FuelDeficit {
                    vehicle: id,
                    stop_index: index,
                    needed,
                    available: fuel,
                });
                ledger.breakdown.fuel_penalty += weights.fuel_deficit * (needed - fuel);
                fuel = 0.0;
            } else {
                fuel -= needed;
            }
            trace.distance += distance;
            clock = clock.add_minutes(params.travel_minutes(distance));
            let arrival = clock;

            match next {
                Stop::Deliver { order, amount, .. } => {
                    if load < *amount {
                        let shortfall = amount - load;
                        ledger.diagnostics.push(Diagnostic::ProductDeficit {
                            vehicle: id,
                            order: *order,
                            shortfall,
                        });
                        ledger.breakdown.deficit_penalty +=
                            weights.product_deficit * f64::from(shortfall);
                        load = 0;
                    } else {
                        load -= amount;
                    }
                    if let Some(left) = ledger.remaining.get_mut(order) {
                        *left = left.saturating_sub(*amount);
                    }
                    if let Some(order) = self.env.order(*order) {
                        self.score_delivery(id, order, *amount, arrival, ledger);
                    }
                }
                Stop::Refill {
                    warehouse, amount, ..
                } => {
                    // A full tank takes what fits; the rest stays at the warehouse.
                    let room = vehicle.capacity().saturating_sub(load);
                    let taken = (*amount).min(room);
                    ledger.breakdown.capacity_penalty +=
                        weights.capacity_overflow * f64::from(amount - taken);
                    load += taken;
                    let refuels = self
                        .env
                        .warehouse(*warehouse)
                        .is_some_and(|w| !w.was_vehicle());
                    if refuels {
                        fuel = vehicle.max_fuel();
                    }
                }
                Stop::Return { .. } => trace.completed = true,
                Stop::Start { .. } => {}
            }

            let chain_continues = stops.get(index + 1).is_some_and(|after| next.same_target(after));
            if !chain_continues {
                clock = clock.add_minutes(params.dwell_after(next));
            }

            trace.visits.push(Visit {
                stop_index: index,
                arrival,
                departure: clock,
                load_after: load,
                fuel_after: fuel,
            });
        }

        let reserve = vehicle.max_fuel() * params.min_final_fuel_ratio;
        if trace.completed && fuel < reserve {
            ledger.diagnostics.push(Diagnostic::LowFinalFuel {
                vehicle: id,
                fuel,
                reserve,
            });
            ledger.breakdown.low_fuel_penalty += weights.low_final_fuel * (reserve - fuel);
        }

        trace.final_fuel = fuel;
        trace.final_load = load;
        trace!(
            vehicle = %id,
            distance = trace.distance,
            completed = trace.completed,
            cut_off = trace.cut_off,
            "simulated route"
        );
        trace
    }

    /// Credits an on-time delivery or charges a late one.
    fn score_delivery(
        &self,
        vehicle: VehicleId,
        order: &Order,
        amount: u32,
        arrival: Time,
        ledger: &mut Ledger<'_>,
    ) {
        let weights = self.env.weights();
        let units = f64::from(amount);
        let minutes_late = order.deadline().minutes_until(arrival);
        if minutes_late <= 0 {
            let horizon = self.env.horizon_minutes().max(1);
            let earliness = (-minutes_late).min(horizon) as f64 / horizon as f64;
            let urgency = if order.is_urgent() {
                weights.urgency_multiplier
            } else {
                1.0
            };
            ledger.breakdown.delivery_value += weights.delivery_value
                * units
                * urgency
                * (1.0 + weights.earliness_bonus * earliness)
                * order.forgiveness();
        } else {
            ledger.diagnostics.push(Diagnostic::LateDelivery {
                vehicle,
                order: order.id(),
                minutes_late,
            });
            ledger.breakdown.late_penalty +=
                weights.lateness * minutes_late as f64 * units * order.forgiveness();
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::distance::GridOracle;
    use crate::models::{Blockage, Position, Warehouse, WarehouseId};

    fn now() -> Time {
        Time::from_ymd_hm(2025, 1, 1, 8, 0).expect("valid")
    }

    fn origin() -> Position {
        Position::new(0.0, 0.0)
    }

    fn start() -> Stop {
        Stop::Start {
            vehicle: VehicleId(1),
            position: origin(),
        }
    }

    fn ret() -> Stop {
        Stop::Return {
            vehicle: VehicleId(1),
            position: origin(),
        }
    }

    fn deliver(amount: u32, x: f64) -> Stop {
        Stop::Deliver {
            order: OrderId(1),
            position: Position::new(x, 0.0),
            amount,
        }
    }

    fn refill(id: u32, amount: u32, x: f64) -> Stop {
        Stop::Refill {
            warehouse: WarehouseId(id),
            position: Position::new(x, 0.0),
            amount,
        }
    }

    fn env_with(vehicle: Vehicle, order: Order, extra: Vec<Warehouse>, horizon: i64) -> Environment {
        let mut warehouses = vec![Warehouse::main(WarehouseId(0), origin(), 1_000)];
        warehouses.extend(extra);
        Environment::new(now(), horizon, vec![vehicle], vec![order], warehouses)
            .expect("valid snapshot")
    }

    fn truck(load: u32) -> Vehicle {
        Vehicle::new(VehicleId(1), 10, origin()).with_current_load(load)
    }

    fn order(amount: u32, due_in: i64) -> Order {
        Order::new(OrderId(1), Position::new(10.0, 0.0), amount, now().add_minutes(due_in))
    }

    fn run(env: &Environment, route: Vec<Stop>) -> Evaluation {
        let routes: RouteMap = [(VehicleId(1), route)].into_iter().collect();
        RouteSimulator::new(env).evaluate(&routes)
    }

    #[test]
    fn test_travel_and_fuel_formulas() {
        let p = SimulationParams::default();
        assert_eq!(p.travel_minutes(0.0), 0);
        assert_eq!(p.travel_minutes(10.0), 12);
        assert_eq!(p.travel_minutes(10.1), 13);

        let hourly = SimulationParams {
            travel_rounding: TravelRounding::Hour,
            ..SimulationParams::default()
        };
        assert_eq!(hourly.travel_minutes(0.0), 0);
        assert_eq!(hourly.travel_minutes(10.0), 60);
        assert_eq!(hourly.travel_minutes(50.5), 120);
        // 18 km * (2 + 0.5 * 10) / 180 = 0.7
        assert!((p.fuel_cost(18.0, 2.0, 10) - 0.7).abs() < 1e-10);
    }

    #[test]
    fn test_on_time_delivery_is_feasible() {
        let env = env_with(truck(5), order(5, 240), vec![], 24 * 60);
        let eval = run(&env, vec![start(), deliver(5, 10.0), ret()]);
        assert!(eval.is_feasible(), "{:?}", eval.diagnostics());
        assert!(eval.breakdown().delivery_value > 50.0);
        let trace = &eval.traces()[0];
        assert!(trace.completed);
        assert_eq!(trace.final_load, 0);
        assert!((trace.distance - 20.0).abs() < 1e-10);
    }

    #[test]
    fn test_product_deficit_still_advances_ledger() {
        let env = env_with(truck(2), order(5, 240), vec![], 24 * 60);
        let eval = run(&env, vec![start(), deliver(5, 10.0), ret()]);
        assert!(!eval.is_feasible());
        assert!(matches!(
            eval.diagnostics()[0],
            Diagnostic::ProductDeficit { shortfall: 3, .. }
        ));
        // The order counts as served, so no undelivered diagnostic.
        assert!(!eval
            .diagnostics()
            .iter()
            .any(|d| matches!(d, Diagnostic::Undelivered { .. })));
        assert!((eval.breakdown().deficit_penalty - 300.0).abs() < 1e-10);
    }

    #[test]
    fn test_late_delivery_penalized_by_minutes_and_amount() {
        let env = env_with(truck(5), order(5, 2), vec![], 24 * 60);
        let eval = run(&env, vec![start(), deliver(5, 10.0), ret()]);
        assert!(matches!(
            eval.diagnostics()[0],
            Diagnostic::LateDelivery { minutes_late: 10, .. }
        ));
        assert!((eval.breakdown().late_penalty - 50.0).abs() < 1e-10);
        assert_eq!(eval.breakdown().delivery_value, 0.0);
    }

    #[test]
    fn test_fuel_deficit_does_not_abort_route() {
        let v = truck(5).with_current_fuel(0.01);
        let env = env_with(v, order(5, 240), vec![], 24 * 60);
        let eval = run(&env, vec![start(), deliver(5, 10.0), ret()]);
        let fuel_deficits = eval
            .diagnostics()
            .iter()
            .filter(|d| matches!(d, Diagnostic::FuelDeficit { .. }))
            .count();
        assert_eq!(fuel_deficits, 2);
        assert!(eval.traces()[0].completed);
        assert!(eval
            .diagnostics()
            .iter()
            .any(|d| matches!(d, Diagnostic::LowFinalFuel { .. })));
    }

    #[test]
    fn test_refill_restores_fuel_unless_stranded_vehicle() {
        let stranded = Warehouse::new(WarehouseId(7), Position::new(2.0, 0.0), 10).with_was_vehicle(true);
        let plant = Warehouse::new(WarehouseId(8), Position::new(2.0, 0.0), 10);
        let env = env_with(truck(0), order(5, 240), vec![stranded, plant], 24 * 60);

        let eval = run(&env, vec![start(), refill(7, 5, 2.0), deliver(5, 10.0), ret()]);
        let after_refill = eval.traces()[0].visits[0].fuel_after;
        assert!(after_refill < 25.0);

        let eval = run(&env, vec![start(), refill(8, 5, 2.0), deliver(5, 10.0), ret()]);
        assert_eq!(eval.traces()[0].visits[0].fuel_after, 25.0);
        assert!(eval.is_feasible(), "{:?}", eval.diagnostics());
    }

    #[test]
    fn test_surplus_refill_is_left_behind() {
        let env = env_with(truck(8), order(5, 240), vec![], 24 * 60);
        let eval = run(&env, vec![start(), refill(0, 5, 0.0), deliver(5, 10.0), ret()]);
        assert!(eval.is_feasible(), "{:?}", eval.diagnostics());
        assert_eq!(eval.traces()[0].visits[0].load_after, 10);
        assert_eq!(eval.traces()[0].visits[1].load_after, 5);
        assert!((eval.breakdown().capacity_penalty - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_dwell_only_after_chain_ends() {
        let env = env_with(truck(10), order(10, 240), vec![], 24 * 60);
        let eval = run(&env, vec![start(), deliver(5, 10.0), deliver(5, 10.0), ret()]);
        let visits = &eval.traces()[0].visits;
        assert_eq!(visits[0].departure, visits[0].arrival);
        assert_eq!(visits[1].arrival, visits[0].departure);
        assert_eq!(visits[1].departure, visits[1].arrival.add_minutes(15));
    }

    #[test]
    fn test_wait_minutes_delay_departure() {
        let env = env_with(truck(5).with_wait_minutes(30), order(5, 240), vec![], 24 * 60);
        let eval = run(&env, vec![start(), deliver(5, 10.0), ret()]);
        assert_eq!(eval.traces()[0].departure, now().add_minutes(30));
        assert_eq!(eval.traces()[0].visits[0].arrival, now().add_minutes(42));
    }

    #[test]
    fn test_horizon_cut_off_leaves_rest_for_later() {
        // Horizon of 20 minutes: the delivery (12 min + 15 dwell) pushes the
        // clock past the end before the return leg.
        let env = env_with(truck(5), order(5, 240), vec![], 20);
        let eval = run(&env, vec![start(), deliver(5, 10.0), ret()]);
        let trace = &eval.traces()[0];
        assert!(trace.cut_off);
        assert!(!trace.completed);
        assert_eq!(trace.visits.len(), 1);
        assert!(eval.is_feasible(), "{:?}", eval.diagnostics());
    }

    #[test]
    fn test_undelivered_only_flags_orders_due_in_horizon() {
        let env = env_with(truck(5), order(5, 240), vec![], 24 * 60);
        let eval = run(&env, vec![start(), ret()]);
        assert!(matches!(
            eval.diagnostics()[0],
            Diagnostic::Undelivered { remaining: 5, .. }
        ));

        let env = env_with(truck(5), order(5, 5_000), vec![], 60);
        let eval = run(&env, vec![start(), ret()]);
        assert!(eval.is_feasible());
        assert!(eval.breakdown().undelivered_penalty > 0.0);
    }

    /// Square wall around the cell (2, 2) on a 5 x 5 grid.
    fn walled_in(vehicle_at: Position, order: Order) -> Environment {
        let wall = Blockage::new(1, now(), now().add_minutes(24 * 60)).with_vertices(vec![
            Position::new(1.0, 1.0),
            Position::new(3.0, 1.0),
            Position::new(3.0, 3.0),
            Position::new(1.0, 3.0),
            Position::new(1.0, 1.0),
        ]);
        let vehicle = Vehicle::new(VehicleId(1), 10, vehicle_at).with_current_load(5);
        Environment::new(
            now(),
            24 * 60,
            vec![vehicle],
            vec![order],
            vec![Warehouse::main(WarehouseId(0), origin(), 100)],
        )
        .expect("valid snapshot")
        .with_oracle(Arc::new(GridOracle::new(5, 5)))
        .with_blockages(vec![wall])
    }

    #[test]
    fn test_unreachable_stop_ends_the_walk() {
        let inside = Position::new(2.0, 2.0);
        let env = walled_in(
            origin(),
            Order::new(OrderId(1), inside, 5, now().add_minutes(240)),
        );
        let target = Stop::Deliver {
            order: OrderId(1),
            position: inside,
            amount: 5,
        };
        let eval = run(&env, vec![start(), target, ret()]);
        assert!(matches!(
            eval.diagnostics()[0],
            Diagnostic::UnreachableStop { stop_index: 1, .. }
        ));
        assert!(eval
            .diagnostics()
            .iter()
            .any(|d| matches!(d, Diagnostic::Undelivered { remaining: 5, .. })));
        assert_eq!(eval.breakdown().unreachable_penalty, 1_000.0);
        let trace = &eval.traces()[0];
        assert!(trace.visits.is_empty());
        assert!(!trace.completed);
        assert_eq!(trace.final_load, 5);
    }

    #[test]
    fn test_enclosed_vehicle_cannot_return() {
        let inside = Position::new(2.0, 2.0);
        let env = walled_in(
            inside,
            Order::new(OrderId(1), Position::new(4.0, 4.0), 5, now().add_minutes(5_000)),
        );
        let route = vec![
            Stop::Start {
                vehicle: VehicleId(1),
                position: inside,
            },
            ret(),
        ];
        let eval = run(&env, route);
        assert_eq!(
            eval.diagnostics(),
            &[Diagnostic::ReturnNotReached {
                vehicle: VehicleId(1)
            }]
        );
        assert!(!eval.is_feasible());
        assert!(!eval.traces()[0].completed);
        assert!(eval.fitness() < -10_000.0);
    }

    #[test]
    fn test_infeasibility_offset_per_diagnostic() {
        let env = env_with(truck(0), order(5, 240), vec![], 24 * 60);
        let eval = run(&env, vec![start(), deliver(5, 10.0), ret()]);
        let n = eval.diagnostics().len() as f64;
        assert!((eval.breakdown().infeasibility_offset - 10_000.0 * n).abs() < 1e-6);
        assert!(eval.fitness() < 0.0);
    }
}
