use std::sync::Arc;
use std::time::Duration;

use glp_routing::config::PlannerConfig;
use glp_routing::constructive::random_solution;
use glp_routing::error::RoutingError;
use glp_routing::evaluation::Diagnostic;
use glp_routing::local_search::NeighborhoodGenerator;
use glp_routing::models::{
    Blockage, Environment, Order, OrderId, Position, RouteMap, Solution, Stop, Time, Vehicle,
    VehicleId, Warehouse, WarehouseId,
};
use glp_routing::rng::create_rng;
use glp_routing::search::{Deadline, SearchConfig, SearchDriver};

fn now() -> Time {
    Time::from_ymd_hm(2025, 1, 1, 0, 0).expect("valid time")
}

fn driver(outer: usize) -> SearchDriver {
    SearchDriver::new(
        SearchConfig::default().with_max_outer_iterations(outer),
        NeighborhoodGenerator::default(),
    )
}

fn deadline() -> Deadline {
    Deadline::after(Duration::from_secs(60))
}

#[test]
fn test_single_vehicle_single_order_is_feasible() {
    let env = Arc::new(
        Environment::new(
            now(),
            24 * 60,
            vec![Vehicle::new(VehicleId(1), 25, Position::new(12.0, 8.0)).with_current_load(25)],
            vec![Order::new(OrderId(1), Position::new(20.0, 8.0), 10, now().add_minutes(20 * 60))],
            vec![Warehouse::main(WarehouseId(0), Position::new(12.0, 8.0), 500)],
        )
        .expect("valid environment"),
    );

    let outcome = driver(5).run(&env, &deadline(), &mut create_rng(42));
    let solution = &outcome.solution;
    assert!(solution.is_feasible(), "{}", solution.report());
    assert!(outcome.found_feasible);

    let route = solution.route(VehicleId(1)).expect("route for the only vehicle");
    assert!(matches!(route.first(), Some(Stop::Start { .. })));
    assert!(matches!(route.last(), Some(Stop::Return { .. })));
    let delivered: u32 = route
        .iter()
        .filter(|s| s.order() == Some(OrderId(1)))
        .map(Stop::amount)
        .sum();
    assert_eq!(delivered, 10);
    let last_delivery = route.iter().rposition(|s| s.order().is_some());
    assert!(last_delivery.is_some_and(|i| i < route.len() - 1));
}

#[test]
fn test_empty_truck_is_feasible_without_greedy_seed() {
    let env = Arc::new(
        Environment::new(
            now(),
            24 * 60,
            vec![Vehicle::new(VehicleId(1), 25, Position::new(12.0, 8.0))],
            vec![Order::new(OrderId(1), Position::new(20.0, 8.0), 25, now().add_minutes(20 * 60))],
            vec![Warehouse::main(WarehouseId(0), Position::new(12.0, 8.0), 1_000)],
        )
        .expect("valid environment"),
    );
    // Far more refill product is offered than the tank can hold.
    let offered: u32 = env.stops().refills().iter().map(Stop::amount).sum();
    assert_eq!(offered, 55);

    let search = SearchConfig::default()
        .with_max_outer_iterations(20)
        .with_greedy_seed(false);
    let outcome = SearchDriver::new(search, NeighborhoodGenerator::default())
        .run(&env, &deadline(), &mut create_rng(11));
    let solution = &outcome.solution;
    assert!(solution.is_feasible(), "{}", solution.report());

    let route = solution.route(VehicleId(1)).expect("route for the only vehicle");
    let delivered: u32 = route
        .iter()
        .filter(|s| s.order() == Some(OrderId(1)))
        .map(Stop::amount)
        .sum();
    assert_eq!(delivered, 25);
    assert!(matches!(route.last(), Some(Stop::Return { .. })));
}

#[test]
fn test_demand_beyond_fleet_reports_product_deficit() {
    let env = Arc::new(
        Environment::new(
            now(),
            24 * 60,
            vec![Vehicle::new(VehicleId(1), 10, Position::new(0.0, 0.0)).with_current_load(10)],
            vec![Order::new(OrderId(1), Position::new(6.0, 0.0), 25, now().add_minutes(600))],
            vec![Warehouse::main(WarehouseId(0), Position::new(0.0, 0.0), 0)],
        )
        .expect("valid environment"),
    );
    assert!(env.stops().refills().is_empty());

    let outcome = driver(3).run(&env, &deadline(), &mut create_rng(7));
    assert!(!outcome.found_feasible);
    assert!(!outcome.solution.is_feasible());
    let deficit = outcome
        .solution
        .diagnostics()
        .iter()
        .find(|d| d.is_product_deficit())
        .expect("a product deficit diagnostic");
    assert!(deficit.to_string().contains("GLP deficit"));
}

#[test]
fn test_compress_merges_only_adjacent_chunks_of_one_vehicle() {
    let env = Arc::new(
        Environment::new(
            now(),
            24 * 60,
            vec![
                Vehicle::new(VehicleId(1), 25, Position::new(0.0, 0.0)).with_current_load(25),
                Vehicle::new(VehicleId(2), 25, Position::new(0.0, 0.0)).with_current_load(25),
            ],
            vec![Order::new(OrderId(7), Position::new(3.0, 4.0), 15, now().add_minutes(600))],
            vec![Warehouse::main(WarehouseId(0), Position::new(0.0, 0.0), 100)],
        )
        .expect("valid environment"),
    );
    let chunk = |amount| Stop::Deliver {
        order: OrderId(7),
        position: Position::new(3.0, 4.0),
        amount,
    };

    let mut split = RouteMap::new();
    split.insert(VehicleId(1), vec![chunk(5)]);
    split.insert(VehicleId(2), vec![chunk(5), chunk(5)]);
    let mut solution = Solution::from_interiors(env.clone(), split).expect("valid interiors");
    let before = solution.fitness();
    solution.compress();

    let interiors = solution.interiors();
    assert_eq!(interiors[&VehicleId(1)], vec![chunk(5)]);
    assert_eq!(interiors[&VehicleId(2)], vec![chunk(10)]);
    assert!(solution.fitness() >= before);
}

#[test]
fn test_run_is_not_worse_than_first_random_solution() {
    let env = Arc::new(
        Environment::new(
            now(),
            12 * 60,
            vec![
                Vehicle::new(VehicleId(1), 25, Position::new(0.0, 0.0)).with_current_load(5),
                Vehicle::new(VehicleId(2), 15, Position::new(8.0, 8.0)),
                Vehicle::new(VehicleId(3), 10, Position::new(4.0, 0.0)).with_available(false),
            ],
            vec![
                Order::new(OrderId(1), Position::new(10.0, 2.0), 9, now().add_minutes(240)).with_urgent(true),
                Order::new(OrderId(2), Position::new(3.0, 12.0), 6, now().add_minutes(480)),
                Order::new(OrderId(3), Position::new(14.0, 14.0), 12, now().add_minutes(1500)),
            ],
            vec![
                Warehouse::main(WarehouseId(0), Position::new(0.0, 0.0), 300),
                Warehouse::new(WarehouseId(1), Position::new(15.0, 0.0), 10),
            ],
        )
        .expect("valid environment"),
    );
    assert_eq!(env.vehicle_ids(), vec![VehicleId(1), VehicleId(2)]);

    let outcome = driver(6).run(&env, &deadline(), &mut create_rng(2024));
    assert_eq!(outcome.outer_iterations, 6);
    assert!(outcome.solution.fitness() >= outcome.initial_fitness);

    // The first random solution is reproducible from the same seed.
    let first = random_solution(&env, &mut create_rng(2024));
    assert_eq!(first.fitness(), outcome.initial_fitness);
}

#[test]
fn test_blockage_outside_horizon_is_ignored() {
    let wall = Blockage::new(1, now().add_minutes(2000), now().add_minutes(3000))
        .with_vertices(vec![Position::new(5.0, -5.0), Position::new(5.0, 5.0)]);
    let env = Environment::new(
        now(),
        600,
        vec![Vehicle::new(VehicleId(1), 25, Position::new(0.0, 0.0))],
        Vec::new(),
        vec![Warehouse::main(WarehouseId(0), Position::new(0.0, 0.0), 10)],
    )
    .expect("valid environment")
    .with_blockages(vec![wall]);
    assert!(env.blockages().is_empty());
}

#[test]
fn test_configured_environment_and_driver() {
    let config = PlannerConfig::from_json_str(
        r#"{
            "chunks": { "delivery_chunk": 10 },
            "search": { "max_outer_iterations": 2, "use_greedy_seed": true },
            "neighborhood": { "neighbors_per_operator": 3 }
        }"#,
    )
    .expect("valid config");
    let env = Arc::new(
        Environment::new(
            now(),
            24 * 60,
            vec![Vehicle::new(VehicleId(1), 25, Position::new(0.0, 0.0)).with_current_load(20)],
            vec![Order::new(OrderId(1), Position::new(5.0, 5.0), 20, now().add_minutes(900))],
            vec![Warehouse::main(WarehouseId(0), Position::new(0.0, 0.0), 100)],
        )
        .expect("valid environment")
        .with_config(&config),
    );
    assert_eq!(env.stops().deliveries().len(), 2);

    let outcome = config.driver().run(&env, &deadline(), &mut create_rng(1));
    assert_eq!(outcome.outer_iterations, 2);
    assert!(outcome.solution.is_feasible(), "{}", outcome.solution.report());
}

#[test]
fn test_missing_main_warehouse_is_an_error() {
    let err = Environment::new(
        now(),
        600,
        Vec::new(),
        Vec::new(),
        vec![Warehouse::new(WarehouseId(3), Position::new(1.0, 1.0), 10)],
    )
    .unwrap_err();
    assert!(matches!(err, RoutingError::NoMainWarehouse));
}

#[test]
fn test_report_lists_diagnostics() {
    let env = Arc::new(
        Environment::new(
            now(),
            600,
            vec![Vehicle::new(VehicleId(1), 10, Position::new(0.0, 0.0))],
            vec![Order::new(OrderId(4), Position::new(2.0, 0.0), 5, now().add_minutes(300))],
            vec![Warehouse::main(WarehouseId(0), Position::new(0.0, 0.0), 0)],
        )
        .expect("valid environment"),
    );
    let mut interiors = RouteMap::new();
    interiors.insert(VehicleId(1), env.stops().deliveries().to_vec());
    let solution = Solution::from_interiors(env, interiors).expect("valid interiors");
    assert!(matches!(
        solution.diagnostics(),
        [Diagnostic::ProductDeficit { shortfall: 5, .. }]
    ));
    let report = solution.report();
    assert!(report.contains("GLP deficit of 5"), "{report}");
}
