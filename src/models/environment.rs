//! Per-horizon planning snapshot and the stop universe derived from it.

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use tracing::info;

use super::{
    Blockage, Order, OrderId, Position, Stop, Time, Vehicle, VehicleId, Warehouse, WarehouseId,
};
use crate::config::PlannerConfig;
use crate::distance::{DistanceCache, DistanceOracle, ManhattanOracle};
use crate::error::{RoutingError, RoutingResult};
use crate::evaluation::{FitnessWeights, SimulationParams};

/// How order and warehouse amounts are cut into stops.
///
/// With `adaptive` set, orders due after the horizon closes are cut into
/// chunks `relaxed_factor` times larger, which shrinks the search space
/// for work that is not pressing yet. Chunks always sum to the full amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkPolicy {
    pub delivery_chunk: u32,
    pub refill_chunk: u32,
    pub adaptive: bool,
    pub relaxed_factor: u32,
}

impl Default for ChunkPolicy {
    fn default() -> Self {
        Self {
            delivery_chunk: 5,
            refill_chunk: 5,
            adaptive: false,
            relaxed_factor: 2,
        }
    }
}

impl ChunkPolicy {
    /// Chunk ceiling for one order, given the end of the horizon.
    pub fn delivery_chunk_for(&self, order: &Order, horizon_end: Time) -> u32 {
        let base = self.delivery_chunk.max(1);
        if self.adaptive && order.deadline().is_after(horizon_end) {
            base.saturating_mul(self.relaxed_factor.max(1))
        } else {
            base
        }
    }
}

/// Splits `total` into pieces of at most `chunk`, largest first.
///
/// ```
/// use glp_routing::models::split_amount;
///
/// assert_eq!(split_amount(12, 5), vec![5, 5, 2]);
/// assert!(split_amount(0, 5).is_empty());
/// ```
pub fn split_amount(total: u32, chunk: u32) -> Vec<u32> {
    let chunk = chunk.max(1);
    let mut pieces = vec![chunk; (total / chunk) as usize];
    if total % chunk > 0 {
        pieces.push(total % chunk);
    }
    pieces
}

/// Every stop a solution for one snapshot may contain.
#[derive(Debug, Clone)]
pub struct StopUniverse {
    markers: BTreeMap<VehicleId, (Stop, Stop)>,
    deliveries: Vec<Stop>,
    refills: Vec<Stop>,
}

impl StopUniverse {
    fn build(env: &Environment) -> Self {
        let main = env.main_warehouse();
        let markers = env
            .vehicles
            .values()
            .map(|v| {
                let start = Stop::Start {
                    vehicle: v.id(),
                    position: v.position(),
                };
                let ret = Stop::Return {
                    vehicle: v.id(),
                    position: main.position(),
                };
                (v.id(), (start, ret))
            })
            .collect();

        let horizon_end = env.horizon_end();
        let mut deliveries = Vec::new();
        for order in env.orders.values() {
            let chunk = env.chunks.delivery_chunk_for(order, horizon_end);
            deliveries.extend(split_amount(order.amount(), chunk).into_iter().map(|amount| {
                Stop::Deliver {
                    order: order.id(),
                    position: order.position(),
                    amount,
                }
            }));
        }

        let refills = Self::apportion_refills(env);

        info!(
            vehicles = env.vehicles.len(),
            deliveries = deliveries.len(),
            refills = refills.len(),
            "built stop universe"
        );

        Self {
            markers,
            deliveries,
            refills,
        }
    }

    /// Offers about twice the fleet's unmet demand, plus one refill chunk per
    /// vehicle so every truck has a chance to refuel. Secondary warehouses
    /// (including stranded vehicles) are drained before the main plant.
    fn apportion_refills(env: &Environment) -> Vec<Stop> {
        let demand: u64 = env.orders.values().map(|o| u64::from(o.amount())).sum();
        let on_board: u64 = env.vehicles.values().map(|v| u64::from(v.current_load())).sum();
        let chunk = env.chunks.refill_chunk.max(1);
        let mut wanted =
            2 * demand.saturating_sub(on_board) + u64::from(chunk) * env.vehicles.len() as u64;

        let mut sources: Vec<&Warehouse> = env.warehouses.values().collect();
        sources.sort_by_key(|w| (w.is_main(), w.id()));

        let mut refills = Vec::new();
        for warehouse in sources {
            if wanted == 0 {
                break;
            }
            let take = wanted.min(u64::from(warehouse.stock()));
            wanted -= take;
            refills.extend(split_amount(take as u32, chunk).into_iter().map(|amount| {
                Stop::Refill {
                    warehouse: warehouse.id(),
                    position: warehouse.position(),
                    amount,
                }
            }));
        }
        refills
    }

    /// Start and return markers of a vehicle.
    pub fn markers(&self, vehicle: VehicleId) -> Option<(&Stop, &Stop)> {
        self.markers.get(&vehicle).map(|(s, r)| (s, r))
    }

    pub fn deliveries(&self) -> &[Stop] {
        &self.deliveries
    }

    pub fn refills(&self) -> &[Stop] {
        &self.refills
    }

    /// Deliveries followed by refills.
    pub fn service_stops(&self) -> impl Iterator<Item = &Stop> {
        self.deliveries.iter().chain(self.refills.iter())
    }

    /// Total number of stops, markers included.
    pub fn len(&self) -> usize {
        self.markers.len() * 2 + self.deliveries.len() + self.refills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Immutable snapshot of one planning horizon.
///
/// The stop universe and the distance memo are filled lazily on first use
/// and are safe to share across threads behind an `Arc`. Builder methods
/// that change anything those depend on reset them.
///
/// # Examples
///
/// ```
/// use glp_routing::models::*;
///
/// let now = Time::from_ymd_hm(2025, 1, 1, 0, 0).unwrap();
/// let env = Environment::new(
///     now,
///     24 * 60,
///     vec![Vehicle::new(VehicleId(1), 25, Position::new(12.0, 8.0))],
///     vec![Order::new(OrderId(1), Position::new(20.0, 8.0), 12, now.add_minutes(600))],
///     vec![Warehouse::main(WarehouseId(0), Position::new(12.0, 8.0), 500)],
/// )
/// .unwrap();
/// assert_eq!(env.stops().deliveries().len(), 3); // 5 + 5 + 2
/// assert_eq!(env.distance(Position::new(12.0, 8.0), Position::new(20.0, 8.0)), Some(8.0));
/// ```
#[derive(Debug)]
pub struct Environment {
    current_time: Time,
    horizon_minutes: i64,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    orders: BTreeMap<OrderId, Order>,
    warehouses: BTreeMap<WarehouseId, Warehouse>,
    main_warehouse: Warehouse,
    blockages: Vec<Blockage>,
    oracle: Arc<dyn DistanceOracle>,
    simulation: SimulationParams,
    weights: FitnessWeights,
    chunks: ChunkPolicy,
    stops: OnceLock<StopUniverse>,
    distances: DistanceCache,
}

impl Environment {
    /// Creates a snapshot starting at `current_time` and lasting
    /// `horizon_minutes`.
    ///
    /// Unavailable vehicles and fully delivered orders are left out. Fails
    /// when no warehouse is flagged main or the horizon is not positive.
    pub fn new(
        current_time: Time,
        horizon_minutes: i64,
        vehicles: Vec<Vehicle>,
        orders: Vec<Order>,
        warehouses: Vec<Warehouse>,
    ) -> RoutingResult<Self> {
        if horizon_minutes <= 0 {
            return Err(RoutingError::InvalidConfig(format!(
                "horizon must be positive, got {horizon_minutes} minutes"
            )));
        }
        let warehouses: BTreeMap<WarehouseId, Warehouse> =
            warehouses.into_iter().map(|w| (w.id(), w)).collect();
        let main_warehouse = warehouses
            .values()
            .find(|w| w.is_main())
            .cloned()
            .ok_or(RoutingError::NoMainWarehouse)?;

        Ok(Self {
            current_time,
            horizon_minutes,
            vehicles: vehicles
                .into_iter()
                .filter(Vehicle::is_available)
                .map(|v| (v.id(), v))
                .collect(),
            orders: orders
                .into_iter()
                .filter(|o| o.amount() > 0)
                .map(|o| (o.id(), o))
                .collect(),
            warehouses,
            main_warehouse,
            blockages: Vec::new(),
            oracle: Arc::new(ManhattanOracle),
            simulation: SimulationParams::default(),
            weights: FitnessWeights::default(),
            chunks: ChunkPolicy::default(),
            stops: OnceLock::new(),
            distances: DistanceCache::new(),
        })
    }

    /// Keeps the blockages that overlap this horizon.
    pub fn with_blockages(mut self, blockages: Vec<Blockage>) -> Self {
        let (from, to) = (self.current_time, self.horizon_end());
        self.blockages = blockages
            .into_iter()
            .filter(|b| b.is_active_during(from, to))
            .collect();
        self.distances = DistanceCache::new();
        self
    }

    pub fn with_oracle(mut self, oracle: Arc<dyn DistanceOracle>) -> Self {
        self.oracle = oracle;
        self.distances = DistanceCache::new();
        self
    }

    pub fn with_simulation(mut self, params: SimulationParams) -> Self {
        self.simulation = params;
        self
    }

    pub fn with_weights(mut self, weights: FitnessWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_chunk_policy(mut self, chunks: ChunkPolicy) -> Self {
        self.chunks = chunks;
        self.stops = OnceLock::new();
        self
    }

    /// Applies the simulation, fitness and chunking sections of a config.
    pub fn with_config(self, config: &PlannerConfig) -> Self {
        self.with_simulation(config.simulation.clone())
            .with_weights(config.fitness.clone())
            .with_chunk_policy(config.chunks.clone())
    }

    pub fn current_time(&self) -> Time {
        self.current_time
    }

    pub fn horizon_minutes(&self) -> i64 {
        self.horizon_minutes
    }

    /// First minute after the horizon.
    pub fn horizon_end(&self) -> Time {
        self.current_time.add_minutes(self.horizon_minutes)
    }

    pub fn vehicles(&self) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.values()
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn vehicle_ids(&self) -> Vec<VehicleId> {
        self.vehicles.keys().copied().collect()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn order(&self, id: OrderId) -> Option<&Order> {
        self.orders.get(&id)
    }

    pub fn warehouses(&self) -> impl Iterator<Item = &Warehouse> {
        self.warehouses.values()
    }

    pub fn warehouse(&self, id: WarehouseId) -> Option<&Warehouse> {
        self.warehouses.get(&id)
    }

    pub fn main_warehouse(&self) -> &Warehouse {
        &self.main_warehouse
    }

    /// Blockages overlapping this horizon.
    pub fn blockages(&self) -> &[Blockage] {
        &self.blockages
    }

    pub fn simulation(&self) -> &SimulationParams {
        &self.simulation
    }

    pub fn weights(&self) -> &FitnessWeights {
        &self.weights
    }

    pub fn chunk_policy(&self) -> &ChunkPolicy {
        &self.chunks
    }

    /// The stop universe, built on first access.
    pub fn stops(&self) -> &StopUniverse {
        self.stops.get_or_init(|| StopUniverse::build(self))
    }

    /// Open-street distance, memoized for the lifetime of the snapshot.
    ///
    /// `None` means the oracle found no open path.
    pub fn distance(&self, from: Position, to: Position) -> Option<f64> {
        if from == to {
            return Some(0.0);
        }
        self.distances.get_or_insert_with(from, to, || {
            self.oracle.distance(from, to, &self.blockages)
        })
    }

    /// Number of position pairs already asked of the oracle.
    pub fn cached_distances(&self) -> usize {
        self.distances.len()
    }
}
