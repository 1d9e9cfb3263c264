//! Fluent builder for constructing a [`Sim`].

use log::{info, warn};

use mt_core::{GeoPoint, NodeId, SimClock, SimConfig, Tick};
use mt_graph::{GraphError, Router, StreetGraph};
use mt_vehicle::{DrivingModel, VehicleStore, VehicleStoreBuilder};

use crate::executor::{SequentialExecutor, StepExecutor};
use crate::{CancelToken, Sim, SimError, SimResult};

// ── Trips ─────────────────────────────────────────────────────────────────────

/// One end of a trip: a graph node, or a coordinate snapped to the nearest
/// node.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TripEnd {
    Node(NodeId),
    Point(GeoPoint),
}

/// A vehicle to be routed at build time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Trip {
    pub origin: TripEnd,
    pub destination: TripEnd,
    /// Earliest tick the vehicle may enter the network.
    pub depart: Tick,
}

impl Trip {
    pub fn between_nodes(origin: NodeId, destination: NodeId, depart: Tick) -> Self {
        Self { origin: TripEnd::Node(origin), destination: TripEnd::Node(destination), depart }
    }
}

// ── SimBuilder ────────────────────────────────────────────────────────────────

/// Fluent builder for [`Sim<M>`].
///
/// # Required inputs
///
/// - [`SimConfig`]: seed, total ticks, cell length, thread and shard counts
/// - a finalized [`StreetGraph`]: from [`mt_graph::StreetGraphGenerator`]
///   or built by hand
/// - `M: DrivingModel`: e.g. [`mt_vehicle::NagelSchreckenberg`]
/// - `R: Router`: used to turn trips into routes (e.g.
///   [`mt_graph::DijkstraRouter`])
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                              |
/// |-----------------|------------------------------------------------------|
/// | `.trips(v)`     | no trips                                             |
/// | `.vehicles(s)`  | built from the trips                                 |
/// | `.executor(e)`  | sequential if `num_threads == Some(1)`, else sharded |
///
/// `.trips` and `.vehicles` are mutually exclusive.
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, generated.graph, NagelSchreckenberg::default(), DijkstraRouter)
///     .trips(trips)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder<M: DrivingModel, R: Router> {
    config:   SimConfig,
    graph:    StreetGraph,
    model:    M,
    router:   R,
    trips:    Option<Vec<Trip>>,
    vehicles: Option<VehicleStore>,
    executor: Option<Box<dyn StepExecutor>>,
}

impl<M: DrivingModel, R: Router> SimBuilder<M, R> {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, graph: StreetGraph, model: M, router: R) -> Self {
        Self {
            config,
            graph,
            model,
            router,
            trips:    None,
            vehicles: None,
            executor: None,
        }
    }

    /// Trips to route into vehicles.  Trips without a route are skipped
    /// with a warning.
    pub fn trips(mut self, trips: Vec<Trip>) -> Self {
        self.trips = Some(trips);
        self
    }

    /// A ready vehicle store, built against the same graph.
    pub fn vehicles(mut self, vehicles: VehicleStore) -> Self {
        self.vehicles = Some(vehicles);
        self
    }

    /// Override the step strategy chosen from the configuration.
    pub fn executor(mut self, executor: Box<dyn StepExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Validate inputs, route the trips and return a ready-to-run [`Sim`].
    pub fn build(self) -> SimResult<Sim<M>> {
        self.config.validate()?;
        if !self.graph.is_finalized() {
            return Err(GraphError::NotFinalized.into());
        }

        let vehicles = match (self.trips, self.vehicles) {
            (Some(_), Some(_)) => {
                return Err(SimError::Config(
                    "give either trips or a vehicle store, not both".into(),
                ));
            }
            (None, Some(store)) => store,
            (Some(trips), None) => route_trips(&self.graph, &self.router, &trips)?,
            (None, None) => VehicleStore::default(),
        };

        let executor = match self.executor {
            Some(e) => e,
            None => default_executor(&self.config)?,
        };
        info!(
            "simulation ready: {} nodes, {} edges, {} vehicles, {} executor",
            self.graph.node_count(),
            self.graph.edge_count(),
            vehicles.len(),
            executor.name(),
        );

        Ok(Sim {
            clock:    SimClock::new(),
            config:   self.config,
            graph:    self.graph,
            vehicles,
            model:    self.model,
            executor,
            cancel:   CancelToken::new(),
            plans:    Vec::new(),
        })
    }
}

fn resolve(graph: &StreetGraph, end: TripEnd) -> Option<NodeId> {
    match end {
        TripEnd::Node(id) => graph.try_node(id).ok().map(|n| n.id()),
        TripEnd::Point(pos) => graph.snap_to_node(pos),
    }
}

/// Route every trip; unroutable or zero-length trips are logged and dropped.
fn route_trips<R: Router>(graph: &StreetGraph, router: &R, trips: &[Trip]) -> SimResult<VehicleStore> {
    let mut builder = VehicleStoreBuilder::new(graph);
    for (i, trip) in trips.iter().enumerate() {
        let (Some(from), Some(to)) = (resolve(graph, trip.origin), resolve(graph, trip.destination))
        else {
            warn!("trip {i}: endpoint not on the graph, skipped");
            continue;
        };
        let route = match router.route(graph, from, to) {
            Ok(route) if !route.is_trivial() => route,
            Ok(_) => {
                warn!("trip {i}: origin and destination coincide at {from}, skipped");
                continue;
            }
            Err(e) => {
                warn!("trip {i}: {e}, skipped");
                continue;
            }
        };
        builder.add(route.edges, trip.depart)?;
    }
    Ok(builder.build())
}

#[cfg(feature = "parallel")]
fn default_executor(config: &SimConfig) -> SimResult<Box<dyn StepExecutor>> {
    if config.num_threads == Some(1) {
        return Ok(Box::new(SequentialExecutor));
    }
    let sharded = crate::ShardedExecutor::new(config.num_threads, config.shards)?;
    Ok(Box::new(sharded))
}

#[cfg(not(feature = "parallel"))]
fn default_executor(_config: &SimConfig) -> SimResult<Box<dyn StepExecutor>> {
    Ok(Box::new(SequentialExecutor))
}
