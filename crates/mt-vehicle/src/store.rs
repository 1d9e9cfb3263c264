//! Vehicle storage and its validating builder.
//!
//! `VehicleId`s are indices into the store, assigned in insertion order.
//! Every phase of the step executor visits vehicles in ascending id order
//! (or partitions them into contiguous id ranges), which is what makes the
//! outcome independent of the number of worker threads.

use log::debug;

use mt_core::{EdgeId, Tick, VehicleId};
use mt_graph::StreetGraph;

use crate::vehicle::{Vehicle, VehicleStatus};
use crate::{VehicleError, VehicleResult};

// ── VehicleStore ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct VehicleStore {
    vehicles: Vec<Vehicle>,
}

impl VehicleStore {
    #[inline]
    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// # Panics
    /// If `id` is not in the store.
    #[inline]
    pub fn get(&self, id: VehicleId) -> &Vehicle {
        &self.vehicles[id.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, id: VehicleId) -> &mut Vehicle {
        &mut self.vehicles[id.index()]
    }

    #[inline]
    pub fn as_slice(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Mutable slice for partitioned per-vehicle commits.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [Vehicle] {
        &mut self.vehicles
    }

    pub fn iter(&self) -> impl Iterator<Item = &Vehicle> + '_ {
        self.vehicles.iter()
    }

    /// Edge after `vehicle`'s current one.
    #[inline]
    pub fn next_edge(&self, vehicle: VehicleId) -> Option<EdgeId> {
        self.vehicles.get(vehicle.index())?.next_edge()
    }

    pub fn count(&self, status: VehicleStatus) -> usize {
        self.vehicles.iter().filter(|v| v.status() == status).count()
    }

    /// Vehicles currently on the network.
    pub fn active_count(&self) -> usize {
        self.count(VehicleStatus::Spawned)
    }

    /// Every vehicle back to `Waiting`, routes and departures unchanged.
    pub fn reset(&mut self) {
        self.vehicles.iter_mut().for_each(Vehicle::reset);
    }

    /// All vehicles have left the network.
    pub fn all_finished(&self) -> bool {
        self.vehicles.iter().all(|v| v.status() == VehicleStatus::Finished)
    }
}

// ── VehicleStoreBuilder ───────────────────────────────────────────────────────

/// Builds a [`VehicleStore`], rejecting routes the graph cannot drive.
///
/// ```rust,ignore
/// let mut builder = VehicleStoreBuilder::new(&graph);
/// let id = builder.add(route.edges, Tick(30))?;
/// let store = builder.build();
/// ```
pub struct VehicleStoreBuilder<'g> {
    graph: &'g StreetGraph,
    vehicles: Vec<Vehicle>,
}

impl<'g> VehicleStoreBuilder<'g> {
    pub fn new(graph: &'g StreetGraph) -> Self {
        Self { graph, vehicles: Vec::new() }
    }

    /// Add a vehicle that departs at `depart` and drives `route`.
    ///
    /// The route must be non-empty, name only edges of the graph, and every
    /// consecutive pair must be joined by a connector.
    pub fn add(&mut self, route: Vec<EdgeId>, depart: Tick) -> VehicleResult<VehicleId> {
        validate_route(self.graph, &route)?;
        let id = VehicleId(self.vehicles.len() as u32);
        debug!("{id}: {} edges, departs {depart}", route.len());
        self.vehicles.push(Vehicle::new(id, route, depart));
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    pub fn build(self) -> VehicleStore {
        VehicleStore { vehicles: self.vehicles }
    }
}

/// Check that `route` is a drivable edge sequence of `graph`.
pub fn validate_route(graph: &StreetGraph, route: &[EdgeId]) -> VehicleResult<()> {
    let Some(&first) = route.first() else {
        return Err(VehicleError::EmptyRoute);
    };
    graph.try_edge(first)?;
    for pair in route.windows(2) {
        graph.try_edge(pair[1])?;
        if !graph.is_connected(pair[0], pair[1]) {
            return Err(VehicleError::DisconnectedRoute { from: pair[0], to: pair[1] });
        }
    }
    Ok(())
}
