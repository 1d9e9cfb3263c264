//! A single vehicle: its route, lifecycle, and cellular state.

use mt_core::{EdgeId, Tick, VehicleId};
use mt_graph::CellPos;

/// Lifecycle of a vehicle.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VehicleStatus {
    /// Not yet on the network; enters once its departure tick has come and
    /// the first cell of its first edge is free.
    Waiting,
    /// On the network.
    Spawned,
    /// Left the network at the end of its route.
    Finished,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vehicle {
    id: VehicleId,
    route: Vec<EdgeId>,
    route_pos: usize,
    depart: Tick,
    status: VehicleStatus,
    position: Option<CellPos>,
    /// Cells per tick.
    velocity: u32,
    spawned_at: Option<Tick>,
    finished_at: Option<Tick>,
    /// Cells driven so far.
    distance_cells: u64,
}

impl Vehicle {
    /// A waiting vehicle.  `route` must be non-empty; the store builder
    /// checks it and its connectivity.
    pub(crate) fn new(id: VehicleId, route: Vec<EdgeId>, depart: Tick) -> Self {
        Self {
            id,
            route,
            route_pos: 0,
            depart,
            status: VehicleStatus::Waiting,
            position: None,
            velocity: 0,
            spawned_at: None,
            finished_at: None,
            distance_cells: 0,
        }
    }

    // ── Read access ───────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> VehicleId {
        self.id
    }

    #[inline]
    pub fn route(&self) -> &[EdgeId] {
        &self.route
    }

    /// Index of the current edge within the route.
    #[inline]
    pub fn route_pos(&self) -> usize {
        self.route_pos
    }

    #[inline]
    pub fn depart(&self) -> Tick {
        self.depart
    }

    #[inline]
    pub fn status(&self) -> VehicleStatus {
        self.status
    }

    #[inline]
    pub fn is_spawned(&self) -> bool {
        self.status == VehicleStatus::Spawned
    }

    #[inline]
    pub fn position(&self) -> Option<CellPos> {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> u32 {
        self.velocity
    }

    #[inline]
    pub fn spawned_at(&self) -> Option<Tick> {
        self.spawned_at
    }

    #[inline]
    pub fn finished_at(&self) -> Option<Tick> {
        self.finished_at
    }

    #[inline]
    pub fn distance_cells(&self) -> u64 {
        self.distance_cells
    }

    #[inline]
    pub fn first_edge(&self) -> EdgeId {
        self.route[0]
    }

    /// Edge the vehicle is on (or will enter first, while waiting).
    #[inline]
    pub fn current_edge(&self) -> Option<EdgeId> {
        match self.status {
            VehicleStatus::Finished => None,
            _ => self.route.get(self.route_pos).copied(),
        }
    }

    /// Edge after the current one; `None` on the last route edge.
    #[inline]
    pub fn next_edge(&self) -> Option<EdgeId> {
        match self.status {
            VehicleStatus::Finished => None,
            _ => self.route.get(self.route_pos + 1).copied(),
        }
    }

    #[inline]
    pub fn is_on_last_edge(&self) -> bool {
        self.route_pos + 1 == self.route.len()
    }

    /// Ticks spent on the network, once finished.
    pub fn travel_ticks(&self) -> Option<u64> {
        Some(self.finished_at?.since(self.spawned_at?))
    }

    // ── State transitions (driven by the step executor) ───────────────────

    /// Enter the network at `pos` with velocity 0.
    pub fn spawn(&mut self, pos: CellPos, tick: Tick) {
        debug_assert_eq!(self.status, VehicleStatus::Waiting);
        self.status = VehicleStatus::Spawned;
        self.position = Some(pos);
        self.velocity = 0;
        self.spawned_at = Some(tick);
    }

    /// Move to `pos` driving `cells` cells with the given velocity.
    /// `enters_next_edge` advances the route position.
    pub fn advance(&mut self, pos: CellPos, velocity: u32, cells: u32, enters_next_edge: bool) {
        if enters_next_edge {
            self.route_pos += 1;
        }
        debug_assert_eq!(Some(pos.edge), self.route.get(self.route_pos).copied());
        self.position = Some(pos);
        self.velocity = velocity;
        self.distance_cells += cells as u64;
    }

    /// Stay in place with velocity 0.
    pub fn halt(&mut self) {
        self.velocity = 0;
    }

    /// Back to `Waiting` at the start of the route.
    pub fn reset(&mut self) {
        *self = Self::new(self.id, std::mem::take(&mut self.route), self.depart);
    }

    /// Leave the network.
    pub fn finish(&mut self, cells: u32, tick: Tick) {
        self.status = VehicleStatus::Finished;
        self.position = None;
        self.velocity = 0;
        self.distance_cells += cells as u64;
        self.finished_at = Some(tick);
    }
}
