//! Cell-discretized directed street segment.

use std::fmt;
use std::hash::{Hash, Hasher};

use mt_core::{EdgeId, NodeId, Vec2};

use crate::lane::{Lane, LaneOp, LaneOpKind};

/// Construction parameters of a [`DirectedEdge`].
///
/// The id is assigned by [`StreetGraph::add_edge`](crate::StreetGraph::add_edge)
/// and the cell length comes from the graph.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeSpec {
    pub origin: NodeId,
    pub destination: NodeId,
    /// Geometric length in metres.
    pub length_m: f32,
    /// Unit vector of the first segment, pointing away from `origin`.
    pub origin_direction: Vec2,
    /// Unit vector of the last segment, pointing into `destination`.
    pub destination_direction: Vec2,
    pub max_speed_kmh: f32,
    /// Clamped to at least 1.
    pub lane_count: u8,
    pub priority: u8,
}

/// A directed street segment split into lanes of equal-length cells.
///
/// Cell count and maximum velocity are fixed at construction:
///
/// ```text
/// cells        = max(1, ceil(length_m / meters_per_cell))
/// max_velocity = max(1, round(kmh / 3.6 / meters_per_cell))   [cells per tick]
/// ```
///
/// Lanes are stored in a slot vector; a `None` slot is an inactive lane.
#[derive(Clone, Debug)]
pub struct DirectedEdge {
    id: EdgeId,
    origin: NodeId,
    destination: NodeId,
    length_m: f32,
    number_of_cells: u32,
    max_velocity: u32,
    priority: u8,
    origin_direction: Vec2,
    destination_direction: Vec2,
    lanes: Vec<Option<Lane>>,
}

impl DirectedEdge {
    pub fn new(id: EdgeId, spec: EdgeSpec, meters_per_cell: f32) -> Self {
        let number_of_cells = ((spec.length_m / meters_per_cell).ceil() as u32).max(1);
        let max_velocity = ((spec.max_speed_kmh / 3.6 / meters_per_cell).round() as u32).max(1);
        let lane_count = spec.lane_count.max(1);

        Self {
            id,
            origin: spec.origin,
            destination: spec.destination,
            length_m: spec.length_m,
            number_of_cells,
            max_velocity,
            priority: spec.priority,
            origin_direction: spec.origin_direction,
            destination_direction: spec.destination_direction,
            lanes: (0..lane_count).map(|i| Some(Lane::new(i, number_of_cells))).collect(),
        }
    }

    // ── Identity and geometry ─────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> EdgeId {
        self.id
    }

    #[inline]
    pub fn origin(&self) -> NodeId {
        self.origin
    }

    #[inline]
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    #[inline]
    pub fn length_m(&self) -> f32 {
        self.length_m
    }

    #[inline]
    pub fn number_of_cells(&self) -> u32 {
        self.number_of_cells
    }

    /// Maximum velocity in cells per tick.
    #[inline]
    pub fn max_velocity(&self) -> u32 {
        self.max_velocity
    }

    #[inline]
    pub fn priority(&self) -> u8 {
        self.priority
    }

    #[inline]
    pub fn origin_direction(&self) -> Vec2 {
        self.origin_direction
    }

    #[inline]
    pub fn destination_direction(&self) -> Vec2 {
        self.destination_direction
    }

    // ── Lanes ─────────────────────────────────────────────────────────────

    /// Number of lane slots, active or not.
    #[inline]
    pub fn lane_count(&self) -> u8 {
        self.lanes.len() as u8
    }

    pub fn active_lane_count(&self) -> usize {
        self.lanes.iter().flatten().count()
    }

    /// Lane `index` (0 = rightmost), `None` if absent or inactive.
    #[inline]
    pub fn lane(&self, index: u8) -> Option<&Lane> {
        self.lanes.get(index as usize).and_then(Option::as_ref)
    }

    #[inline]
    pub fn lane_mut(&mut self, index: u8) -> Option<&mut Lane> {
        self.lanes.get_mut(index as usize).and_then(Option::as_mut)
    }

    /// Active lanes, rightmost first.
    pub fn lanes(&self) -> impl Iterator<Item = &Lane> + '_ {
        self.lanes.iter().flatten()
    }

    // ── Load ──────────────────────────────────────────────────────────────

    pub fn vehicle_count(&self) -> usize {
        self.lanes().map(Lane::vehicle_count).sum()
    }

    /// Vehicles per active lane.
    pub fn current_usage(&self) -> f32 {
        let active = self.active_lane_count();
        if active == 0 {
            return 0.0;
        }
        self.vehicle_count() as f32 / active as f32
    }

    /// Free-flow traversal time in milliseconds, the routing cost.
    #[inline]
    pub fn time_cost_millis(&self) -> f32 {
        1000.0 * self.number_of_cells as f32 / self.max_velocity as f32
    }

    // ── Mutation ──────────────────────────────────────────────────────────

    /// Drop every lane and start over with a single empty lane 0.  The
    /// lane slots are kept; slots above 0 are left empty.
    pub fn reset(&mut self) {
        let cells = self.number_of_cells;
        for (i, slot) in self.lanes.iter_mut().enumerate() {
            *slot = if i == 0 { Some(Lane::new(0, cells)) } else { None };
        }
    }

    /// Apply a batch of cell operations addressed to this edge.
    ///
    /// All vacates run before any occupy, so a vehicle may move into a cell
    /// another vehicle leaves in the same batch.
    ///
    /// # Panics
    /// If an operation addresses another edge, a missing lane, or a cell
    /// outside its lane, or if two vehicles are placed in one cell.
    pub fn apply_lane_ops(&mut self, ops: &[LaneOp]) {
        for op in ops.iter().filter(|op| op.kind == LaneOpKind::Vacate) {
            self.op_lane(op).vacate(op.pos.cell);
        }
        for op in ops {
            if let LaneOpKind::Occupy(vehicle) = op.kind {
                self.op_lane(op).occupy(op.pos.cell, vehicle);
            }
        }
    }

    fn op_lane(&mut self, op: &LaneOp) -> &mut Lane {
        assert_eq!(op.pos.edge, self.id, "lane op for {} applied to {}", op.pos.edge, self.id);
        let id = self.id;
        match self.lane_mut(op.pos.lane) {
            Some(lane) => lane,
            None => panic!("capacity exceeded: lane {} does not exist on {id}", op.pos.lane),
        }
    }
}

impl PartialEq for DirectedEdge {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.origin == other.origin
            && self.destination == other.destination
            && self.number_of_cells == other.number_of_cells
    }
}

impl Eq for DirectedEdge {}

impl Hash for DirectedEdge {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.origin.hash(state);
        self.destination.hash(state);
        self.number_of_cells.hash(state);
    }
}

impl fmt::Display for DirectedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:({} -{}-> {})",
            self.id.0, self.origin.0, self.number_of_cells, self.destination.0
        )
    }
}
