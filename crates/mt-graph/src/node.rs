//! Intersections: incident edges, turn connectors, leg indexing, and the
//! per-tick admission of vehicles across the node.
//!
//! # Admission
//!
//! Every tick each node collects at most one [`CrossingRequest`] per incoming
//! lane: the front vehicle of the lane, if it can reach the node within one
//! tick and a connector leads onto its next route edge.  [`Node::update`]
//! then grants a maximal set of pairwise non-conflicting requests, greedily
//! in this order:
//!
//! 1. higher edge priority first,
//! 2. longer waiting first (tick of the first unanswered request),
//! 3. lower origin leg index, then lower lane index,
//! 4. lower vehicle id.
//!
//! A vehicle keeps its waiting-since tick for as long as it keeps asking, so
//! denied vehicles rise in the order tick by tick.

use std::cmp::Reverse;
use std::fmt;

use log::debug;

use mt_core::{Direction, EdgeId, GeoPoint, NodeId, Tick, Vec2, VehicleId};

use crate::edge::DirectedEdge;
use crate::indices::movements_conflict;
use crate::lane::LaneRef;
use crate::{GraphError, GraphResult};

/// Two legs whose bearings differ by less than this share an edge index.
const SAME_LEG_EPSILON: f32 = 1e-4;

// ── Connector ─────────────────────────────────────────────────────────────────

/// Permission to turn from one lane onto another through this node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Connector {
    pub from: LaneRef,
    pub to: LaneRef,
    pub direction: Direction,
}

impl fmt::Display for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -{}-> {}", self.from, self.direction, self.to)
    }
}

// ── Requests and grants ───────────────────────────────────────────────────────

/// A vehicle asking to cross the node this tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct CrossingRequest {
    pub vehicle: VehicleId,
    pub from: LaneRef,
    pub to: LaneRef,
    /// Edge index of the incoming leg.
    pub origin_index: u8,
    /// Edge index of the leaving leg.
    pub destination_index: u8,
    /// Priority of the incoming edge.
    pub priority: u8,
}

/// A crossing admitted for the next tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Grant {
    pub vehicle: VehicleId,
    pub from: LaneRef,
    pub to: LaneRef,
}

// ── Node ──────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    pos: GeoPoint,
    edges: Vec<EdgeId>,
    connectors: Vec<Connector>,

    // Leg indexing, filled by `calc_edge_indices`.  Sorted by edge id.
    incoming_index: Vec<(EdgeId, u8)>,
    leaving_index: Vec<(EdgeId, u8)>,
    indices_per_node: u8,

    // Admission state.  Both sorted by vehicle id.
    waiting_since: Vec<(VehicleId, Tick)>,
    granted: Vec<Grant>,
}

impl Node {
    pub fn new(id: NodeId, pos: GeoPoint) -> Self {
        Self {
            id,
            pos,
            edges: Vec::new(),
            connectors: Vec::new(),
            incoming_index: Vec::new(),
            leaving_index: Vec::new(),
            indices_per_node: 0,
            waiting_since: Vec::new(),
            granted: Vec::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn pos(&self) -> GeoPoint {
        self.pos
    }

    // ── Topology ──────────────────────────────────────────────────────────

    /// Incident edges in registration order.
    #[inline]
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    pub(crate) fn add_edge(&mut self, edge: EdgeId) {
        if !self.edges.contains(&edge) {
            self.edges.push(edge);
        }
    }

    /// Register a connector.  Returns `false` if an identical one exists.
    pub(crate) fn add_connector(&mut self, connector: Connector) -> bool {
        if self.connectors.contains(&connector) {
            return false;
        }
        self.connectors.push(connector);
        true
    }

    #[inline]
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Connectors leaving `lane`.
    pub fn connectors_from(&self, lane: LaneRef) -> impl Iterator<Item = &Connector> + '_ {
        self.connectors.iter().filter(move |c| c.from == lane)
    }

    /// Connectors leaving any lane of `edge`.
    pub fn connectors_from_edge(&self, edge: EdgeId) -> impl Iterator<Item = &Connector> + '_ {
        self.connectors.iter().filter(move |c| c.from.edge == edge)
    }

    /// Incident edges ending at this node.
    pub fn incoming<'a>(&'a self, edges: &'a [DirectedEdge]) -> impl Iterator<Item = &'a DirectedEdge> + 'a {
        self.edges
            .iter()
            .map(|e| &edges[e.index()])
            .filter(move |e| e.destination() == self.id)
    }

    /// Incident edges starting at this node.
    pub fn leaving<'a>(&'a self, edges: &'a [DirectedEdge]) -> impl Iterator<Item = &'a DirectedEdge> + 'a {
        self.edges
            .iter()
            .map(|e| &edges[e.index()])
            .filter(move |e| e.origin() == self.id)
    }

    // ── Leg indexing ──────────────────────────────────────────────────────

    /// Number of distinct legs; the modulus of the crossing resolver.
    #[inline]
    pub fn indices_per_node(&self) -> u8 {
        self.indices_per_node
    }

    /// Edge index of `edge` arriving at this node.
    pub fn incoming_index(&self, edge: EdgeId) -> Option<u8> {
        lookup(&self.incoming_index, edge)
    }

    /// Edge index of `edge` leaving this node.
    pub fn leaving_index(&self, edge: EdgeId) -> Option<u8> {
        lookup(&self.leaving_index, edge)
    }

    /// Assign leg indices clockwise from north.
    ///
    /// A leaving edge points along its origin direction, an arriving edge
    /// along its reversed destination direction.  Legs with equal bearing
    /// (the two directions of one street) share an index.
    pub(crate) fn calc_edge_indices(&mut self, edges: &[DirectedEdge]) -> GraphResult<()> {
        let mut legs: Vec<(f32, bool, EdgeId)> = Vec::with_capacity(self.edges.len() * 2);
        for edge in self.edges.iter().map(|e| &edges[e.index()]) {
            if edge.origin() == self.id {
                legs.push((leg_bearing(edge.origin_direction()), false, edge.id()));
            }
            if edge.destination() == self.id {
                legs.push((leg_bearing(-edge.destination_direction()), true, edge.id()));
            }
        }
        legs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)).then(a.2.cmp(&b.2)));

        self.incoming_index.clear();
        self.leaving_index.clear();

        let mut index: usize = 0;
        let mut prev_bearing: Option<f32> = None;
        for &(bearing, incoming, edge) in &legs {
            if let Some(prev) = prev_bearing {
                if bearing - prev > SAME_LEG_EPSILON {
                    index += 1;
                }
            }
            prev_bearing = Some(bearing);
            if index > u8::MAX as usize - 1 {
                return Err(GraphError::TooManyLegs { node: self.id, legs: index + 1 });
            }
            let slot = if incoming { &mut self.incoming_index } else { &mut self.leaving_index };
            slot.push((edge, index as u8));
        }

        self.indices_per_node = if legs.is_empty() { 0 } else { index as u8 + 1 };
        self.incoming_index.sort_unstable();
        self.leaving_index.sort_unstable();
        Ok(())
    }

    // ── Admission ─────────────────────────────────────────────────────────

    /// Gather this tick's crossing requests.
    ///
    /// `next_edge` maps a vehicle to the edge after its current one, `None`
    /// if the vehicle leaves the network at this node.
    pub fn collect_requests<F>(&self, edges: &[DirectedEdge], next_edge: F) -> GraphResult<Vec<CrossingRequest>>
    where
        F: Fn(VehicleId) -> Option<EdgeId>,
    {
        let mut requests = Vec::new();
        for edge in self.incoming(edges) {
            for lane in edge.lanes() {
                let Some((cell, vehicle)) = lane.front() else { continue };
                let to_boundary = edge.number_of_cells() - 1 - cell;
                if to_boundary >= edge.max_velocity() {
                    continue;
                }
                let Some(target) = next_edge(vehicle) else { continue };

                let from = LaneRef::new(edge.id(), lane.index());
                let Some(connector) = self.connectors_from(from).find(|c| c.to.edge == target) else {
                    debug!("{}: no connector from {from} onto {target} for {vehicle}", self.id);
                    continue;
                };

                let origin_index = self.incoming_index(edge.id()).ok_or(GraphError::NotFinalized)?;
                let destination_index = self.leaving_index(target).ok_or(GraphError::NotFinalized)?;
                requests.push(CrossingRequest {
                    vehicle,
                    from,
                    to: connector.to,
                    origin_index,
                    destination_index,
                    priority: edge.priority(),
                });
            }
        }
        Ok(requests)
    }

    /// Resolve this tick's requests into grants.  Returns the number granted.
    ///
    /// On an [`GraphError::InvalidIndex`] the node grants nothing this tick
    /// and the error is returned; waiting times are still recorded.
    pub fn update(&mut self, mut requests: Vec<CrossingRequest>, tick: Tick) -> GraphResult<usize> {
        let waiting: Vec<(VehicleId, Tick)> = {
            let mut w: Vec<_> = requests
                .iter()
                .map(|r| (r.vehicle, self.waiting_since(r.vehicle).unwrap_or(tick)))
                .collect();
            w.sort_unstable();
            w.dedup_by_key(|(v, _)| *v);
            w
        };
        self.waiting_since = waiting;

        requests.sort_by_key(|r| {
            (
                Reverse(r.priority),
                self.waiting_since(r.vehicle).unwrap_or(tick),
                r.origin_index,
                r.from.lane,
                r.vehicle,
            )
        });

        match self.resolve(&requests) {
            Ok(mut granted) => {
                granted.sort_unstable_by_key(|g| g.vehicle);
                self.granted = granted;
                Ok(self.granted.len())
            }
            Err(e) => {
                self.granted.clear();
                Err(e)
            }
        }
    }

    fn resolve(&self, ordered: &[CrossingRequest]) -> GraphResult<Vec<Grant>> {
        let n = self.indices_per_node;
        let mut admitted: Vec<&CrossingRequest> = Vec::new();
        'requests: for req in ordered {
            for index in [req.origin_index, req.destination_index] {
                if index >= n {
                    return Err(GraphError::InvalidIndex { index, indices_per_node: n });
                }
            }
            for other in &admitted {
                let conflict = movements_conflict(
                    (req.origin_index, req.destination_index),
                    (other.origin_index, other.destination_index),
                    n,
                )?;
                if conflict {
                    continue 'requests;
                }
            }
            admitted.push(req);
        }
        Ok(admitted
            .into_iter()
            .map(|r| Grant { vehicle: r.vehicle, from: r.from, to: r.to })
            .collect())
    }

    /// Grants issued by the last [`update`](Self::update), sorted by vehicle.
    #[inline]
    pub fn granted(&self) -> &[Grant] {
        &self.granted
    }

    /// Target lane granted to `vehicle`, if it may cross this tick.
    pub fn granted_lane(&self, vehicle: VehicleId) -> Option<LaneRef> {
        self.granted
            .binary_search_by_key(&vehicle, |g| g.vehicle)
            .ok()
            .map(|i| self.granted[i].to)
    }

    /// Tick at which `vehicle` first asked to cross without being granted.
    pub fn waiting_since(&self, vehicle: VehicleId) -> Option<Tick> {
        self.waiting_since
            .binary_search_by_key(&vehicle, |(v, _)| *v)
            .ok()
            .map(|i| self.waiting_since[i].1)
    }

    /// Withdraw all grants, keeping waiting times.
    pub fn clear_grants(&mut self) {
        self.granted.clear();
    }

    /// Forget all admission state.
    pub fn reset(&mut self) {
        self.waiting_since.clear();
        self.granted.clear();
    }
}

/// Bearing of a leg, folding values just below a full turn (and `-0.0`)
/// onto north so both directions of a north-pointing street agree.
fn leg_bearing(direction: Vec2) -> f32 {
    let b = direction.bearing() + 0.0;
    if b >= std::f32::consts::TAU - SAME_LEG_EPSILON { 0.0 } else { b }
}

fn lookup(table: &[(EdgeId, u8)], edge: EdgeId) -> Option<u8> {
    table
        .binary_search_by_key(&edge, |(e, _)| *e)
        .ok()
        .map(|i| table[i].1)
}
