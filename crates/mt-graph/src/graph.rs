//! The street graph: node and edge arenas plus a spatial index.
//!
//! # Lifecycle
//!
//! 1. **Registration**: `add_node`, `add_edge`, `add_connector`.  Ids are
//!    handed out in registration order by the graph itself.
//! 2. **Finalization**: [`StreetGraph::finalize`] assigns the per-node leg
//!    indices, builds the R-tree and freezes the topology.  Further
//!    registration fails with [`GraphError::Frozen`].
//! 3. **Simulation**: only lane occupancy and node admission state change,
//!    through [`edges_mut`](StreetGraph::edges_mut) and
//!    [`nodes_mut_with_edges`](StreetGraph::nodes_mut_with_edges).

use std::fmt;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use mt_core::{Direction, EdgeId, GeoPoint, NodeId};

use crate::edge::{DirectedEdge, EdgeSpec};
use crate::lane::{Lane, LaneRef};
use crate::node::{Connector, Node};
use crate::{GraphError, GraphResult};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f32; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared planar distance in degree space; good enough for snapping.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── StreetGraph ───────────────────────────────────────────────────────────────

pub struct StreetGraph {
    meters_per_cell: f32,
    nodes: Vec<Node>,
    edges: Vec<DirectedEdge>,
    finalized: bool,
    spatial_idx: RTree<NodeEntry>,
}

impl StreetGraph {
    pub fn new(meters_per_cell: f32) -> Self {
        Self {
            meters_per_cell,
            nodes: Vec::new(),
            edges: Vec::new(),
            finalized: false,
            spatial_idx: RTree::new(),
        }
    }

    #[inline]
    pub fn meters_per_cell(&self) -> f32 {
        self.meters_per_cell
    }

    #[inline]
    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    // ── Registration ──────────────────────────────────────────────────────

    fn ensure_open(&self) -> GraphResult<()> {
        if self.finalized {
            return Err(GraphError::Frozen);
        }
        Ok(())
    }

    pub fn add_node(&mut self, pos: GeoPoint) -> GraphResult<NodeId> {
        self.ensure_open()?;
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(id, pos));
        Ok(id)
    }

    /// Create an edge and attach it to both endpoint nodes.
    pub fn add_edge(&mut self, spec: EdgeSpec) -> GraphResult<EdgeId> {
        self.ensure_open()?;
        self.try_node(spec.origin)?;
        self.try_node(spec.destination)?;

        let id = EdgeId(self.edges.len() as u32);
        let (origin, destination) = (spec.origin, spec.destination);
        self.edges.push(DirectedEdge::new(id, spec, self.meters_per_cell));
        self.nodes[origin.index()].add_edge(id);
        self.nodes[destination.index()].add_edge(id);
        Ok(id)
    }

    /// Allow turning from `from` onto `to` through `via`.
    ///
    /// Returns `Ok(false)` if the same connector was already registered.
    pub fn add_connector(
        &mut self,
        via: NodeId,
        from: LaneRef,
        to: LaneRef,
        direction: Direction,
    ) -> GraphResult<bool> {
        self.ensure_open()?;
        self.try_node(via)?;
        let from_edge = self.try_edge(from.edge)?;
        let to_edge = self.try_edge(to.edge)?;
        if from_edge.destination() != via || to_edge.origin() != via {
            return Err(GraphError::MisplacedConnector { via, from: from.edge, to: to.edge });
        }
        if from_edge.lane(from.lane).is_none() {
            return Err(GraphError::LaneNotFound { edge: from.edge, lane: from.lane });
        }
        if to_edge.lane(to.lane).is_none() {
            return Err(GraphError::LaneNotFound { edge: to.edge, lane: to.lane });
        }
        Ok(self.nodes[via.index()].add_connector(Connector { from, to, direction }))
    }

    /// Compute every node's leg indices, build the spatial index and freeze
    /// the topology.  Calling it twice is a no-op.
    pub fn finalize(&mut self) -> GraphResult<()> {
        if self.finalized {
            return Ok(());
        }
        self.calc_edge_indices_per_node()?;
        let entries = self
            .nodes
            .iter()
            .map(|n| NodeEntry { point: [n.pos().lat, n.pos().lon], id: n.id() })
            .collect();
        self.spatial_idx = RTree::bulk_load(entries);
        self.finalized = true;
        Ok(())
    }

    fn calc_edge_indices_per_node(&mut self) -> GraphResult<()> {
        let edges = &self.edges;
        for node in &mut self.nodes {
            node.calc_edge_indices(edges)?;
        }
        Ok(())
    }

    // ── Lookup ────────────────────────────────────────────────────────────

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn connector_count(&self) -> usize {
        self.nodes.iter().map(|n| n.connectors().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// # Panics
    /// If `id` was not handed out by this graph.
    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// # Panics
    /// If `id` was not handed out by this graph.
    #[inline]
    pub fn edge(&self, id: EdgeId) -> &DirectedEdge {
        &self.edges[id.index()]
    }

    pub fn try_node(&self, id: NodeId) -> GraphResult<&Node> {
        self.nodes.get(id.index()).ok_or(GraphError::NodeNotFound(id))
    }

    pub fn try_edge(&self, id: EdgeId) -> GraphResult<&DirectedEdge> {
        self.edges.get(id.index()).ok_or(GraphError::EdgeNotFound(id))
    }

    #[inline]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[inline]
    pub fn edges(&self) -> &[DirectedEdge] {
        &self.edges
    }

    pub fn lane(&self, lane: LaneRef) -> Option<&Lane> {
        self.edges.get(lane.edge.index())?.lane(lane.lane)
    }

    /// Edges starting at `node`.
    pub fn leaving(&self, node: NodeId) -> impl Iterator<Item = &DirectedEdge> + '_ {
        self.nodes[node.index()].leaving(&self.edges)
    }

    /// Edges ending at `node`.
    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &DirectedEdge> + '_ {
        self.nodes[node.index()].incoming(&self.edges)
    }

    /// Whether a connector leads from any lane of `from` onto `to`.
    pub fn is_connected(&self, from: EdgeId, to: EdgeId) -> bool {
        let via = self.edges[from.index()].destination();
        self.nodes[via.index()]
            .connectors_from_edge(from)
            .any(|c| c.to.edge == to)
    }

    /// Total vehicles on all lanes.
    pub fn vehicle_count(&self) -> usize {
        self.edges.iter().map(DirectedEdge::vehicle_count).sum()
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest node to `pos`.  `None` before finalization or when empty.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx
            .nearest_neighbor(&[pos.lat, pos.lon])
            .map(|e| e.id)
    }

    // ── Per-tick mutation ─────────────────────────────────────────────────

    /// Mutable edges for committing lane operations.
    #[inline]
    pub fn edges_mut(&mut self) -> &mut [DirectedEdge] {
        &mut self.edges
    }

    /// Split borrow: mutable nodes for admission, with edges read-only.
    #[inline]
    pub fn nodes_mut_with_edges(&mut self) -> (&mut [Node], &[DirectedEdge]) {
        (&mut self.nodes, &self.edges)
    }

    /// Clear all occupancy and admission state.  Every edge goes back to a
    /// single empty lane; topology and ids are untouched.
    pub fn reset(&mut self) {
        for edge in &mut self.edges {
            edge.reset();
        }
        for node in &mut self.nodes {
            node.reset();
        }
    }
}

impl fmt::Display for StreetGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "StreetGraph: {} nodes, {} edges, {} connectors",
            self.node_count(),
            self.edge_count(),
            self.connector_count()
        )?;
        for edge in &self.edges {
            writeln!(f, "  {edge}")?;
        }
        Ok(())
    }
}
