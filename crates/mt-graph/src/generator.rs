//! One-shot conversion of way/node records into a [`StreetGraph`].
//!
//! # Passes
//!
//! 1. **Edges**: every way becomes a forward edge (along its node order)
//!    and/or a backward edge, depending on its [`Oneway`] value.  One graph
//!    node is created per distinct endpoint record, shared by all ways that
//!    meet there.
//! 2. **Connectors**: every "from" relation of a way becomes a lane-0
//!    connector at the shared endpoint, tagged with the turn direction of
//!    (way neighbour, junction, other way neighbour).  U-turn relations
//!    connect the way's own two directions; closed ways flagged as cyclic
//!    continue into themselves.
//! 3. **Finalization**: leg indices and the spatial index are computed.
//!
//! A way that cannot be converted is reported, logged, and skipped; the rest
//! of the dataset is still generated.

use std::collections::BTreeMap;

use log::{debug, info, warn};

use mt_core::{
    Direction, DistanceFn, EdgeId, GeoPoint, NodeId, SimConfig, curve_direction, haversine_m,
};

use crate::edge::EdgeSpec;
use crate::graph::StreetGraph;
use crate::lane::LaneRef;
use crate::records::{Dataset, WayRecord};
use crate::{GraphError, GraphResult, IdMap};

/// Edges created for one way.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct WayEdges {
    /// Along the way's node order.
    pub forward: Option<EdgeId>,
    /// Against the way's node order.
    pub backward: Option<EdgeId>,
}

/// Result of a generation run.
pub struct GeneratedGraph {
    pub graph: StreetGraph,
    /// Way id → edges, for every way that produced at least one edge.
    pub way_edges: BTreeMap<i64, WayEdges>,
    /// Record node id → graph node, for every endpoint in the graph.
    pub node_ids: BTreeMap<i64, NodeId>,
    /// Ways (or their relations) that were skipped, with the reason.
    pub skipped: Vec<GraphError>,
}

/// Builds street graphs from [`Dataset`]s.
pub struct StreetGraphGenerator<'a> {
    config: &'a SimConfig,
    distance: DistanceFn,
}

impl<'a> StreetGraphGenerator<'a> {
    /// Generator measuring way lengths with the haversine formula.
    pub fn new(config: &'a SimConfig) -> Self {
        Self::with_distance(config, haversine_m)
    }

    pub fn with_distance(config: &'a SimConfig, distance: DistanceFn) -> Self {
        Self { config, distance }
    }

    pub fn generate(&self, dataset: &Dataset) -> GraphResult<GeneratedGraph> {
        info!(
            "generating street graph from {} ways and {} nodes",
            dataset.ways.len(),
            dataset.nodes.len()
        );

        let mut run = Run {
            graph: StreetGraph::new(self.config.meters_per_cell),
            nodes: IdMap::default(),
            way_edges: BTreeMap::new(),
            skipped: Vec::new(),
        };

        for way in dataset.ways.values() {
            match self.create_edges(&mut run, dataset, way) {
                Ok(edges) => {
                    run.way_edges.insert(way.id, edges);
                }
                Err(e @ GraphError::InconsistentWay { .. }) => {
                    warn!("skipping way: {e}");
                    run.skipped.push(e);
                }
                Err(e) => return Err(e),
            }
        }

        for way in dataset.ways.values() {
            if !run.way_edges.contains_key(&way.id) {
                continue;
            }
            match plan_connectors(&run, dataset, way) {
                Ok(planned) => {
                    for c in planned {
                        run.graph.add_connector(c.via, c.from, c.to, c.direction)?;
                    }
                }
                Err(e @ GraphError::InconsistentWay { .. }) => {
                    warn!("skipping connectors: {e}");
                    run.skipped.push(e);
                }
                Err(e) => return Err(e),
            }
        }

        run.graph.finalize()?;

        info!(
            "finished street graph: {} nodes, {} edges, {} connectors ({} ways skipped)",
            run.graph.node_count(),
            run.graph.edge_count(),
            run.graph.connector_count(),
            run.skipped.len()
        );

        Ok(GeneratedGraph {
            graph: run.graph,
            way_edges: run.way_edges,
            node_ids: run.nodes.into_iter().collect(),
            skipped: run.skipped,
        })
    }

    // ── Edge pass ─────────────────────────────────────────────────────────

    fn create_edges(&self, run: &mut Run, dataset: &Dataset, way: &WayRecord) -> GraphResult<WayEdges> {
        if way.nodes.len() < 2 {
            return Err(inconsistent(way, format!("{} node(s), need at least 2", way.nodes.len())));
        }
        let coords = way
            .nodes
            .iter()
            .map(|&id| {
                dataset
                    .node_pos(id)
                    .ok_or_else(|| inconsistent(way, format!("node {id} missing from dataset")))
            })
            .collect::<GraphResult<Vec<GeoPoint>>>()?;

        let n = coords.len();
        let length_m: f32 = coords.windows(2).map(|w| (self.distance)(w[0], w[1])).sum();
        let priority = self.config.street_priorities.get(way.street_type);

        let start = run.node_for(way.nodes[0], coords[0])?;
        let end = run.node_for(way.nodes[n - 1], coords[n - 1])?;

        let mut edges = WayEdges::default();

        if way.oneway.has_forward() {
            edges.forward = Some(run.graph.add_edge(EdgeSpec {
                origin: start,
                destination: end,
                length_m,
                origin_direction: (coords[1] - coords[0]).normalize(),
                destination_direction: (coords[n - 1] - coords[n - 2]).normalize(),
                max_speed_kmh: way.max_speed_kmh.forward,
                lane_count: way.lanes.forward,
                priority,
            })?);
        }

        if way.oneway.has_backward() {
            edges.backward = Some(run.graph.add_edge(EdgeSpec {
                origin: end,
                destination: start,
                length_m,
                origin_direction: (coords[n - 2] - coords[n - 1]).normalize(),
                destination_direction: (coords[0] - coords[1]).normalize(),
                max_speed_kmh: way.max_speed_kmh.backward,
                lane_count: way.lanes.backward,
                priority,
            })?);
        }

        Ok(edges)
    }
}

// ── Run state ─────────────────────────────────────────────────────────────────

struct Run {
    graph: StreetGraph,
    nodes: IdMap<i64, NodeId>,
    way_edges: BTreeMap<i64, WayEdges>,
    skipped: Vec<GraphError>,
}

impl Run {
    /// Graph node for a record node, created on first use.
    fn node_for(&mut self, record: i64, pos: GeoPoint) -> GraphResult<NodeId> {
        if let Some(&id) = self.nodes.get(&record) {
            return Ok(id);
        }
        let id = self.graph.add_node(pos)?;
        self.nodes.insert(record, id);
        Ok(id)
    }
}

// ── Connector pass ────────────────────────────────────────────────────────────

struct PlannedConnector {
    via: NodeId,
    from: LaneRef,
    to: LaneRef,
    direction: Direction,
}

/// Work out all connectors leaving `way` without touching the graph, so an
/// inconsistent relation leaves no partial set behind.
fn plan_connectors(run: &Run, dataset: &Dataset, way: &WayRecord) -> GraphResult<Vec<PlannedConnector>> {
    let Some(&from_edges) = run.way_edges.get(&way.id) else { return Ok(Vec::new()) };
    let n = way.nodes.len();
    let (first, last) = (way.nodes[0], way.nodes[n - 1]);
    let start = endpoint_node(run, way, first)?;
    let end = endpoint_node(run, way, last)?;
    let pos = |id: i64| {
        dataset
            .node_pos(id)
            .ok_or_else(|| inconsistent(way, format!("node {id} missing from dataset")))
    };

    let mut planned = Vec::new();
    let mut push = |via: NodeId, from: Option<EdgeId>, to: Option<EdgeId>, direction: Direction| {
        if let (Some(from), Some(to)) = (from, to) {
            planned.push(PlannedConnector {
                via,
                from: LaneRef::new(from, 0),
                to: LaneRef::new(to, 0),
                direction,
            });
        }
    };

    // U-turns onto the way's own opposite direction.
    for &via in &way.uturn {
        if via == first {
            push(start, from_edges.backward, from_edges.forward, Direction::Left);
        } else if via == last {
            push(end, from_edges.forward, from_edges.backward, Direction::Left);
        } else {
            debug!("way {}: u-turn via {via} is not an endpoint", way.id);
        }
    }

    // Continuations into other ways.  No `else`: a closed way may match
    // several cases at once.
    for conn in &way.from {
        let Some(other) = dataset.ways.get(&conn.to) else {
            return Err(inconsistent(way, format!("relation to unknown way {}", conn.to)));
        };
        let Some(&to_edges) = run.way_edges.get(&other.id) else {
            debug!("way {}: relation to way {} which produced no edges", way.id, other.id);
            continue;
        };
        let m = other.nodes.len();
        let q = pos(conn.via)?;

        if conn.via == first && conn.via == other.nodes[0] {
            let dir = curve_direction(pos(way.nodes[1])?, q, pos(other.nodes[1])?);
            push(start, from_edges.backward, to_edges.forward, dir);
        }
        if conn.via == first && conn.via == other.nodes[m - 1] {
            let dir = curve_direction(pos(way.nodes[1])?, q, pos(other.nodes[m - 2])?);
            push(start, from_edges.backward, to_edges.backward, dir);
        }
        if conn.via == last && conn.via == other.nodes[0] {
            let dir = curve_direction(pos(way.nodes[n - 2])?, q, pos(other.nodes[1])?);
            push(end, from_edges.forward, to_edges.forward, dir);
        }
        if conn.via == last && conn.via == other.nodes[m - 1] {
            let dir = curve_direction(pos(way.nodes[n - 2])?, q, pos(other.nodes[m - 2])?);
            push(end, from_edges.forward, to_edges.backward, dir);
        }
    }

    // A ring continues into itself.
    if start == end {
        if way.cyclic_end_to_start {
            push(start, from_edges.forward, from_edges.forward, Direction::Straight);
        }
        if way.cyclic_start_to_end {
            push(start, from_edges.backward, from_edges.backward, Direction::Straight);
        }
    }

    Ok(planned)
}

fn endpoint_node(run: &Run, way: &WayRecord, record: i64) -> GraphResult<NodeId> {
    run.nodes
        .get(&record)
        .copied()
        .ok_or_else(|| inconsistent(way, format!("endpoint {record} has no graph node")))
}

fn inconsistent(way: &WayRecord, reason: String) -> GraphError {
    GraphError::InconsistentWay { way: way.id, reason }
}
