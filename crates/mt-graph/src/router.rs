//! Routing trait and default turn-aware Dijkstra implementation.
//!
//! Routes are sequences of edges.  Because turning is only allowed along
//! connectors, the search runs over edges rather than nodes: an edge is
//! reachable from another only if the node between them carries a connector
//! for that pair.  Edge costs are [`DirectedEdge::time_cost_millis`].
//!
//! [`DirectedEdge::time_cost_millis`]: crate::DirectedEdge::time_cost_millis

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use mt_core::{EdgeId, NodeId};

use crate::graph::StreetGraph;
use crate::{GraphError, GraphResult};

// ── Route ─────────────────────────────────────────────────────────────────────

/// An ordered list of edges and the free-flow travel time along them.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    pub edges: Vec<EdgeId>,
    /// Sum of edge time costs in milliseconds.
    pub total_time_ms: u64,
}

impl Route {
    /// `true` if the source and destination are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Implementations must be `Send + Sync` so a router can be shared with
/// worker threads.
pub trait Router: Send + Sync {
    /// Route from `from` to `to`.  `from == to` yields an empty route.
    fn route(&self, graph: &StreetGraph, from: NodeId, to: NodeId) -> GraphResult<Route>;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

/// Edge-based Dijkstra over the connector graph.
pub struct DijkstraRouter;

impl Router for DijkstraRouter {
    fn route(&self, graph: &StreetGraph, from: NodeId, to: NodeId) -> GraphResult<Route> {
        graph.try_node(from)?;
        graph.try_node(to)?;
        dijkstra(graph, from, to)
    }
}

#[inline]
fn edge_cost_ms(graph: &StreetGraph, edge: EdgeId) -> u64 {
    graph.edge(edge).time_cost_millis().round() as u64
}

fn dijkstra(graph: &StreetGraph, from: NodeId, to: NodeId) -> GraphResult<Route> {
    if from == to {
        return Ok(Route { edges: vec![], total_time_ms: 0 });
    }

    let n = graph.edge_count();
    // dist[e] = best known cost (ms) up to and including edge e.
    let mut dist = vec![u64::MAX; n];
    // prev[e] = edge driven before e; INVALID for edges leaving `from`.
    let mut prev = vec![EdgeId::INVALID; n];

    // Secondary key EdgeId gives deterministic tie-breaking.
    let mut heap: BinaryHeap<Reverse<(u64, EdgeId)>> = BinaryHeap::new();
    for edge in graph.leaving(from) {
        let cost = edge_cost_ms(graph, edge.id());
        if cost < dist[edge.id().index()] {
            dist[edge.id().index()] = cost;
            heap.push(Reverse((cost, edge.id())));
        }
    }

    while let Some(Reverse((cost, edge))) = heap.pop() {
        if cost > dist[edge.index()] {
            continue;
        }
        let via = graph.edge(edge).destination();
        if via == to {
            return Ok(reconstruct(&prev, edge, cost));
        }

        for connector in graph.node(via).connectors_from_edge(edge) {
            let next = connector.to.edge;
            let new_cost = cost.saturating_add(edge_cost_ms(graph, next));
            if new_cost < dist[next.index()] {
                dist[next.index()] = new_cost;
                prev[next.index()] = edge;
                heap.push(Reverse((new_cost, next)));
            }
        }
    }

    Err(GraphError::NoRoute { from, to })
}

fn reconstruct(prev: &[EdgeId], last: EdgeId, total_time_ms: u64) -> Route {
    let mut edges = vec![last];
    let mut cur = last;
    while prev[cur.index()] != EdgeId::INVALID {
        cur = prev[cur.index()];
        edges.push(cur);
    }
    edges.reverse();
    Route { edges, total_time_ms }
}
