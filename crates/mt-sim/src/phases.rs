//! Per-entity work of each step phase.
//!
//! The executors only decide how entities are iterated (one thread, or
//! shards on a pool); everything a phase does to one vehicle, edge or node
//! lives here, so both strategies run exactly the same code.
//!
//! # Gap
//!
//! The gap of a vehicle is the number of cells it may advance this tick
//! without touching start-of-tick occupancy:
//!
//! - a vehicle ahead on the same lane bounds it to the cells in between;
//! - otherwise, on the last route edge, the lane end plus one (leaving the
//!   network counts as one more cell);
//! - otherwise, if the destination node granted the vehicle a crossing, the
//!   lane end plus the free cells at the start of the granted lane;
//! - otherwise the lane end.
//!
//! A vehicle crosses at most one node per tick.

use log::warn;

use mt_core::{Tick, VehicleId, VehicleRng};
use mt_graph::{CellPos, DirectedEdge, LaneOp, Node, StreetGraph};
use mt_vehicle::{Vehicle, VehicleStatus, VehicleStore};

use crate::executor::StepContext;

// ── Plans ─────────────────────────────────────────────────────────────────────

/// Where a vehicle ends up this tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum PlanTarget {
    Stay,
    Cell { pos: CellPos, enters_next_edge: bool },
    Exit,
}

/// Decision of one vehicle for one tick, computed from start-of-tick state.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Plan {
    pub vehicle: VehicleId,
    pub from: CellPos,
    /// New velocity, also the number of cells driven.
    pub velocity: u32,
    pub target: PlanTarget,
}

impl Plan {
    /// Cell operations needed to carry out this plan.
    pub fn lane_ops(&self) -> impl Iterator<Item = LaneOp> {
        let (vacate, occupy) = match self.target {
            PlanTarget::Stay => (None, None),
            PlanTarget::Cell { pos, .. } => {
                (Some(LaneOp::vacate(self.from)), Some(LaneOp::occupy(pos, self.vehicle)))
            }
            PlanTarget::Exit => (Some(LaneOp::vacate(self.from)), None),
        };
        vacate.into_iter().chain(occupy)
    }

    #[inline]
    pub fn moves(&self) -> bool {
        self.target != PlanTarget::Stay
    }
}

// ── Phase 1: decide ───────────────────────────────────────────────────────────

/// Compute the plan of a spawned vehicle.  Reads only start-of-tick state.
pub fn plan_vehicle(ctx: &StepContext<'_>, graph: &StreetGraph, vehicle: &Vehicle) -> Option<Plan> {
    let from = vehicle.position()?;
    let edge = graph.edge(from.edge);
    let lane = edge.lane(from.lane)?;
    let to_end = edge.number_of_cells() - 1 - from.cell;

    let mut crossing = None;
    let gap = if let Some(ahead) = lane.next_occupied_from(from.cell + 1) {
        ahead - from.cell - 1
    } else if vehicle.is_on_last_edge() {
        to_end + 1
    } else if let Some(target) = graph.node(edge.destination()).granted_lane(vehicle.id()) {
        let free = graph
            .lane(target)
            .map(|l| l.first_occupied().unwrap_or(l.cell_count()))
            .unwrap_or(0);
        crossing = Some(target);
        to_end + free
    } else {
        to_end
    };

    let mut rng = VehicleRng::for_tick(ctx.seed, vehicle.id(), ctx.tick);
    let velocity = ctx
        .model
        .next_velocity(vehicle.velocity(), edge.max_velocity(), gap, &mut rng)
        .min(gap);

    let target = if velocity == 0 {
        PlanTarget::Stay
    } else if velocity <= to_end {
        PlanTarget::Cell {
            pos: CellPos { cell: from.cell + velocity, ..from },
            enters_next_edge: false,
        }
    } else if let Some(target) = crossing {
        PlanTarget::Cell {
            pos: target.at(velocity - to_end - 1),
            enters_next_edge: true,
        }
    } else {
        PlanTarget::Exit
    };

    Some(Plan { vehicle: vehicle.id(), from, velocity, target })
}

// ── Phase 2: commit ───────────────────────────────────────────────────────────

/// The contiguous run of `sorted_ops` addressed to `edge`.
pub fn ops_for_edge<'a>(sorted_ops: &'a [LaneOp], edge: &DirectedEdge) -> &'a [LaneOp] {
    let start = sorted_ops.partition_point(|op| op.pos.edge < edge.id());
    let end = sorted_ops.partition_point(|op| op.pos.edge <= edge.id());
    &sorted_ops[start..end]
}

/// Apply a plan to its vehicle.  Exits are handled in phase 3.
pub fn commit_vehicle(vehicle: &mut Vehicle, plan: &Plan) {
    match plan.target {
        PlanTarget::Stay => vehicle.halt(),
        PlanTarget::Cell { pos, enters_next_edge } => {
            vehicle.advance(pos, plan.velocity, plan.velocity, enters_next_edge)
        }
        PlanTarget::Exit => {}
    }
}

/// Plan of `vehicle`, if it has one this tick.  `plans` is sorted by vehicle.
#[inline]
pub fn plan_of(plans: &[Plan], vehicle: VehicleId) -> Option<&Plan> {
    plans
        .binary_search_by_key(&vehicle, |p| p.vehicle)
        .ok()
        .map(|i| &plans[i])
}

// ── Phase 3: bookkeeping ──────────────────────────────────────────────────────

/// Retire a vehicle that left the network.  Returns `true` if it did.
pub fn retire_vehicle(tick: Tick, vehicle: &mut Vehicle, plan: &Plan) -> bool {
    if plan.target != PlanTarget::Exit {
        return false;
    }
    vehicle.finish(plan.velocity, tick);
    true
}

// ── Phase 4: spawn ────────────────────────────────────────────────────────────

/// Whether `vehicle` is due and its entry cell is free at start of phase.
pub fn wants_to_spawn(tick: Tick, graph: &StreetGraph, vehicle: &Vehicle) -> bool {
    vehicle.status() == VehicleStatus::Waiting
        && vehicle.depart() <= tick
        && entry_is_free(graph, vehicle)
}

fn entry_is_free(graph: &StreetGraph, vehicle: &Vehicle) -> bool {
    graph
        .edge(vehicle.first_edge())
        .lane(0)
        .is_some_and(|lane| lane.is_free(0))
}

/// Place a candidate on cell 0 of lane 0 of its first edge.  Candidates are
/// committed in ascending id order; a later one sharing the entry cell with
/// an earlier one finds it taken and keeps waiting.
pub fn spawn_vehicle(tick: Tick, graph: &mut StreetGraph, vehicle: &mut Vehicle) -> bool {
    if !entry_is_free(graph, vehicle) {
        return false;
    }
    let edge = vehicle.first_edge();
    let Some(lane) = graph.edges_mut()[edge.index()].lane_mut(0) else { return false };
    lane.occupy(0, vehicle.id());
    vehicle.spawn(CellPos { edge, lane: 0, cell: 0 }, tick);
    true
}

// ── Phase 5: node admission ───────────────────────────────────────────────────

/// Recompute a node's grants for the next tick.  Returns the number granted.
///
/// An admission error only affects this node: it grants nothing this tick.
pub fn update_node(tick: Tick, node: &mut Node, edges: &[DirectedEdge], vehicles: &VehicleStore) -> usize {
    let result = node
        .collect_requests(edges, |v| vehicles.next_edge(v))
        .and_then(|requests| node.update(requests, tick));
    match result {
        Ok(granted) => granted,
        Err(e) => {
            warn!("{tick}: admission at {} aborted: {e}", node.id());
            node.clear_grants();
            0
        }
    }
}
