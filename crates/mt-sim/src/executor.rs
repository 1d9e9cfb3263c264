//! The step-execution protocol and its sequential strategy.
//!
//! # Phases
//!
//! ```text
//! ① will_move_all   every spawned vehicle computes a Plan from
//!                   start-of-tick state (accelerate, dash, brake, dawdle).
//!                   Cancellation is polled between vehicles.
//! ② move_all        plans become lane operations, committed per edge
//!                   (vacates before occupies); vehicles take their new cell.
//! ③ did_move_all    vehicles that drove off their last edge are retired.
//! ④ spawn_all       due vehicles enter cell 0 of their first edge, in
//!                   ascending id order.
//! ⑤ update_nodes    each node collects crossing requests and grants a
//!                   non-conflicting set for the next tick.
//! ```
//!
//! Phases are barriers: nothing of phase *n + 1* starts before phase *n* is
//! complete.  Within a phase, work on one vehicle, edge or node never reads
//! what another entity of the same phase writes, so any partition of the
//! work yields the same result.

use mt_core::Tick;
use mt_graph::{LaneOp, StreetGraph};
use mt_vehicle::{DrivingModel, VehicleStore};

use crate::cancel::CancelToken;
use crate::phases::{self, Plan};
use crate::{SimError, SimResult};

// ── Context and summary ───────────────────────────────────────────────────────

/// Read-only inputs of one tick.
pub struct StepContext<'a> {
    pub tick: Tick,
    pub seed: u64,
    pub model: &'a dyn DrivingModel,
    pub cancel: &'a CancelToken,
}

impl StepContext<'_> {
    /// `Err(InterruptedTick)` once cancellation was requested.
    #[inline]
    pub fn check_cancelled(&self) -> SimResult<()> {
        if self.cancel.is_cancelled() {
            return Err(SimError::InterruptedTick(self.tick));
        }
        Ok(())
    }
}

/// Counts reported for a completed tick.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct TickSummary {
    pub tick: Tick,
    /// Vehicles that entered the network.
    pub spawned: usize,
    /// Vehicles that advanced at least one cell (including exits).
    pub moved: usize,
    /// Vehicles that left the network.
    pub finished: usize,
    /// Node crossings granted for the next tick.
    pub granted: usize,
    /// Vehicles on the network after the tick.
    pub active: usize,
}

// ── StepExecutor ──────────────────────────────────────────────────────────────

/// A strategy for running the five phases of a tick.
///
/// Implementations differ only in how they iterate; all must produce
/// identical state for identical inputs.
pub trait StepExecutor: Send + Sync {
    fn name(&self) -> &'static str;

    /// Phase ①.  Fills `plans`, sorted by vehicle id.  On cancellation
    /// returns [`SimError::InterruptedTick`] and leaves `plans` unspecified.
    fn will_move_all(
        &self,
        ctx: &StepContext<'_>,
        graph: &StreetGraph,
        vehicles: &VehicleStore,
        plans: &mut Vec<Plan>,
    ) -> SimResult<()>;

    /// Phase ②.  Returns the number of vehicles that moved.
    fn move_all(&self, graph: &mut StreetGraph, vehicles: &mut VehicleStore, plans: &[Plan]) -> usize;

    /// Phase ③.  Returns the number of vehicles retired.
    fn did_move_all(&self, tick: Tick, vehicles: &mut VehicleStore, plans: &[Plan]) -> usize;

    /// Phase ④.  Returns the number of vehicles spawned.
    fn spawn_all(&self, tick: Tick, graph: &mut StreetGraph, vehicles: &mut VehicleStore) -> usize;

    /// Phase ⑤.  Returns the number of crossings granted.
    fn update_nodes(&self, tick: Tick, graph: &mut StreetGraph, vehicles: &VehicleStore) -> usize;

    /// Run all phases in order.
    ///
    /// Cancellation is honoured at the tick boundary and throughout phase ①;
    /// either way the tick is abandoned before anything is committed.
    fn step(
        &self,
        ctx: &StepContext<'_>,
        graph: &mut StreetGraph,
        vehicles: &mut VehicleStore,
        plans: &mut Vec<Plan>,
    ) -> SimResult<TickSummary> {
        ctx.check_cancelled()?;
        self.will_move_all(ctx, graph, vehicles, plans)?;
        ctx.check_cancelled()?;

        let moved = self.move_all(graph, vehicles, plans);
        let finished = self.did_move_all(ctx.tick, vehicles, plans);
        let spawned = self.spawn_all(ctx.tick, graph, vehicles);
        let granted = self.update_nodes(ctx.tick, graph, vehicles);

        Ok(TickSummary {
            tick: ctx.tick,
            spawned,
            moved,
            finished,
            granted,
            active: vehicles.active_count(),
        })
    }
}

// ── SequentialExecutor ────────────────────────────────────────────────────────

/// Runs every phase on the calling thread in ascending id order.
#[derive(Copy, Clone, Debug, Default)]
pub struct SequentialExecutor;

impl StepExecutor for SequentialExecutor {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn will_move_all(
        &self,
        ctx: &StepContext<'_>,
        graph: &StreetGraph,
        vehicles: &VehicleStore,
        plans: &mut Vec<Plan>,
    ) -> SimResult<()> {
        plans.clear();
        for vehicle in vehicles.iter().filter(|v| v.is_spawned()) {
            ctx.check_cancelled()?;
            plans.extend(phases::plan_vehicle(ctx, graph, vehicle));
        }
        Ok(())
    }

    fn move_all(&self, graph: &mut StreetGraph, vehicles: &mut VehicleStore, plans: &[Plan]) -> usize {
        let mut ops: Vec<LaneOp> = plans.iter().flat_map(|p| p.lane_ops()).collect();
        ops.sort_unstable_by_key(LaneOp::sort_key);
        for edge in graph.edges_mut() {
            let edge_ops = phases::ops_for_edge(&ops, edge);
            if !edge_ops.is_empty() {
                edge.apply_lane_ops(edge_ops);
            }
        }

        for plan in plans {
            phases::commit_vehicle(vehicles.get_mut(plan.vehicle), plan);
        }
        plans.iter().filter(|p| p.moves()).count()
    }

    fn did_move_all(&self, tick: Tick, vehicles: &mut VehicleStore, plans: &[Plan]) -> usize {
        let mut finished = 0;
        for plan in plans {
            if phases::retire_vehicle(tick, vehicles.get_mut(plan.vehicle), plan) {
                finished += 1;
            }
        }
        finished
    }

    fn spawn_all(&self, tick: Tick, graph: &mut StreetGraph, vehicles: &mut VehicleStore) -> usize {
        let mut spawned = 0;
        for vehicle in vehicles.as_mut_slice() {
            if phases::wants_to_spawn(tick, graph, vehicle) && phases::spawn_vehicle(tick, graph, vehicle) {
                spawned += 1;
            }
        }
        spawned
    }

    fn update_nodes(&self, tick: Tick, graph: &mut StreetGraph, vehicles: &VehicleStore) -> usize {
        let (nodes, edges) = graph.nodes_mut_with_edges();
        nodes
            .iter_mut()
            .map(|node| phases::update_node(tick, node, edges, vehicles))
            .sum()
    }
}
