//! Simulation observer trait for progress reporting and data collection.

use mt_core::Tick;
use mt_graph::StreetGraph;
use mt_vehicle::VehicleStore;

use crate::TickSummary;

/// Callbacks invoked by [`Sim::run`][crate::Sim::run] at key points in the
/// tick loop.
///
/// All methods have default no-op implementations so implementors only need to
/// override what they care about.
///
/// # Example: occupancy printer
///
/// ```rust,ignore
/// struct Occupancy;
///
/// impl SimObserver for Occupancy {
///     fn on_step_completed(&mut self, s: &TickSummary, graph: &StreetGraph, _: &VehicleStore) {
///         println!("{}: {} vehicles on {} edges", s.tick, graph.vehicle_count(), graph.edge_count());
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before any processing.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once all five phases of a tick have been committed.
    ///
    /// This is the "step completed" signal: the graph and vehicle store are
    /// consistent and may be read freely.
    fn on_step_completed(
        &mut self,
        _summary:  &TickSummary,
        _graph:    &StreetGraph,
        _vehicles: &VehicleStore,
    ) {}

    /// Called at snapshot intervals (every `config.report_interval_ticks`
    /// ticks), after `on_step_completed`.
    fn on_snapshot(
        &mut self,
        _tick:     Tick,
        _graph:    &StreetGraph,
        _vehicles: &VehicleStore,
    ) {}

    /// Called once after the final tick completes.
    fn on_sim_end(&mut self, _final_tick: Tick, _vehicles: &VehicleStore) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
