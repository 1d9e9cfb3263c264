//! The `Sim` struct and its tick loop.

use log::{debug, info};

use mt_core::{SimClock, SimConfig, Tick};
use mt_graph::StreetGraph;
use mt_vehicle::{DrivingModel, VehicleStatus, VehicleStore};

use crate::executor::{StepContext, StepExecutor, TickSummary};
use crate::phases::Plan;
use crate::{CancelToken, SimObserver, SimResult};

/// The main simulation runner.
///
/// `Sim<M>` owns the street graph, the vehicles and the driving model, and
/// hands them to its [`StepExecutor`] once per tick.  The executor runs the
/// five phases described in [`crate::executor`].
///
/// A tick that fails (cancellation, see [`CancelToken`]) leaves the clock on
/// that tick with nothing committed; calling `run` again after
/// [`CancelToken::reset`] retries it with identical results.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim<M: DrivingModel> {
    /// Global configuration (total ticks, seed, cell length, …).
    pub config: SimConfig,

    /// Simulation clock: the tick about to be executed.
    pub clock: SimClock,

    /// Street graph with lane occupancy and node admission state.
    pub graph: StreetGraph,

    /// All vehicles of the scenario, indexed by `VehicleId`.
    pub vehicles: VehicleStore,

    /// The driving model.  Called once per spawned vehicle per tick.
    pub model: M,

    pub(crate) executor: Box<dyn StepExecutor>,
    pub(crate) cancel: CancelToken,

    /// Plan buffer reused across ticks.
    pub(crate) plans: Vec<Plan>,
}

impl<M: DrivingModel> Sim<M> {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        while self.clock.current_tick < self.config.end_tick() {
            self.process_tick(observer)?;
        }
        let vehicles = &self.vehicles;
        info!(
            "simulation ended at {}: {} finished, {} active, {} waiting",
            self.clock,
            vehicles.count(VehicleStatus::Finished),
            vehicles.active_count(),
            vehicles.count(VehicleStatus::Waiting),
        );
        observer.on_sim_end(self.clock.current_tick, &self.vehicles);
        Ok(())
    }

    /// Run exactly `n` ticks from the current position (ignores `end_tick`).
    ///
    /// Useful for tests and incremental stepping.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        for _ in 0..n {
            self.process_tick(observer)?;
        }
        Ok(())
    }

    /// Run a single tick and return its summary.
    pub fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickSummary> {
        self.process_tick(observer)
    }

    /// A handle that stops the simulation from another thread (or from the
    /// driving model).
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Name of the step strategy in use (`"sequential"` or `"sharded"`).
    pub fn executor_name(&self) -> &'static str {
        self.executor.name()
    }

    /// Re-prepare the scenario: empty graph, every vehicle waiting, clock at
    /// tick 0, cancellation cleared.
    pub fn reset(&mut self) {
        self.graph.reset();
        self.vehicles.reset();
        self.clock = SimClock::new();
        self.cancel.reset();
        self.plans.clear();
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn process_tick<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<TickSummary> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        // Explicit field borrows so the borrow checker sees disjoint access.
        let ctx = StepContext {
            tick:   now,
            seed:   self.config.seed,
            model:  &self.model,
            cancel: &self.cancel,
        };
        let summary = self
            .executor
            .step(&ctx, &mut self.graph, &mut self.vehicles, &mut self.plans)?;

        debug!(
            "{now}: spawned {} moved {} finished {} granted {} active {}",
            summary.spawned, summary.moved, summary.finished, summary.granted, summary.active,
        );
        observer.on_step_completed(&summary, &self.graph, &self.vehicles);
        if self.is_snapshot_tick(now) {
            observer.on_snapshot(now, &self.graph, &self.vehicles);
        }

        self.clock.advance();
        Ok(summary)
    }

    fn is_snapshot_tick(&self, tick: Tick) -> bool {
        let interval = self.config.report_interval_ticks;
        interval > 0 && tick.0.is_multiple_of(interval)
    }
}
