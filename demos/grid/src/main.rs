//! grid: headless microtraffic run on a synthetic grid city.
//!
//! Builds way records for a rectangular city, generates the cell graph,
//! routes random trips and drives them with the Nagel–Schreckenberg model.
//! Progress is logged through `env_logger`; set `RUST_LOG=info` (or `debug`
//! for per-tick summaries).
//!
//! ```text
//! RUST_LOG=info cargo run --release -p grid -- --rows 12 --cols 12 --vehicles 2000
//! RUST_LOG=info cargo run --release -p grid -- --sequential
//! ```

mod city;

use std::time::Instant;

use anyhow::{Result, bail};
use clap::Parser;
use log::info;

use mt_core::{SimConfig, SimRng, Tick};
use mt_graph::{DijkstraRouter, StreetGraph, StreetGraphGenerator};
use mt_sim::{SequentialExecutor, SimBuilder, SimObserver, StepExecutor, TickSummary, Trip};
use mt_vehicle::{NagelSchreckenberg, VehicleStatus, VehicleStore};

use city::grid_city;

#[derive(Parser)]
#[command(name = "grid")]
#[command(about = "Cellular traffic simulation on a synthetic grid city")]
struct Cli {
    /// Intersections north-south
    #[arg(long, default_value_t = 8)]
    rows: i64,

    /// Intersections east-west
    #[arg(long, default_value_t = 8)]
    cols: i64,

    /// Trips to generate
    #[arg(long, default_value_t = 500)]
    vehicles: usize,

    /// Trips depart uniformly within the first N ticks
    #[arg(long, default_value_t = 600)]
    departure_window: u64,

    /// Ticks to simulate (one tick is one second)
    #[arg(long, default_value_t = 1_800)]
    ticks: u64,

    /// Master seed for trips and dawdling
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Dawdle probability of the NaSch model
    #[arg(long, default_value_t = NagelSchreckenberg::DEFAULT_DAWDLE_PROBABILITY)]
    dawdle: f64,

    /// Worker threads for the sharded executor (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Shards per phase (0 = one per thread)
    #[arg(long, default_value_t = 0)]
    shards: usize,

    /// Force the single-threaded executor
    #[arg(long)]
    sequential: bool,

    /// Log a progress line every N ticks (0 = never)
    #[arg(long, default_value_t = 300)]
    report_every: u64,
}

// ── Progress observer ─────────────────────────────────────────────────────────

#[derive(Default)]
struct Progress {
    spawned:  usize,
    finished: usize,
    granted:  usize,
}

impl SimObserver for Progress {
    fn on_step_completed(&mut self, s: &TickSummary, _: &StreetGraph, _: &VehicleStore) {
        self.spawned += s.spawned;
        self.finished += s.finished;
        self.granted += s.granted;
    }

    fn on_snapshot(&mut self, tick: Tick, graph: &StreetGraph, vehicles: &VehicleStore) {
        let busy = graph.edges().iter().filter(|e| e.vehicle_count() > 0).count();
        let usage = graph
            .edges()
            .iter()
            .map(|e| e.current_usage())
            .fold(0.0_f32, f32::max);
        info!(
            "{tick}: {} on the road across {busy} edges (peak {:.1} per lane), {} finished, {} waiting",
            vehicles.active_count(),
            usage,
            self.finished,
            vehicles.count(VehicleStatus::Waiting),
        );
    }
}

// ── Scenario ──────────────────────────────────────────────────────────────────

fn random_trips(graph: &StreetGraph, cli: &Cli) -> Vec<Trip> {
    let mut rng = SimRng::new(cli.seed);
    let nodes: Vec<_> = graph.nodes().iter().map(|n| n.id()).collect();
    let mut trips = Vec::with_capacity(cli.vehicles);
    while trips.len() < cli.vehicles {
        let (Some(&from), Some(&to)) = (rng.choose(&nodes), rng.choose(&nodes)) else { break };
        if from == to {
            continue;
        }
        let depart = Tick(rng.gen_range(0..cli.departure_window.max(1)));
        trips.push(Trip::between_nodes(from, to, depart));
    }
    trips
}

fn executor(cli: &Cli) -> Result<Box<dyn StepExecutor>> {
    if cli.sequential || cli.threads == Some(1) {
        return Ok(Box::new(SequentialExecutor));
    }
    #[cfg(feature = "parallel")]
    {
        Ok(Box::new(mt_sim::ShardedExecutor::new(cli.threads, cli.shards)?))
    }
    #[cfg(not(feature = "parallel"))]
    {
        log::warn!("built without the `parallel` feature; running sequentially");
        Ok(Box::new(SequentialExecutor))
    }
}

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if cli.rows < 2 || cli.cols < 2 {
        bail!("the city needs at least 2 × 2 intersections, got {} × {}", cli.rows, cli.cols);
    }

    let config = SimConfig {
        seed: cli.seed,
        total_ticks: cli.ticks,
        num_threads: cli.threads,
        shards: cli.shards,
        report_interval_ticks: cli.report_every,
        ..SimConfig::default()
    };
    config.validate()?;

    // 1. Way records → cell graph.
    let dataset = grid_city(cli.rows, cli.cols);
    let generated = StreetGraphGenerator::new(&config).generate(&dataset)?;
    if !generated.skipped.is_empty() {
        log::warn!("{} ways skipped while generating the graph", generated.skipped.len());
    }
    let graph = generated.graph;

    // 2. Trips.
    let trips = random_trips(&graph, &cli);

    // 3. Sim.
    let model = NagelSchreckenberg::new(cli.dawdle)?;
    let mut sim = SimBuilder::new(config, graph, model, DijkstraRouter)
        .trips(trips)
        .executor(executor(&cli)?)
        .build()?;
    info!(
        "{} vehicles routed, {} executor, {} ticks",
        sim.vehicles.len(),
        sim.executor_name(),
        cli.ticks
    );

    // 4. Run.
    let mut progress = Progress::default();
    let t0 = Instant::now();
    sim.run(&mut progress)?;
    let elapsed = t0.elapsed();

    // 5. Summary.
    let travel: Vec<u64> = sim.vehicles.iter().filter_map(|v| v.travel_ticks()).collect();
    let mean_travel = if travel.is_empty() {
        0.0
    } else {
        travel.iter().sum::<u64>() as f64 / travel.len() as f64
    };
    info!(
        "done in {:.3} s: {} spawned, {} finished (mean trip {mean_travel:.1} ticks), {} crossings granted",
        elapsed.as_secs_f64(),
        progress.spawned,
        progress.finished,
        progress.granted,
    );
    Ok(())
}
