//! `mt-sim` — phased step execution and tick loop for the microtraffic
//! simulator.
//!
//! # Phased tick
//!
//! ```text
//! for tick in 0..config.total_ticks:
//!   ① will_move_all   spawned vehicles plan from start-of-tick state
//!   ② move_all        lane operations committed per edge, vehicles moved
//!   ③ did_move_all    vehicles past the end of their route retired
//!   ④ spawn_all       due vehicles enter their first edge
//!   ⑤ update_nodes    intersections grant crossings for the next tick
//!   → SimObserver::on_step_completed
//! ```
//!
//! Every phase is a barrier.  The [`StepExecutor`] decides how the entities
//! of a phase are iterated; [`SequentialExecutor`] and [`ShardedExecutor`]
//! give identical results for the same seed.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | (default) `ShardedExecutor` on a Rayon thread pool.        |
//! | `fx-hash`  | Forwards to `mt-graph/fx-hash`.                            |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use mt_core::SimConfig;
//! use mt_graph::{DijkstraRouter, StreetGraphGenerator};
//! use mt_sim::{NoopObserver, SimBuilder, Trip};
//! use mt_vehicle::NagelSchreckenberg;
//!
//! let generated = StreetGraphGenerator::new(&config).generate(&dataset)?;
//! let mut sim = SimBuilder::new(config, generated.graph, NagelSchreckenberg::default(), DijkstraRouter)
//!     .trips(trips)
//!     .build()?;
//! sim.run(&mut NoopObserver)?;
//! ```

pub mod builder;
pub mod cancel;
pub mod error;
pub mod executor;
pub mod observer;
pub mod phases;
#[cfg(feature = "parallel")]
pub mod sharded;
pub mod sim;


pub use builder::{SimBuilder, Trip, TripEnd};
pub use cancel::CancelToken;
pub use error::{SimError, SimResult};
pub use executor::{SequentialExecutor, StepContext, StepExecutor, TickSummary};
pub use observer::{NoopObserver, SimObserver};
pub use phases::{Plan, PlanTarget};
#[cfg(feature = "parallel")]
pub use sharded::ShardedExecutor;
pub use sim::Sim;
