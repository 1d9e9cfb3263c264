//! `mt-core` — foundational types for the `microtraffic` simulator.
//!
//! This crate is a dependency of every other `mt-*` crate.  It has no `mt-*`
//! dependencies and minimal external ones (only `rand` and `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`ids`]         | `NodeId`, `EdgeId`, `VehicleId`                           |
//! | [`geo`]         | `GeoPoint`, `Vec2`, haversine distance, `DistanceFn`      |
//! | [`direction`]   | `Direction` turn tag, `curve_direction`                   |
//! | [`street`]      | `StreetType`, `StreetPriorities`                          |
//! | [`config`]      | `SimConfig`                                               |
//! | [`time`]        | `Tick`, `SimClock`                                        |
//! | [`rng`]         | `VehicleRng` (per vehicle per tick), `SimRng` (global)    |
//! | [`error`]       | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public data types.   |

pub mod config;
pub mod direction;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod street;
pub mod time;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimConfig;
pub use direction::{Direction, curve_direction};
pub use error::{CoreError, CoreResult};
pub use geo::{DistanceFn, GeoPoint, Vec2, haversine_m};
pub use ids::{EdgeId, NodeId, VehicleId};
pub use rng::{SimRng, VehicleRng};
pub use street::{StreetPriorities, StreetType};
pub use time::{SimClock, Tick};
