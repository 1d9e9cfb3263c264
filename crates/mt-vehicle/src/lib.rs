//! `mt-vehicle` — vehicle storage and cellular driving models.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                 |
//! |-------------|----------------------------------------------------------|
//! | [`vehicle`] | `Vehicle`, `VehicleStatus`                               |
//! | [`store`]   | `VehicleStore`, `VehicleStoreBuilder`, `validate_route`  |
//! | [`model`]   | `DrivingModel` trait                                     |
//! | [`nasch`]   | `NagelSchreckenberg`                                     |
//! | [`error`]   | `VehicleError`, `VehicleResult<T>`                       |

pub mod error;
pub mod model;
pub mod nasch;
pub mod store;
pub mod vehicle;

#[cfg(test)]
mod tests;

pub use error::{VehicleError, VehicleResult};
pub use model::DrivingModel;
pub use nasch::NagelSchreckenberg;
pub use store::{VehicleStore, VehicleStoreBuilder, validate_route};
pub use vehicle::{Vehicle, VehicleStatus};
