//! Vehicle-subsystem error type.

use thiserror::Error;

use mt_core::{CoreError, EdgeId};
use mt_graph::GraphError;

/// Errors produced by `mt-vehicle`.
#[derive(Debug, Error)]
pub enum VehicleError {
    #[error("route is empty")]
    EmptyRoute,

    /// Two consecutive route edges are not joined by a connector.
    #[error("route is disconnected: no connector from {from} onto {to}")]
    DisconnectedRoute { from: EdgeId, to: EdgeId },

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type VehicleResult<T> = Result<T, VehicleError>;
