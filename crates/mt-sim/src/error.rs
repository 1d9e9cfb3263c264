use thiserror::Error;

use mt_core::{CoreError, Tick};
use mt_graph::GraphError;
use mt_vehicle::VehicleError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(String),

    /// The tick was cancelled before any state was committed.  The
    /// simulation stays at this tick and can be resumed after the cancel
    /// token is reset.
    #[error("tick {0} interrupted before commit")]
    InterruptedTick(Tick),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("vehicle error: {0}")]
    Vehicle(#[from] VehicleError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type SimResult<T> = Result<T, SimError>;
