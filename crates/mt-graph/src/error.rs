//! Street-graph error type.

use thiserror::Error;

use mt_core::{EdgeId, NodeId};

/// Errors produced by `mt-graph`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GraphError {
    /// An edge index handed to the crossing resolver lies outside
    /// `[0, indices_per_node)`.
    #[error("edge index {index} outside [0, {indices_per_node})")]
    InvalidIndex { index: u8, indices_per_node: u8 },

    /// A way record cannot be turned into edges or connectors.
    #[error("way {way} is inconsistent: {reason}")]
    InconsistentWay { way: i64, reason: String },

    #[error("node {0} not found in graph")]
    NodeNotFound(NodeId),

    #[error("edge {0} not found in graph")]
    EdgeNotFound(EdgeId),

    #[error("lane {lane} does not exist on edge {edge}")]
    LaneNotFound { edge: EdgeId, lane: u8 },

    /// A connector was registered at a node the turn does not pass through.
    #[error("connector {from} -> {to} does not pass through node {via}")]
    MisplacedConnector { via: NodeId, from: EdgeId, to: EdgeId },

    /// A node has more distinct legs than an edge index can address.
    #[error("node {node} has {legs} legs; at most 255 are supported")]
    TooManyLegs { node: NodeId, legs: usize },

    #[error("no route from {from} to {to}")]
    NoRoute { from: NodeId, to: NodeId },

    #[error("graph is finalized; topology can no longer change")]
    Frozen,

    #[error("graph has not been finalized")]
    NotFinalized,
}

pub type GraphResult<T> = Result<T, GraphError>;
