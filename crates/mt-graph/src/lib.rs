//! `mt-graph` — cell-discretized street graph, intersection admission,
//! graph generation, and routing.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`lane`]      | `Lane`, `LaneRef`, `CellPos`, deferred `LaneOp`s             |
//! | [`edge`]      | `DirectedEdge`, `EdgeSpec`                                   |
//! | [`indices`]   | crossing / matching relations between two movements          |
//! | [`node`]      | `Node`, `Connector`, `CrossingRequest`, `Grant`              |
//! | [`graph`]     | `StreetGraph` (arenas + R-tree)                              |
//! | [`records`]   | `Dataset`, `WayRecord`, `Oneway` (generator input)           |
//! | [`generator`] | `StreetGraphGenerator`, `GeneratedGraph`                     |
//! | [`router`]    | `Router` trait, `Route`, `DijkstraRouter`                    |
//! | [`error`]     | `GraphError`, `GraphResult<T>`                               |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                     |
//! |-----------|------------------------------------------------------------|
//! | `fx-hash` | FxHash instead of SipHash for the generator's node memo.  |
//! | `serde`   | Derives `Serialize`/`Deserialize` on public data types.    |

pub mod edge;
pub mod error;
pub mod generator;
pub mod graph;
pub mod indices;
pub mod lane;
pub mod node;
pub mod records;
pub mod router;

#[cfg(test)]
mod tests;

pub use edge::{DirectedEdge, EdgeSpec};
pub use error::{GraphError, GraphResult};
pub use generator::{GeneratedGraph, StreetGraphGenerator, WayEdges};
pub use graph::StreetGraph;
pub use indices::{are_indices_crossing, leftmost_index_in_matching, movements_conflict};
pub use lane::{CellPos, Lane, LaneOp, LaneOpKind, LaneRef};
pub use node::{Connector, CrossingRequest, Grant, Node};
pub use records::{Dataset, Oneway, PerDirection, WayConnection, WayRecord};
pub use router::{DijkstraRouter, Route, Router};

#[cfg(feature = "fx-hash")]
pub(crate) type IdMap<K, V> = rustc_hash::FxHashMap<K, V>;

#[cfg(not(feature = "fx-hash"))]
pub(crate) type IdMap<K, V> = std::collections::HashMap<K, V>;
