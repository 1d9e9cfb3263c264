//! Intermediate way/node records consumed by the graph generator.
//!
//! A record producer (an OSM reader, a synthetic scenario, a test fixture)
//! fills a [`Dataset`].  Node and way ids are the producer's ids and are
//! only used to join records; the generated graph assigns its own.

use std::collections::{BTreeMap, HashMap};

use mt_core::{GeoPoint, StreetType};

/// Driving permission along a way's node order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Oneway {
    /// Both directions.
    #[default]
    No,
    /// Only along the node order.
    Forward,
    /// Only against the node order.
    Backward,
    /// Direction changes over the day; modelled as forward only.
    Reversible,
}

impl Oneway {
    #[inline]
    pub fn has_forward(self) -> bool {
        matches!(self, Oneway::No | Oneway::Forward | Oneway::Reversible)
    }

    #[inline]
    pub fn has_backward(self) -> bool {
        matches!(self, Oneway::No | Oneway::Backward)
    }
}

/// A value that may differ between the two driving directions of a way.
#[derive(Copy, Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerDirection<T> {
    pub forward: T,
    pub backward: T,
}

impl<T: Copy> PerDirection<T> {
    pub fn both(value: T) -> Self {
        Self { forward: value, backward: value }
    }
}

/// A way may be entered from `to` through the shared node `via`.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WayConnection {
    /// Shared endpoint node (producer id).
    pub via: i64,
    /// The other way (producer id).
    pub to: i64,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WayRecord {
    pub id: i64,
    /// Node ids in drawing order; at least two for a usable way.
    pub nodes: Vec<i64>,
    pub street_type: StreetType,
    pub oneway: Oneway,
    pub lanes: PerDirection<u8>,
    pub max_speed_kmh: PerDirection<f32>,
    /// Ways this way continues into at one of its endpoints.
    pub from: Vec<WayConnection>,
    /// Endpoints (node ids) where vehicles may turn back onto this way.
    pub uturn: Vec<i64>,
    /// The way's end continues into its own start (forward direction).
    pub cyclic_end_to_start: bool,
    /// The way's start continues into its own end (backward direction).
    pub cyclic_start_to_end: bool,
}

impl WayRecord {
    /// A two-way single-lane way with the class's default speed limit.
    pub fn new(id: i64, nodes: Vec<i64>, street_type: StreetType) -> Self {
        Self {
            id,
            nodes,
            street_type,
            oneway: Oneway::No,
            lanes: PerDirection::both(1),
            max_speed_kmh: PerDirection::both(street_type.default_max_speed_kmh()),
            from: Vec::new(),
            uturn: Vec::new(),
            cyclic_end_to_start: false,
            cyclic_start_to_end: false,
        }
    }

    pub fn with_oneway(mut self, oneway: Oneway) -> Self {
        self.oneway = oneway;
        self
    }

    pub fn with_lanes(mut self, forward: u8, backward: u8) -> Self {
        self.lanes = PerDirection { forward, backward };
        self
    }

    pub fn with_max_speed(mut self, kmh: f32) -> Self {
        self.max_speed_kmh = PerDirection::both(kmh);
        self
    }

    #[inline]
    pub fn first(&self) -> Option<i64> {
        self.nodes.first().copied()
    }

    #[inline]
    pub fn last(&self) -> Option<i64> {
        self.nodes.last().copied()
    }

    /// First and last node coincide.
    pub fn is_closed(&self) -> bool {
        self.nodes.len() > 2 && self.first() == self.last()
    }
}

// ── Dataset ───────────────────────────────────────────────────────────────────

/// All records of one generation run.
///
/// Ways are kept in a `BTreeMap` so generation visits them in id order and
/// produces the same edge ids on every run.
#[derive(Clone, Debug, Default)]
pub struct Dataset {
    pub nodes: HashMap<i64, GeoPoint>,
    pub ways: BTreeMap<i64, WayRecord>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, id: i64, pos: GeoPoint) {
        self.nodes.insert(id, pos);
    }

    pub fn add_way(&mut self, way: WayRecord) {
        self.ways.insert(way.id, way);
    }

    #[inline]
    pub fn node_pos(&self, id: i64) -> Option<GeoPoint> {
        self.nodes.get(&id).copied()
    }

    /// Replace every way's relations with those implied by shared endpoints.
    ///
    /// - Two ways sharing an endpoint connect to each other there.
    /// - A two-way way whose endpoint touches no other way gets a u-turn
    ///   there, so traffic reaching a dead end can come back.
    /// - A closed way (ring) continues into itself in both directions.
    pub fn derive_connections(&mut self) {
        let mut at_endpoint: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
        for way in self.ways.values() {
            let (Some(first), Some(last)) = (way.first(), way.last()) else { continue };
            if way.nodes.len() < 2 {
                continue;
            }
            at_endpoint.entry(first).or_default().push(way.id);
            if last != first {
                at_endpoint.entry(last).or_default().push(way.id);
            }
        }

        for way in self.ways.values_mut() {
            way.from.clear();
            way.uturn.clear();
            way.cyclic_end_to_start = false;
            way.cyclic_start_to_end = false;

            let (Some(first), Some(last)) = (way.first(), way.last()) else { continue };
            if way.nodes.len() < 2 {
                continue;
            }

            let endpoints: &[i64] = if first == last { &[first] } else { &[first, last] };
            for &via in endpoints {
                let others: Vec<i64> = at_endpoint
                    .get(&via)
                    .map(|ids| ids.iter().copied().filter(|&id| id != way.id).collect())
                    .unwrap_or_default();
                if others.is_empty() && way.oneway == Oneway::No && first != last {
                    way.uturn.push(via);
                }
                way.from.extend(others.into_iter().map(|to| WayConnection { via, to }));
            }

            if way.is_closed() {
                way.cyclic_end_to_start = true;
                way.cyclic_start_to_end = true;
            }
        }
    }
}
