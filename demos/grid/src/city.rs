//! Synthetic grid city as way and node records.
//!
//! Streets run east-west, avenues north-south.  Every fourth avenue is a
//! two-lane primary road; the outermost ring of streets is one-way
//! (clockwise), everything else is two-way.  One way per block side, so
//! every intersection is a way endpoint and gets connectors.

use mt_core::{GeoPoint, StreetType};
use mt_graph::{Dataset, Oneway, WayRecord};

/// Block edge length in degrees (about 110 m north-south).
const BLOCK_DEG: f32 = 0.001;

/// South-west corner of the city.
const ORIGIN: GeoPoint = GeoPoint { lat: 30.680, lon: -88.060 };

#[inline]
fn node_id(cols: i64, r: i64, c: i64) -> i64 {
    r * cols + c + 1
}

/// Build the dataset for a `rows × cols` lattice of intersections and
/// derive its turn relations.
pub fn grid_city(rows: i64, cols: i64) -> Dataset {
    let mut ds = Dataset::new();
    for r in 0..rows {
        for c in 0..cols {
            let pos = GeoPoint::new(
                ORIGIN.lat + r as f32 * BLOCK_DEG,
                ORIGIN.lon + c as f32 * BLOCK_DEG,
            );
            ds.add_node(node_id(cols, r, c), pos);
        }
    }

    let mut next_way = 1;
    let mut way = |nodes: Vec<i64>, street: StreetType| {
        let w = WayRecord::new(next_way, nodes, street);
        next_way += 1;
        w
    };

    // Streets: west → east.
    for r in 0..rows {
        for c in 0..cols - 1 {
            let nodes = vec![node_id(cols, r, c), node_id(cols, r, c + 1)];
            let mut w = way(nodes, StreetType::Residential);
            // Clockwise ring: the north edge runs east, the south edge west.
            if r == rows - 1 {
                w = w.with_oneway(Oneway::Forward);
            } else if r == 0 {
                w = w.with_oneway(Oneway::Backward);
            }
            ds.add_way(w);
        }
    }

    // Avenues: south → north.
    for c in 0..cols {
        let primary = c % 4 == 0 && c != 0 && c != cols - 1;
        for r in 0..rows - 1 {
            let nodes = vec![node_id(cols, r, c), node_id(cols, r + 1, c)];
            let mut w = if primary {
                way(nodes, StreetType::Primary).with_lanes(2, 2)
            } else {
                way(nodes, StreetType::Secondary)
            };
            if c == cols - 1 {
                w = w.with_oneway(Oneway::Backward);
            } else if c == 0 {
                w = w.with_oneway(Oneway::Forward);
            }
            ds.add_way(w);
        }
    }

    ds.derive_connections();
    ds
}
