//! Conflict relations between two movements through the same node.
//!
//! Every leg of a node carries an edge index in `[0, n)`, assigned clockwise
//! by compass bearing (see [`Node::edge_index`](crate::Node)).  A movement
//! from leg `o` to leg `d` sweeps the inclusive modular range `o, o+1, …, d`.
//! Both functions are pure and never loop: malformed input is rejected with
//! [`GraphError::InvalidIndex`] and every walk is bounded by `2 * n` steps.

use crate::{GraphError, GraphResult};

fn check(index: u8, indices_per_node: u8) -> GraphResult<()> {
    if index >= indices_per_node {
        return Err(GraphError::InvalidIndex { index, indices_per_node });
    }
    Ok(())
}

fn check_all(o1: u8, d1: u8, o2: u8, d2: u8, n: u8) -> GraphResult<()> {
    check(o1, n)?;
    check(d1, n)?;
    check(o2, n)?;
    check(d2, n)
}

/// Indices swept walking clockwise from `origin` to `destination`, inclusive.
fn modular_range(origin: u8, destination: u8, n: u8) -> impl Iterator<Item = u8> {
    let n = n as u16;
    let span = (destination as u16 + n - origin as u16) % n + 1;
    (0..span).map(move |k| ((origin as u16 + k) % n) as u8)
}

/// Lowest edge index swept by both movements `o1 → d1` and `o2 → d2`.
///
/// `Ok(None)` means the two ranges share no index.
pub fn leftmost_index_in_matching(
    o1: u8,
    d1: u8,
    o2: u8,
    d2: u8,
    indices_per_node: u8,
) -> GraphResult<Option<u8>> {
    check_all(o1, d1, o2, d2, indices_per_node)?;

    let mut first = [false; 256];
    for i in modular_range(o1, d1, indices_per_node) {
        first[i as usize] = true;
    }
    Ok(modular_range(o2, d2, indices_per_node)
        .filter(|&i| first[i as usize])
        .min())
}

/// Whether movement `o1 → d1` crosses movement `o2 → d2`.
///
/// Walks clockwise from `o1`.  Until an endpoint of the second movement is
/// met, reaching `d1` means the movements are disjoint.  After one is met,
/// reaching `d1` (or sharing the destination) means a crossing, while
/// meeting the other endpoint first means the second movement is nested
/// inside the first.  The relation is deliberately not symmetric when the
/// movements share an origin.
pub fn are_indices_crossing(
    o1: u8,
    d1: u8,
    o2: u8,
    d2: u8,
    indices_per_node: u8,
) -> GraphResult<bool> {
    check_all(o1, d1, o2, d2, indices_per_node)?;

    let n = indices_per_node as u16;
    let (d1, o2, d2) = (d1 as u16, o2 as u16, d2 as u16);
    let mut i = o1 as u16;
    let mut seen_other = false;

    for _ in 0..2 * n {
        i = (i + 1) % n;
        if !seen_other {
            if i == o2 || i == d2 {
                seen_other = true;
            } else if i == d1 {
                return Ok(false);
            }
        } else if i == d1 || d1 == d2 {
            return Ok(true);
        } else if i == o2 || i == d2 {
            return Ok(false);
        }
    }
    Ok(false)
}

/// Whether two movements must not be granted in the same tick.
///
/// Movements whose swept ranges are disjoint never conflict; otherwise the
/// crossing relation is checked in both orders.
pub fn movements_conflict(
    (o1, d1): (u8, u8),
    (o2, d2): (u8, u8),
    indices_per_node: u8,
) -> GraphResult<bool> {
    if leftmost_index_in_matching(o1, d1, o2, d2, indices_per_node)?.is_none() {
        return Ok(false);
    }
    Ok(are_indices_crossing(o1, d1, o2, d2, indices_per_node)?
        || are_indices_crossing(o2, d2, o1, d1, indices_per_node)?)
}
