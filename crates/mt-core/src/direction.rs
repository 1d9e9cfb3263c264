//! Turn direction of a lane connector.

use crate::GeoPoint;

/// Sine of the largest deviation still classified as [`Direction::Straight`]
/// (about 3°).
const STRAIGHT_TOLERANCE: f32 = 0.05;

/// Geometric turn class of a movement through a node.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    Left,
    Right,
    Straight,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left     => "left",
            Direction::Right    => "right",
            Direction::Straight => "straight",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify the curve `p → q → r` where `q` is the junction.
///
/// A reversal (`r` back towards `p`) counts as a left turn, which is how
/// u-turns are tagged in right-hand traffic.
pub fn curve_direction(p: GeoPoint, q: GeoPoint, r: GeoPoint) -> Direction {
    let incoming = (q - p).normalize();
    let outgoing = (r - q).normalize();
    let sin = incoming.cross(outgoing);

    if sin.abs() <= STRAIGHT_TOLERANCE {
        if incoming.dot(outgoing) >= 0.0 {
            Direction::Straight
        } else {
            Direction::Left
        }
    } else if sin > 0.0 {
        Direction::Left
    } else {
        Direction::Right
    }
}
