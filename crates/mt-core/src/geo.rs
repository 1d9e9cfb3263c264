//! Geographic coordinate type and planar direction vectors.
//!
//! `GeoPoint` uses `f32` (single-precision) latitude/longitude.  At the
//! equator this gives ~1 m precision, which is finer than any cell length the
//! simulator uses.
//!
//! `Vec2` is a planar vector in (lon, lat) degree space.  It is only used to
//! classify turn angles and to order the legs of a node by bearing, so the
//! distortion of treating degrees as a plane is irrelevant.

use std::ops::{Neg, Sub};

/// Signature of a pluggable great-circle distance function (metres).
pub type DistanceFn = fn(GeoPoint, GeoPoint) -> f32;

/// A WGS-84 geographic coordinate stored as single-precision floats.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub lat: f32,
    pub lon: f32,
}

impl GeoPoint {
    #[inline]
    pub fn new(lat: f32, lon: f32) -> Self {
        Self { lat, lon }
    }

    /// Haversine great-circle distance in metres.
    #[inline]
    pub fn distance_m(self, other: GeoPoint) -> f32 {
        haversine_m(self, other)
    }
}

impl Sub for GeoPoint {
    type Output = Vec2;

    /// Planar difference `self - rhs` as `(Δlon, Δlat)`.
    #[inline]
    fn sub(self, rhs: GeoPoint) -> Vec2 {
        Vec2::new(self.lon - rhs.lon, self.lat - rhs.lat)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// Haversine great-circle distance in metres.
///
/// Accuracy: ±0.5 % (f32 rounding); suitable for city-scale street lengths.
/// This is the default [`DistanceFn`] of the graph generator.
pub fn haversine_m(a: GeoPoint, b: GeoPoint) -> f32 {
    const R: f32 = 6_371_000.0; // mean Earth radius, metres

    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();

    let h = (d_lat * 0.5).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    R * c
}

// ── Vec2 ──────────────────────────────────────────────────────────────────────

/// Planar vector; `x` points east (longitude), `y` points north (latitude).
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// Unit vector in the same direction.  A zero vector stays zero (no NaN).
    pub fn normalize(self) -> Vec2 {
        let len = self.length();
        if len == 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(self.x / len, self.y / len)
    }

    #[inline]
    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// z-component of the 3-D cross product; positive when `other` lies
    /// counter-clockwise of `self`.
    #[inline]
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    /// Compass bearing in radians, clockwise from north, in `[0, 2π)`.
    pub fn bearing(self) -> f32 {
        let b = self.x.atan2(self.y);
        if b < 0.0 { b + std::f32::consts::TAU } else { b }
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}
