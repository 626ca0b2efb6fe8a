//! # Geographic Utilities
//!
//! Core measurement primitives for route tracking. All functions are stateless
//! and total over finite WGS84 coordinates (longitude/latitude in degrees);
//! numeric edge cases like identical points have defined outputs rather than
//! NaN.
//!
//! ## Overview
//!
//! | Function | Description |
//! |----------|-------------|
//! | [`distance`] | Great-circle distance between two points, in a chosen unit |
//! | [`bearing`] | Initial bearing from one point to another, `[0, 360)` |
//! | [`bearing_diff`] | Smallest absolute angle between two bearings |
//! | [`destination`] | Direct geodesic problem: point at distance/bearing |
//! | [`line_distance`] | Total length of a point sequence |
//! | [`sq_dist`] / [`sq_seg_dist`] | Planar squared distances for tolerance tests |
//!
//! ## Algorithm Notes
//!
//! Distances use the haversine formula on a sphere; the per-unit earth factors
//! match the turf.js convention (6373 km radius), so results interoperate with
//! geometry produced by turf-based services. The squared-distance helpers work
//! on raw longitude/latitude as a plane: they are only meaningful for small
//! local tolerances (simplification, projection ties), never for real-world
//! distance.

use crate::GeoPoint;

/// Linear unit applied to an angular great-circle distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DistanceUnit {
    #[default]
    Meters,
    Kilometers,
    Miles,
    Feet,
    NauticalMiles,
    /// Raw angular distance in radians.
    Radians,
    /// Raw angular distance in degrees.
    Degrees,
}

impl DistanceUnit {
    /// Earth "radius" expressed in this unit; multiplying an angular distance
    /// in radians by this factor yields a length. Factors follow turf.js.
    pub fn earth_factor(self) -> f64 {
        match self {
            DistanceUnit::Meters => 6_373_000.0,
            DistanceUnit::Kilometers => 6_373.0,
            DistanceUnit::Miles => 3_960.0,
            DistanceUnit::Feet => 20_908_792.65,
            DistanceUnit::NauticalMiles => 3_441.145,
            DistanceUnit::Radians => 1.0,
            DistanceUnit::Degrees => 57.295_779_5,
        }
    }
}

/// Convert a length from one unit to another.
pub fn convert(value: f64, from: DistanceUnit, to: DistanceUnit) -> f64 {
    value / from.earth_factor() * to.earth_factor()
}

/// Great-circle distance between two points via the haversine formula.
///
/// Identical inputs return exactly `0.0`.
///
/// # Example
/// ```
/// use route_progress::{GeoPoint, DistanceUnit};
/// use route_progress::geo_utils::distance;
///
/// let london = GeoPoint::new(-0.1278, 51.5074);
/// let paris = GeoPoint::new(2.3522, 48.8566);
/// let km = distance(&london, &paris, DistanceUnit::Kilometers);
/// assert!((km - 343.6).abs() < 2.0);
/// ```
pub fn distance(a: &GeoPoint, b: &GeoPoint, unit: DistanceUnit) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let angular = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    angular * unit.earth_factor()
}

/// Initial bearing from `a` to `b` in degrees, normalized to `[0, 360)`.
///
/// Identical points yield `0.0`, a defined, stable value rather than NaN.
pub fn bearing(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lon1 = a.longitude.to_radians();
    let lon2 = b.longitude.to_radians();
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();

    let y = (lon2 - lon1).sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * (lon2 - lon1).cos();

    y.atan2(x).to_degrees().rem_euclid(360.0)
}

/// Smallest absolute difference between two bearings, in `[0, 180]`.
///
/// A heading of 359° against a maneuver bearing of 1° is a 2° error, not 358°.
pub fn bearing_diff(a: f64, b: f64) -> f64 {
    let d = (a - b).rem_euclid(360.0);
    d.min(360.0 - d)
}

/// Wrap a longitude into `[-180, 180]`, for results that cross the
/// antimeridian.
pub fn wrap_longitude(longitude: f64) -> f64 {
    let wrapped = (longitude + 180.0).rem_euclid(360.0) - 180.0;
    // rem_euclid maps 180 to -180; keep the sign of the input there.
    if wrapped == -180.0 && longitude > 0.0 {
        180.0
    } else {
        wrapped
    }
}

/// Destination point at `dist` (in `unit`) along `bearing` degrees from
/// `origin`.
///
/// A distance of `0.0` returns `origin` unchanged. The result longitude is
/// wrapped into `[-180, 180]`.
pub fn destination(origin: &GeoPoint, dist: f64, bearing: f64, unit: DistanceUnit) -> GeoPoint {
    if dist == 0.0 {
        return *origin;
    }

    let lon1 = origin.longitude.to_radians();
    let lat1 = origin.latitude.to_radians();
    let bearing_rad = bearing.to_radians();
    let radians = dist / unit.earth_factor();

    let lat2 = (lat1.sin() * radians.cos() + lat1.cos() * radians.sin() * bearing_rad.cos()).asin();
    let lon2 = lon1
        + (bearing_rad.sin() * radians.sin() * lat1.cos())
            .atan2(radians.cos() - lat1.sin() * lat2.sin());

    GeoPoint::new(wrap_longitude(lon2.to_degrees()), lat2.to_degrees())
}

/// Total length of a point sequence: the sum of the great-circle distances
/// between consecutive points. Empty or single-point input returns `0.0`.
pub fn line_distance(points: &[GeoPoint], unit: DistanceUnit) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }

    points
        .windows(2)
        .map(|w| distance(&w[0], &w[1], unit))
        .sum()
}

/// Planar squared distance between two points, on raw longitude/latitude.
///
/// Only valid for comparing against small local tolerances; this is not a
/// real-world distance.
#[inline]
pub fn sq_dist(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let dx = a.longitude - b.longitude;
    let dy = a.latitude - b.latitude;
    dx * dx + dy * dy
}

/// Planar squared distance from `p` to the segment `(a, b)`, on raw
/// longitude/latitude. A degenerate segment (`a == b`) degrades to the
/// point-to-point squared distance.
pub fn sq_seg_dist(p: &GeoPoint, a: &GeoPoint, b: &GeoPoint) -> f64 {
    let mut x = a.longitude;
    let mut y = a.latitude;
    let dx = b.longitude - x;
    let dy = b.latitude - y;

    if dx != 0.0 || dy != 0.0 {
        let t = ((p.longitude - x) * dx + (p.latitude - y) * dy) / (dx * dx + dy * dy);
        if t > 1.0 {
            x = b.longitude;
            y = b.latitude;
        } else if t > 0.0 {
            x += dx * t;
            y += dy * t;
        }
    }

    let dx = p.longitude - x;
    let dy = p.latitude - y;
    dx * dx + dy * dy
}

// ============================================================================
// Tests
// ============================================================================
