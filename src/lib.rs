//! # Route Progress
//!
//! Route-geometry and live navigation progress tracking.
//!
//! This library turns a raw driving/walking route (an encoded polyline plus a
//! sequence of maneuver steps) into live navigation signals for a moving agent:
//! which step am I on, how far to the next maneuver, have I left the route, and
//! should the guidance advance to the next step.
//!
//! It provides:
//! - An encoded-polyline codec with configurable precision (5 or 6 digits)
//! - Great-circle measurement primitives (distance, bearing, destination)
//! - Polyline simplification (radial prefilter + Ramer-Douglas-Peucker)
//! - Point-to-polyline snapping and partial-route extraction
//! - A per-session progress tracker producing [`ProgressUpdate`] values
//!
//! Everything is synchronous, CPU-only work over in-memory geometry. There is no
//! network transport, no wire format beyond the polyline string itself, and no
//! persistence; route data comes from whatever directions client the application
//! uses, and position samples come from its location provider.
//!
//! ## Features
//!
//! - **`serde`** - Enable serde derives on the public value types
//!
//! ## Quick Start
//!
//! ```rust
//! use route_progress::{
//!     EncodedPolyline, GeoPoint, Leg, Precision, Route,
//!     RouteProgressTracker, Step, TrackerConfig,
//! };
//!
//! // One leg, one step: a short straight run heading north.
//! let step_points = vec![
//!     GeoPoint::new(-122.4194, 37.7749),
//!     GeoPoint::new(-122.4194, 37.7849),
//! ];
//!
//! let route = Route {
//!     legs: vec![Leg {
//!         steps: vec![Step {
//!             geometry: EncodedPolyline::from_points(&step_points, Precision::Five),
//!             distance_m: 1112.0,
//!             duration_s: 120.0,
//!             maneuver_bearing_after: None,
//!         }],
//!     }],
//! };
//!
//! let mut tracker = RouteProgressTracker::new(&route, TrackerConfig::default()).unwrap();
//!
//! // A position sample halfway along the step, right on the line.
//! let fix = GeoPoint::new(-122.4194, 37.7799);
//! let update = tracker.update(fix, Some(0.0)).unwrap();
//!
//! assert!(!update.is_off_route);
//! println!("{:.0} m to the next maneuver", update.distance_to_maneuver);
//! ```

pub mod geo_utils;
pub mod polyline;
pub mod projection;
pub mod simplify;
pub mod tracker;

pub use geo_utils::{bearing, destination, distance, DistanceUnit};
pub use polyline::{decode, encode};
pub use projection::{line_slice, point_on_line, Slice, SnappedPoint};
pub use simplify::{simplify, simplify_default};
pub use tracker::{
    AlertLevel, Leg, ProgressUpdate, Route, RouteProgressTracker, Step, TrackerConfig,
};

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with longitude, latitude and an optional altitude.
///
/// Longitude comes first in the accessor order, matching GeoJSON; note that the
/// encoded-polyline wire format stores latitude first (see [`polyline`]).
///
/// # Example
/// ```
/// use route_progress::GeoPoint;
/// let point = GeoPoint::new(-0.1278, 51.5074); // London
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
    /// Altitude in meters, when the source provides one. Two points with
    /// present and absent altitude compare unequal.
    pub altitude: Option<f64>,
}

impl GeoPoint {
    /// Create a new point from longitude and latitude.
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude, altitude: None }
    }

    /// Create a new point carrying an altitude.
    pub fn with_altitude(longitude: f64, latitude: f64, altitude: f64) -> Self {
        Self { longitude, latitude, altitude: Some(altitude) }
    }

    /// Check if the point has valid, finite coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Coordinate precision of an encoded polyline.
///
/// Directions APIs use both: OSRM v4 emits 6 decimal digits, OSRM v5 and the
/// original Google format emit 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Precision {
    /// 5 decimal digits (~1.1 m of resolution).
    #[default]
    Five,
    /// 6 decimal digits (~0.11 m of resolution).
    Six,
}

impl Precision {
    /// The multiplier applied to a coordinate before integer rounding.
    pub fn factor(self) -> f64 {
        match self {
            Precision::Five => 1e5,
            Precision::Six => 1e6,
        }
    }
}

/// An encoded polyline string together with the precision it was encoded at.
///
/// Decoding at the stored precision reproduces the source coordinates exactly
/// up to rounding at that precision (see [`polyline::decode`]).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EncodedPolyline {
    pub text: String,
    pub precision: Precision,
}

impl EncodedPolyline {
    /// Wrap an already-encoded string.
    pub fn new(text: impl Into<String>, precision: Precision) -> Self {
        Self { text: text.into(), precision }
    }

    /// Encode a point sequence at the given precision.
    pub fn from_points(points: &[GeoPoint], precision: Precision) -> Self {
        Self { text: polyline::encode(points, precision), precision }
    }

    /// Decode back into a point sequence.
    pub fn decode(&self) -> Result<Vec<GeoPoint>> {
        polyline::decode(&self.text, self.precision)
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Errors produced by this crate.
///
/// Geometric functions are total over finite coordinates; errors only arise
/// from malformed wire input, invalid route structure, or driving a finished
/// tracking session.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The codec hit a byte group it could not terminate, or a byte outside
    /// the encoded-polyline alphabet. Fatal to that decode call only.
    #[error("malformed polyline: bad byte group at offset {offset}")]
    MalformedPolyline { offset: usize },

    /// The route failed structural validation (zero legs, a leg with zero
    /// steps, an out-of-range step index, or step geometry that decodes to
    /// zero points).
    #[error("invalid route: {0}")]
    InvalidRoute(&'static str),

    /// The tracker has been advanced past the final step of the final leg.
    /// Callers should treat this as normal termination and stop calling
    /// [`RouteProgressTracker::update`].
    #[error("navigation session is already complete")]
    SessionComplete,
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// Tests
// ============================================================================
