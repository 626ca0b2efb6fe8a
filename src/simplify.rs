//! # Polyline Simplification
//!
//! Reduces the number of points in a polyline while retaining its shape, for
//! cheaper rendering and processing of dense route geometry.
//!
//! Two passes run in sequence, as in simplify.js: a radial-distance prefilter
//! that drops points closer than the tolerance to the last kept point, then
//! Ramer-Douglas-Peucker over the survivors. Passing `highest_quality` skips
//! the prefilter, trading speed for fidelity.
//!
//! The tolerance is expressed in the same (planar) units as the coordinates,
//! degrees, and is compared squared via [`sq_dist`]/[`sq_seg_dist`].

use crate::geo_utils::{sq_dist, sq_seg_dist};
use crate::GeoPoint;

/// Default tolerance, in the same units as the point coordinates.
pub const DEFAULT_TOLERANCE: f64 = 1.0;

/// The prefilter runs by default; skipping it is the slower, higher-quality
/// path.
pub const DEFAULT_HIGHEST_QUALITY: bool = false;

/// Simplify with the default tolerance and quality setting.
pub fn simplify_default(points: &[GeoPoint]) -> Vec<GeoPoint> {
    simplify(points, DEFAULT_TOLERANCE, DEFAULT_HIGHEST_QUALITY)
}

/// Reduce a point sequence to a visually-equivalent sparser one.
///
/// The first and last points of the input are always retained, and input of
/// two or fewer points is returned unchanged. The operation is idempotent: a
/// simplified line is a fixed point of `simplify` at the same tolerance.
///
/// # Example
/// ```
/// use route_progress::{simplify, GeoPoint};
///
/// let dense = vec![
///     GeoPoint::new(0.0, 0.0),
///     GeoPoint::new(1.0, 0.0001), // nearly collinear
///     GeoPoint::new(2.0, 0.0),
/// ];
/// let sparse = simplify(&dense, 0.01, false);
/// assert_eq!(sparse.len(), 2);
/// ```
pub fn simplify(points: &[GeoPoint], tolerance: f64, highest_quality: bool) -> Vec<GeoPoint> {
    if points.len() <= 2 {
        return points.to_vec();
    }

    let sq_tolerance = tolerance * tolerance;

    if highest_quality {
        douglas_peucker(points, sq_tolerance)
    } else {
        douglas_peucker(&radial_distance(points, sq_tolerance), sq_tolerance)
    }
}

/// Distance-based prefilter: keep a point only when it is farther than the
/// tolerance from the last kept point. The final point is appended even when
/// it fails the test, unless it is already the last kept point.
fn radial_distance(points: &[GeoPoint], sq_tolerance: f64) -> Vec<GeoPoint> {
    let mut kept = vec![points[0]];
    let mut prev = 0;

    for i in 1..points.len() {
        if sq_dist(&points[i], &points[prev]) > sq_tolerance {
            kept.push(points[i]);
            prev = i;
        }
    }

    if prev != points.len() - 1 {
        kept.push(points[points.len() - 1]);
    }

    kept
}

/// Ramer-Douglas-Peucker over index ranges, driven by an explicit work stack
/// so pathological nearly-collinear inputs cannot exhaust the call stack.
fn douglas_peucker(points: &[GeoPoint], sq_tolerance: f64) -> Vec<GeoPoint> {
    let last = points.len() - 1;
    let mut keep = vec![false; points.len()];
    keep[0] = true;
    keep[last] = true;

    let mut ranges = vec![(0usize, last)];
    while let Some((first, last)) = ranges.pop() {
        let mut max_sq_dist = sq_tolerance;
        let mut farthest = None;

        for i in first + 1..last {
            let d = sq_seg_dist(&points[i], &points[first], &points[last]);
            if d > max_sq_dist {
                farthest = Some(i);
                max_sq_dist = d;
            }
        }

        if let Some(index) = farthest {
            keep[index] = true;
            if index - first > 1 {
                ranges.push((first, index));
            }
            if last - index > 1 {
                ranges.push((index, last));
            }
        }
    }

    points
        .iter()
        .zip(&keep)
        .filter_map(|(p, &k)| k.then_some(*p))
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn zigzag(n: usize, amplitude: f64) -> Vec<GeoPoint> {
        (0..n)
            .map(|i| {
                let offset = if i % 2 == 0 { 0.0 } else { amplitude };
                GeoPoint::new(i as f64 * 0.01, offset)
            })
            .collect()
    }

    #[test]
    fn test_short_input_is_unchanged() {
        let empty: Vec<GeoPoint> = vec![];
        assert_eq!(simplify(&empty, 1.0, false), empty);

        let one = vec![GeoPoint::new(1.0, 2.0)];
        assert_eq!(simplify(&one, 1.0, false), one);

        let two = vec![GeoPoint::new(1.0, 2.0), GeoPoint::new(3.0, 4.0)];
        assert_eq!(simplify(&two, 1.0, false), two);
        assert_eq!(simplify(&two, 1.0, true), two);
    }

    #[test]
    fn test_collinear_interior_points_are_dropped() {
        let line: Vec<GeoPoint> = (0..10).map(|i| GeoPoint::new(i as f64, 0.0)).collect();
        let simplified = simplify(&line, 0.001, true);
        assert_eq!(simplified, vec![line[0], line[9]]);
    }

    #[test]
    fn test_endpoints_always_retained() {
        let points = zigzag(21, 0.5);
        for quality in [false, true] {
            let simplified = simplify(&points, 0.1, quality);
            assert_eq!(simplified.first(), points.first());
            assert_eq!(simplified.last(), points.last());
        }
    }

    #[test]
    fn test_large_deviations_survive() {
        let mut points: Vec<GeoPoint> = (0..9).map(|i| GeoPoint::new(i as f64 * 0.001, 0.0)).collect();
        points[4] = GeoPoint::new(0.004, 2.0); // a spike well past any tolerance
        let simplified = simplify(&points, 0.01, false);
        assert!(simplified.contains(&points[4]));
    }

    #[test]
    fn test_idempotent() {
        for quality in [false, true] {
            let points = zigzag(50, 0.003);
            let once = simplify(&points, 0.005, quality);
            let twice = simplify(&once, 0.005, quality);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_highest_quality_keeps_at_least_as_many_points() {
        let points = zigzag(50, 0.004);
        let fast = simplify(&points, 0.005, false);
        let best = simplify(&points, 0.005, true);
        assert!(best.len() >= fast.len());
    }

    #[test]
    fn test_duplicate_points_collapse() {
        let p = GeoPoint::new(10.0, 10.0);
        let q = GeoPoint::new(11.0, 10.0);
        let simplified = simplify(&[p, p, p, q], 0.1, false);
        assert_eq!(simplified, vec![p, q]);
    }

    #[test]
    fn test_radial_prefilter_appends_final_point() {
        // Last point is within tolerance of the last kept one but must
        // still terminate the line.
        let points = vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(5.0, 5.0),
            GeoPoint::new(5.00001, 5.00001),
        ];
        let simplified = simplify(&points, 0.001, false);
        assert_eq!(simplified.last(), points.last());
    }
}
