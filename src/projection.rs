//! # Line Projection
//!
//! Snapping arbitrary positions onto a polyline and slicing a polyline
//! between two positions.
//!
//! Both operations work on the planar (equirectangular) approximation: each
//! segment is treated as a straight line in lon/lat space and the candidate
//! point is the clamped orthogonal projection onto it. Over the segment
//! lengths found in road geometry this is indistinguishable from a spherical
//! projection and considerably cheaper.

use crate::geo_utils::sq_dist;
use crate::GeoPoint;

/// Result of projecting a position onto a polyline.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SnappedPoint {
    /// Nearest point on the line.
    pub point: GeoPoint,
    /// Index of the segment containing [`point`](Self::point); segment `i`
    /// runs from vertex `i` to vertex `i + 1`.
    pub segment_index: usize,
    /// Position along the segment, clamped to `[0, 1]`.
    pub t: f64,
    /// Squared planar distance from the query to [`point`](Self::point), in
    /// degrees squared.
    pub sq_dist: f64,
}

/// A sub-polyline produced by [`line_slice`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Slice {
    /// Vertices of the slice, snapped start first.
    pub points: Vec<GeoPoint>,
    /// True when the start snapped after the end along the line, in which
    /// case [`points`](Self::points) is empty.
    pub degenerate: bool,
}

impl Slice {
    /// Total planar-segment length of the slice in the given unit; see
    /// [`line_distance`](crate::geo_utils::line_distance).
    pub fn distance(&self, unit: crate::DistanceUnit) -> f64 {
        crate::geo_utils::line_distance(&self.points, unit)
    }
}

/// Project `point` onto the nearest location on `line`.
///
/// Returns `None` for an empty line. A single-point line snaps to that point
/// with `segment_index` 0 and `t` 0. Ties between segments resolve to the
/// earliest segment.
pub fn point_on_line(point: &GeoPoint, line: &[GeoPoint]) -> Option<SnappedPoint> {
    match line {
        [] => return None,
        [only] => {
            return Some(SnappedPoint {
                point: *only,
                segment_index: 0,
                t: 0.0,
                sq_dist: sq_dist(point, only),
            });
        }
        _ => {}
    }

    let mut best: Option<SnappedPoint> = None;
    for (i, seg) in line.windows(2).enumerate() {
        let candidate = project_onto_segment(point, &seg[0], &seg[1], i);
        // Strict comparison keeps the earliest segment on exact ties.
        if best.as_ref().map_or(true, |b| candidate.sq_dist < b.sq_dist) {
            best = Some(candidate);
        }
    }
    best
}

fn project_onto_segment(
    point: &GeoPoint,
    start: &GeoPoint,
    end: &GeoPoint,
    segment_index: usize,
) -> SnappedPoint {
    let dx = end.longitude - start.longitude;
    let dy = end.latitude - start.latitude;
    let len_sq = dx * dx + dy * dy;

    let t = if len_sq > 0.0 {
        let raw = ((point.longitude - start.longitude) * dx
            + (point.latitude - start.latitude) * dy)
            / len_sq;
        raw.clamp(0.0, 1.0)
    } else {
        // Zero-length segment: both endpoints coincide.
        0.0
    };

    let snapped = GeoPoint::new(start.longitude + t * dx, start.latitude + t * dy);
    SnappedPoint {
        point: snapped,
        segment_index,
        t,
        sq_dist: sq_dist(point, &snapped),
    }
}

/// Extract the portion of `line` between the snapped locations of `start`
/// and `end`.
///
/// The slice begins at the snapped start, includes every interior vertex the
/// line visits between the two snaps, and finishes at the snapped end. When
/// the start snaps at or after the end along the line the slice is empty and
/// flagged degenerate.
pub fn line_slice(start: &GeoPoint, end: &GeoPoint, line: &[GeoPoint]) -> Slice {
    let (Some(a), Some(b)) = (point_on_line(start, line), point_on_line(end, line)) else {
        return Slice {
            points: Vec::new(),
            degenerate: false,
        };
    };

    if (b.segment_index, b.t) < (a.segment_index, a.t) {
        log::warn!(
            "degenerate slice: start snapped after end (segment {} t {:.4} vs segment {} t {:.4})",
            a.segment_index,
            a.t,
            b.segment_index,
            b.t
        );
        return Slice {
            points: Vec::new(),
            degenerate: true,
        };
    }

    let mut points = vec![a.point];
    // Interior vertices strictly between the two snap locations.
    for vertex in &line[a.segment_index + 1..=b.segment_index.min(line.len() - 1)] {
        if *vertex != a.point {
            points.push(*vertex);
        }
    }
    if b.point != *points.last().unwrap_or(&a.point) {
        points.push(b.point);
    }

    Slice {
        points,
        degenerate: false,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo_utils::{distance, line_distance};
    use crate::DistanceUnit;
    use approx::assert_relative_eq;

    fn l_shape() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 0.0),
            GeoPoint::new(1.0, 1.0),
        ]
    }

    #[test]
    fn test_empty_line_has_no_projection() {
        assert!(point_on_line(&GeoPoint::new(1.0, 1.0), &[]).is_none());
    }

    #[test]
    fn test_single_point_line() {
        let anchor = GeoPoint::new(3.0, 4.0);
        let snapped = point_on_line(&GeoPoint::new(0.0, 0.0), &[anchor]).unwrap();
        assert_eq!(snapped.point, anchor);
        assert_eq!(snapped.segment_index, 0);
        assert_eq!(snapped.t, 0.0);
        assert_relative_eq!(snapped.sq_dist, 25.0);
    }

    #[test]
    fn test_vertex_snaps_to_itself() {
        let line = l_shape();
        let snapped = point_on_line(&line[1], &line).unwrap();
        assert_eq!(snapped.point, line[1]);
        assert_relative_eq!(snapped.sq_dist, 0.0);
    }

    #[test]
    fn test_interior_projection() {
        let line = l_shape();
        let snapped = point_on_line(&GeoPoint::new(0.5, 0.2), &line).unwrap();
        assert_eq!(snapped.point, GeoPoint::new(0.5, 0.0));
        assert_eq!(snapped.segment_index, 0);
        assert_relative_eq!(snapped.t, 0.5);
        assert_relative_eq!(snapped.sq_dist, 0.04);
    }

    #[test]
    fn test_projection_clamps_past_endpoints() {
        let line = l_shape();
        let before = point_on_line(&GeoPoint::new(-2.0, -1.0), &line).unwrap();
        assert_eq!(before.point, line[0]);
        assert_eq!(before.t, 0.0);

        let after = point_on_line(&GeoPoint::new(1.5, 3.0), &line).unwrap();
        assert_eq!(after.point, line[2]);
        assert_eq!(after.segment_index, 1);
        assert_eq!(after.t, 1.0);
    }

    #[test]
    fn test_tie_breaks_to_earliest_segment() {
        // Equidistant from both arms of the corner.
        let snapped = point_on_line(&GeoPoint::new(0.5, 0.5), &l_shape()).unwrap();
        assert_eq!(snapped.segment_index, 0);
        assert_eq!(snapped.point, GeoPoint::new(0.5, 0.0));
    }

    #[test]
    fn test_snapped_distance_never_exceeds_vertex_distance() {
        let line = l_shape();
        let queries = [
            GeoPoint::new(0.3, 0.4),
            GeoPoint::new(1.2, 0.5),
            GeoPoint::new(-0.5, 0.9),
            GeoPoint::new(0.9, 1.4),
        ];
        for q in &queries {
            let snapped = point_on_line(q, &line).unwrap();
            let to_snap = distance(q, &snapped.point, DistanceUnit::Meters);
            for vertex in &line {
                assert!(to_snap <= distance(q, vertex, DistanceUnit::Meters) + 1e-9);
            }
        }
    }

    #[test]
    fn test_slice_within_one_segment() {
        let line = l_shape();
        let slice = line_slice(&GeoPoint::new(0.2, 0.1), &GeoPoint::new(0.8, -0.1), &line);
        assert!(!slice.degenerate);
        assert_eq!(
            slice.points,
            vec![GeoPoint::new(0.2, 0.0), GeoPoint::new(0.8, 0.0)]
        );
    }

    #[test]
    fn test_slice_spans_vertex() {
        let line = l_shape();
        let slice = line_slice(&GeoPoint::new(0.5, 0.1), &GeoPoint::new(1.1, 0.5), &line);
        assert!(!slice.degenerate);
        assert_eq!(
            slice.points,
            vec![
                GeoPoint::new(0.5, 0.0),
                GeoPoint::new(1.0, 0.0),
                GeoPoint::new(1.0, 0.5),
            ]
        );
        let total = slice.distance(DistanceUnit::Meters);
        assert_relative_eq!(total, line_distance(&slice.points, DistanceUnit::Meters));
    }

    #[test]
    fn test_slice_reversed_is_degenerate_and_empty() {
        let line = l_shape();
        let slice = line_slice(&GeoPoint::new(1.0, 0.5), &GeoPoint::new(0.2, 0.0), &line);
        assert!(slice.degenerate);
        assert!(slice.points.is_empty());
    }

    #[test]
    fn test_slice_with_coincident_ends() {
        let line = l_shape();
        let at = GeoPoint::new(0.5, 0.0);
        let slice = line_slice(&at, &at, &line);
        assert!(!slice.degenerate);
        assert_eq!(slice.points, vec![at]);
        assert_eq!(slice.distance(DistanceUnit::Meters), 0.0);
    }

    #[test]
    fn test_slice_full_line() {
        let line = l_shape();
        let slice = line_slice(&GeoPoint::new(-1.0, -1.0), &GeoPoint::new(1.0, 2.0), &line);
        assert_eq!(slice.points, line);
    }
}
