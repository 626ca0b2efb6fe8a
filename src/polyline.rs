//! # Encoded Polyline Codec
//!
//! Encode and decode point sequences to/from the compact ASCII polyline format
//! used by directions APIs, at a configurable precision of 5 or 6 decimal
//! digits (see [`Precision`]).
//!
//! The format stores each point as a pair of signed deltas from the previous
//! point, **latitude first, then longitude**, which is the opposite of the
//! longitude-first accessor order on [`GeoPoint`]. Each delta is zig-zag
//! transformed, then emitted as 5-bit groups (least significant first) with a
//! `0x20` continuation bit, offset into printable ASCII by 63.
//!
//! ## Round-trip contract
//!
//! `decode(encode(p, k), k)` reproduces `p` with every coordinate equal to
//! `round(coord * 10^k) / 10^k`. This is an exact equality of the rounded
//! representation, not an approximation, and the tests assert it with `==`.

use crate::{Error, GeoPoint, Precision, Result};

// Encoded bytes live in 63..=126: 63 is the zero group, 126 the largest
// continuation group (0x20 | 0x1f) + 63.
const ASCII_OFFSET: u8 = 63;
const ASCII_MAX: u8 = 126;
const CONTINUATION_BIT: u64 = 0x20;

/// Encode a sequence of points into a polyline string.
///
/// An empty slice encodes to the empty string.
///
/// # Example
/// ```
/// use route_progress::{encode, GeoPoint, Precision};
///
/// let points = vec![
///     GeoPoint::new(-120.2, 38.5),
///     GeoPoint::new(-120.95, 40.7),
///     GeoPoint::new(-126.453, 43.252),
/// ];
/// assert_eq!(encode(&points, Precision::Five), "_p~iF~ps|U_ulLnnqC_mqNvxq`@");
/// ```
pub fn encode(points: &[GeoPoint], precision: Precision) -> String {
    let factor = precision.factor();

    let mut result = String::new();
    let mut last_lat: i64 = 0;
    let mut last_lng: i64 = 0;

    for point in points {
        let lat = (point.latitude * factor).round() as i64;
        let lng = (point.longitude * factor).round() as i64;

        encode_signed(lat - last_lat, &mut result);
        encode_signed(lng - last_lng, &mut result);

        last_lat = lat;
        last_lng = lng;
    }

    result
}

/// Decode a polyline string into a sequence of points.
///
/// An empty string decodes to an empty sequence. A byte group that is never
/// terminated (or a byte outside the polyline alphabet) fails with
/// [`Error::MalformedPolyline`]; the failure is fatal to this call only.
pub fn decode(text: &str, precision: Precision) -> Result<Vec<GeoPoint>> {
    let factor = precision.factor();
    let bytes = text.as_bytes();

    let mut path = Vec::with_capacity(bytes.len() / 4 + 1);
    let mut index = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while index < bytes.len() {
        lat += decode_signed(bytes, &mut index)?;
        lng += decode_signed(bytes, &mut index)?;
        path.push(GeoPoint::new(lng as f64 / factor, lat as f64 / factor));
    }

    Ok(path)
}

/// Zig-zag a signed delta and emit 5-bit groups, least significant first.
fn encode_signed(value: i64, out: &mut String) {
    let mut v = (if value < 0 { !(value << 1) } else { value << 1 }) as u64;
    while v >= CONTINUATION_BIT {
        let group = (CONTINUATION_BIT | (v & 0x1f)) as u8 + ASCII_OFFSET;
        out.push(group as char);
        v >>= 5;
    }
    out.push((v as u8 + ASCII_OFFSET) as char);
}

/// Accumulate 5-bit groups until one lacks the continuation bit, then undo the
/// zig-zag transform.
fn decode_signed(bytes: &[u8], index: &mut usize) -> Result<i64> {
    let start = *index;
    let mut result: u64 = 0;
    let mut shift = 0u32;

    loop {
        let byte = match bytes.get(*index) {
            Some(&b) if (ASCII_OFFSET..=ASCII_MAX).contains(&b) => b,
            Some(_) => return Err(Error::MalformedPolyline { offset: *index }),
            // Ran off the end of the string mid-group.
            None => return Err(Error::MalformedPolyline { offset: start }),
        };
        *index += 1;

        let group = (byte - ASCII_OFFSET) as u64;
        result |= (group & 0x1f) << shift;
        if group < CONTINUATION_BIT {
            break;
        }
        shift += 5;
        if shift > 60 {
            // A well-formed delta never needs more than 13 groups.
            return Err(Error::MalformedPolyline { offset: start });
        }
    }

    Ok(if result & 1 != 0 {
        !((result >> 1) as i64)
    } else {
        (result >> 1) as i64
    })
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_points() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(-120.2, 38.5),
            GeoPoint::new(-120.95, 40.7),
            GeoPoint::new(-126.453, 43.252),
        ]
    }

    #[test]
    fn test_encode_known_vector() {
        assert_eq!(
            encode(&test_points(), Precision::Five),
            "_p~iF~ps|U_ulLnnqC_mqNvxq`@"
        );
    }

    #[test]
    fn test_decode_known_vector() {
        let decoded = decode("_p~iF~ps|U_ulLnnqC_mqNvxq`@", Precision::Five).unwrap();
        let expected = test_points();
        assert_eq!(decoded.len(), expected.len());
        for (got, want) in decoded.iter().zip(&expected) {
            assert!((got.longitude - want.longitude).abs() < 1e-5);
            assert!((got.latitude - want.latitude).abs() < 1e-5);
        }
    }

    #[test]
    fn test_round_trip_is_exact_at_precision() {
        // The contract is exact equality of the rounded representation.
        for precision in [Precision::Five, Precision::Six] {
            let factor = precision.factor();
            let points = vec![
                GeoPoint::new(-0.1277583, 51.5073509),
                GeoPoint::new(2.3522219, 48.856614),
                GeoPoint::new(139.6917064, 35.6894875),
                GeoPoint::new(-179.9999999, -89.9999999),
            ];
            let decoded = decode(&encode(&points, precision), precision).unwrap();
            assert_eq!(decoded.len(), points.len());
            for (got, want) in decoded.iter().zip(&points) {
                assert_eq!(got.longitude, (want.longitude * factor).round() / factor);
                assert_eq!(got.latitude, (want.latitude * factor).round() / factor);
            }
        }
    }

    #[test]
    fn test_empty_string_decodes_to_empty() {
        assert_eq!(decode("", Precision::Five).unwrap(), vec![]);
        assert_eq!(decode("", Precision::Six).unwrap(), vec![]);
    }

    #[test]
    fn test_empty_points_encode_to_empty() {
        assert_eq!(encode(&[], Precision::Five), "");
    }

    #[test]
    fn test_single_point() {
        let points = vec![GeoPoint::new(-73.985428, 40.748817)];
        let decoded = decode(&encode(&points, Precision::Six), Precision::Six).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].longitude, -73.985428);
        assert_eq!(decoded[0].latitude, 40.748817);
    }

    #[test]
    fn test_unterminated_group_is_malformed() {
        // Drop the final byte of a valid encoding, leaving a dangling
        // continuation sequence.
        let text = encode(&test_points(), Precision::Five);
        let truncated = &text[..text.len() - 1];
        assert!(matches!(
            decode(truncated, Precision::Five),
            Err(Error::MalformedPolyline { .. })
        ));
    }

    #[test]
    fn test_byte_below_alphabet_is_malformed() {
        let err = decode("_p~iF ~ps|U", Precision::Five);
        assert!(matches!(err, Err(Error::MalformedPolyline { .. })));
    }

    #[test]
    fn test_duplicate_points_encode_zero_deltas() {
        let p = GeoPoint::new(9.1900, 45.4642);
        let decoded = decode(&encode(&[p, p, p], Precision::Five), Precision::Five).unwrap();
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0], decoded[1]);
        assert_eq!(decoded[1], decoded[2]);
    }

    #[test]
    fn test_decode_failure_does_not_poison_codec() {
        // A latitude group with no longitude group following it.
        assert!(matches!(
            decode("_p~iF", Precision::Five),
            Err(Error::MalformedPolyline { .. })
        ));
        // A failed decode is purely local; the next call works.
        let ok = decode("_p~iF~ps|U", Precision::Five).unwrap();
        assert_eq!(ok.len(), 1);
    }
}
