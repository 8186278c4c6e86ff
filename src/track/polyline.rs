//! Encoded polyline decoding.
//!
//! Activity feeds carry ground tracks in the encoded polyline format: each
//! coordinate is a zig-zag varint delta from the previous one, stored in
//! 5-bit chunks offset by 63 so every byte is printable ASCII.

use super::TrackError;
use crate::models::GeoPoint;

/// Coordinates are stored as integers scaled by this factor
const PRECISION: f64 = 1e5;

/// Decode an encoded polyline into points, in order
pub fn decode_polyline(encoded: &str) -> Result<Vec<GeoPoint>, TrackError> {
    let bytes = encoded.as_bytes();
    let mut points = Vec::new();
    let mut pos = 0;
    let mut lat: i64 = 0;
    let mut lng: i64 = 0;

    while pos < bytes.len() {
        lat = lat
            .checked_add(next_value(bytes, &mut pos)?)
            .ok_or(TrackError::PolylineOverflow { position: pos })?;
        lng = lng
            .checked_add(next_value(bytes, &mut pos)?)
            .ok_or(TrackError::PolylineOverflow { position: pos })?;
        points.push(GeoPoint::new(lat as f64 / PRECISION, lng as f64 / PRECISION));
    }

    Ok(points)
}

/// Read one zig-zag encoded value starting at `pos`, advancing past it
fn next_value(bytes: &[u8], pos: &mut usize) -> Result<i64, TrackError> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes
            .get(*pos)
            .ok_or(TrackError::TruncatedPolyline { position: *pos })?;

        if !(63..=126).contains(&byte) {
            return Err(TrackError::InvalidPolylineChar {
                ch: byte as char,
                position: *pos,
            });
        }
        if shift > 60 {
            return Err(TrackError::PolylineOverflow { position: *pos });
        }

        let chunk = (byte - 63) as i64;
        result |= (chunk & 0x1f) << shift;
        shift += 5;
        *pos += 1;

        if chunk < 0x20 {
            break;
        }
    }

    Ok(if result & 1 == 1 {
        !(result >> 1)
    } else {
        result >> 1
    })
}
