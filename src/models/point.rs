//! Point types for track input and sky-frame matching.

use serde::{Deserialize, Serialize};

/// Geographic point (lat/lng) taken from a recorded track.
///
/// Deserializes from either `{"lat": .., "lng": ..}` or a `[lat, lng]` pair,
/// so both shapes are folded into one type as soon as they enter the crate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPoint")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Reinterpret this point in the sky frame
    pub fn to_sky(self) -> SkyPoint {
        SkyPoint {
            ra: normalize_ra(self.lng),
            dec: self.lat,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPoint {
    Object { lat: f64, lng: f64 },
    Pair([f64; 2]),
}

impl From<RawPoint> for GeoPoint {
    fn from(raw: RawPoint) -> Self {
        match raw {
            RawPoint::Object { lat, lng } => GeoPoint { lat, lng },
            RawPoint::Pair([lat, lng]) => GeoPoint { lat, lng },
        }
    }
}

/// Point in the sky frame: right ascension and declination, both in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPoint {
    pub ra: f64,
    pub dec: f64,
}

impl SkyPoint {
    pub fn new(ra: f64, dec: f64) -> Self {
        Self { ra, dec }
    }

    /// Same declination, right ascension moved by `offset` degrees
    pub fn shifted(self, offset: f64) -> Self {
        Self {
            ra: self.ra + offset,
            dec: self.dec,
        }
    }
}

impl From<GeoPoint> for SkyPoint {
    fn from(point: GeoPoint) -> Self {
        point.to_sky()
    }
}

/// Map a longitude-like value onto a right ascension in `[0, 360)`.
///
/// Negative values are first moved up by a full turn. Anything still outside
/// the range is reduced with a Euclidean remainder, so any finite input lands
/// in range and values already in range come back bit-for-bit unchanged.
pub fn normalize_ra(lng: f64) -> f64 {
    let ra = if lng >= 0.0 { lng } else { lng + 360.0 };
    if (0.0..360.0).contains(&ra) {
        return ra;
    }
    let ra = ra.rem_euclid(360.0);
    // rem_euclid may round a tiny negative remainder up to the modulus
    if ra >= 360.0 {
        0.0
    } else {
        ra
    }
}
