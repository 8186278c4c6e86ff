//! Constellation regions and their containment rules.

use geo::{BoundingRect, MultiPolygon, Polygon, Rect};

use super::ring::ray_cast_inside;
use crate::models::SkyPoint;

/// Right-ascension offsets tried when a region may straddle the 0°/360° seam
pub const WRAP_OFFSETS: [f64; 3] = [0.0, 360.0, -360.0];

/// Boundary geometry of a region, decoded once when the catalogue is loaded
#[derive(Debug, Clone, PartialEq)]
pub enum RegionGeometry {
    Polygon(Polygon<f64>),
    MultiPolygon(MultiPolygon<f64>),
    /// Any other GeoJSON geometry (or a null one). Never contains a point.
    Unsupported { kind: String },
}

impl RegionGeometry {
    /// Whether `point` lies inside this geometry, taking coordinates as stored
    pub fn contains(&self, point: SkyPoint) -> bool {
        match self {
            RegionGeometry::Polygon(polygon) => polygon_contains(polygon, point),
            RegionGeometry::MultiPolygon(multi) => {
                multi.0.iter().any(|polygon| polygon_contains(polygon, point))
            }
            RegionGeometry::Unsupported { .. } => false,
        }
    }

    /// Containment at `ra`, `ra + 360` and `ra - 360`.
    ///
    /// Boundaries near the seam are stored with vertices past 360 or below 0,
    /// so a normalized right ascension alone can miss them.
    pub fn contains_wrapped(&self, point: SkyPoint) -> bool {
        WRAP_OFFSETS
            .iter()
            .any(|offset| self.contains(point.shifted(*offset)))
    }

    /// Bounding box of all rings, `None` for unsupported or empty geometry
    pub fn bbox(&self) -> Option<Rect<f64>> {
        match self {
            RegionGeometry::Polygon(polygon) => polygon.bounding_rect(),
            RegionGeometry::MultiPolygon(multi) => multi.bounding_rect(),
            RegionGeometry::Unsupported { .. } => None,
        }
    }

    /// GeoJSON type name of this geometry
    pub fn kind(&self) -> &str {
        match self {
            RegionGeometry::Polygon(_) => "Polygon",
            RegionGeometry::MultiPolygon(_) => "MultiPolygon",
            RegionGeometry::Unsupported { kind } => kind,
        }
    }
}

/// Inside the exterior ring and inside none of the holes
fn polygon_contains(polygon: &Polygon<f64>, point: SkyPoint) -> bool {
    if !ray_cast_inside(point, polygon.exterior()) {
        return false;
    }
    !polygon
        .interiors()
        .iter()
        .any(|hole| ray_cast_inside(point, hole))
}

/// A single named constellation boundary
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    /// IAU code from `properties.iau`
    pub iau: Option<String>,
    pub geometry: RegionGeometry,
}

impl Region {
    pub fn new(iau: impl Into<String>, geometry: RegionGeometry) -> Self {
        Self {
            iau: Some(iau.into()),
            geometry,
        }
    }
}

/// The full set of regions points are matched against.
///
/// Order is significant: on equal scores the earlier region wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalogue {
    pub regions: Vec<Region>,
}

impl Catalogue {
    pub fn new(regions: Vec<Region>) -> Self {
        Self { regions }
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Look up a region by IAU code
    pub fn get(&self, iau: &str) -> Option<&Region> {
        self.regions
            .iter()
            .find(|r| r.iau.as_deref() == Some(iau))
    }
}
