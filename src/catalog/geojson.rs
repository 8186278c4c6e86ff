//! GeoJSON decoding of constellation catalogues.

use flate2::read::GzDecoder;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, warn};

use super::CatalogError;
use crate::pip::{Catalogue, Region, RegionGeometry};

/// First two bytes of every gzip stream
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Deserialize)]
struct RawFeatureCollection {
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    properties: Option<serde_json::Map<String, serde_json::Value>>,
    #[serde(default)]
    geometry: Option<RawGeometry>,
}

#[derive(Debug, Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    coordinates: serde_json::Value,
}

type RawRing = Vec<Vec<f64>>;

impl Catalogue {
    /// Parse a GeoJSON FeatureCollection.
    ///
    /// Polygon and MultiPolygon geometries are decoded into `geo` types here,
    /// anything else is kept as [`RegionGeometry::Unsupported`].
    pub fn from_geojson_str(text: &str) -> Result<Self, CatalogError> {
        let collection: RawFeatureCollection = serde_json::from_str(text)?;

        let mut regions = Vec::with_capacity(collection.features.len());
        for (idx, feature) in collection.features.into_iter().enumerate() {
            let iau = match feature.properties.as_ref().and_then(|p| p.get("iau")) {
                Some(serde_json::Value::String(code)) => Some(code.clone()),
                None | Some(serde_json::Value::Null) => None,
                Some(other) => {
                    warn!(
                        "Feature {} has a non-string iau {}, it will match without a code",
                        idx, other
                    );
                    None
                }
            };

            let geometry = match feature.geometry {
                Some(raw) => decode_geometry(idx, raw)?,
                None => RegionGeometry::Unsupported {
                    kind: "null".to_string(),
                },
            };

            if let RegionGeometry::Unsupported { kind } = &geometry {
                debug!("Feature {} ({:?}) has unsupported geometry {}", idx, iau, kind);
            }

            regions.push(Region { iau, geometry });
        }

        Ok(Catalogue::new(regions))
    }

    /// Decode raw catalogue bytes, gunzipping them first if needed
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CatalogError> {
        if bytes.starts_with(&GZIP_MAGIC) {
            let mut text = String::new();
            GzDecoder::new(bytes)
                .read_to_string(&mut text)
                .map_err(CatalogError::Decompress)?;
            Self::from_geojson_str(&text)
        } else {
            let text = std::str::from_utf8(bytes).map_err(|_| CatalogError::NotUtf8)?;
            Self::from_geojson_str(text)
        }
    }

    /// Load a catalogue from a `.geojson` or gzipped file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        info!("Loading constellation catalogue from {}", path.display());

        let bytes = fs::read(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalogue = Self::from_bytes(&bytes)?;

        info!("Loaded {} regions", catalogue.len());
        Ok(catalogue)
    }
}

fn decode_geometry(feature: usize, raw: RawGeometry) -> Result<RegionGeometry, CatalogError> {
    let invalid = |source: serde_json::Error| CatalogError::InvalidGeometry {
        feature,
        kind: raw.kind.clone(),
        source,
    };

    match raw.kind.as_str() {
        "Polygon" => {
            let rings: Vec<RawRing> =
                serde_json::from_value(raw.coordinates.clone()).map_err(invalid)?;
            Ok(RegionGeometry::Polygon(to_polygon(feature, rings)?))
        }
        "MultiPolygon" => {
            let polygons: Vec<Vec<RawRing>> =
                serde_json::from_value(raw.coordinates.clone()).map_err(invalid)?;
            let polygons = polygons
                .into_iter()
                .map(|rings| to_polygon(feature, rings))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(RegionGeometry::MultiPolygon(MultiPolygon::new(polygons)))
        }
        _ => Ok(RegionGeometry::Unsupported {
            kind: raw.kind.clone(),
        }),
    }
}

/// First ring is the exterior, the rest are holes
fn to_polygon(feature: usize, rings: Vec<RawRing>) -> Result<Polygon<f64>, CatalogError> {
    let mut rings = rings
        .into_iter()
        .map(|ring| to_line_string(feature, ring))
        .collect::<Result<Vec<_>, _>>()?;

    if rings.is_empty() {
        return Ok(Polygon::new(LineString::new(vec![]), vec![]));
    }
    let exterior = rings.remove(0);
    Ok(Polygon::new(exterior, rings))
}

fn to_line_string(feature: usize, ring: RawRing) -> Result<LineString<f64>, CatalogError> {
    let coords = ring
        .into_iter()
        .map(|position| match position.as_slice() {
            // Extra values (altitude) are ignored
            [x, y, ..] => Ok(Coord { x: *x, y: *y }),
            _ => Err(CatalogError::InvalidPosition {
                feature,
                len: position.len(),
            }),
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(LineString::new(coords))
}

/// GeoJSON FeatureCollection as written by the boundary converter
#[derive(Debug, Clone, Serialize)]
pub struct FeatureCollectionOut {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub features: Vec<FeatureOut>,
}

impl FeatureCollectionOut {
    pub fn new(features: Vec<FeatureOut>) -> Self {
        Self {
            kind: "FeatureCollection",
            features,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureOut {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub properties: PropertiesOut,
    pub geometry: GeometryOut,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertiesOut {
    pub iau: String,
}

type RingOut = Vec<[f64; 2]>;

/// Polygon or MultiPolygon geometry, tagged with its GeoJSON type
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum GeometryOut {
    Polygon { coordinates: Vec<RingOut> },
    MultiPolygon { coordinates: Vec<Vec<RingOut>> },
}

impl GeometryOut {
    /// A single polygon is written as `Polygon`, anything else as `MultiPolygon`
    pub fn from_multi_polygon(multi: &MultiPolygon<f64>) -> Self {
        match multi.0.as_slice() {
            [polygon] => GeometryOut::Polygon {
                coordinates: polygon_rings(polygon),
            },
            polygons => GeometryOut::MultiPolygon {
                coordinates: polygons.iter().map(polygon_rings).collect(),
            },
        }
    }
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<RingOut> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(|ring| ring.coords().map(|c| [c.x, c.y]).collect())
        .collect()
}

impl FeatureOut {
    pub fn new(iau: &str, geometry: GeometryOut) -> Self {
        Self {
            kind: "Feature",
            properties: PropertiesOut {
                iau: iau.to_string(),
            },
            geometry,
        }
    }

    /// Single-ring polygon feature
    pub fn polygon(iau: &str, ring: RingOut) -> Self {
        Self::new(
            iau,
            GeometryOut::Polygon {
                coordinates: vec![ring],
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkyPoint;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    const CATALOGUE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": { "iau": "SQR" },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [
                        [[0, 0], [10, 0], [10, 10], [0, 10], [0, 0]],
                        [[4, 4], [6, 4], [6, 6], [4, 6], [4, 4]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "iau": "TWO" },
                "geometry": {
                    "type": "MultiPolygon",
                    "coordinates": [
                        [[[20, 0, 5], [30, 0, 5], [30, 10, 5], [20, 10, 5]]],
                        [[[40, 0], [50, 0], [50, 10], [40, 10]]]
                    ]
                }
            },
            {
                "type": "Feature",
                "properties": { "iau": "PNT" },
                "geometry": { "type": "Point", "coordinates": [1, 2] }
            },
            { "type": "Feature", "properties": null, "geometry": null }
        ]
    }"#;

    #[test]
    fn test_decode_catalogue() {
        let catalogue = Catalogue::from_geojson_str(CATALOGUE).unwrap();
        assert_eq!(catalogue.len(), 4);

        let sqr = &catalogue.regions[0];
        assert_eq!(sqr.iau.as_deref(), Some("SQR"));
        assert!(matches!(&sqr.geometry, RegionGeometry::Polygon(p) if p.interiors().len() == 1));
        assert!(sqr.geometry.contains(SkyPoint::new(1.0, 1.0)));
        assert!(!sqr.geometry.contains(SkyPoint::new(5.0, 5.0)));

        let two = &catalogue.regions[1];
        assert!(matches!(&two.geometry, RegionGeometry::MultiPolygon(m) if m.0.len() == 2));
        assert!(two.geometry.contains(SkyPoint::new(45.0, 5.0)));

        assert_eq!(catalogue.regions[2].geometry.kind(), "Point");
        assert!(catalogue.regions[3].iau.is_none());
        assert_eq!(catalogue.regions[3].geometry.kind(), "null");
    }

    #[test]
    fn test_short_position_rejected() {
        let text = r#"{"features": [{"properties": {"iau": "BAD"},
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1], [1, 1]]]}}]}"#;
        let err = Catalogue::from_geojson_str(text).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidPosition { feature: 0, len: 1 }));
    }

    #[test]
    fn test_wrong_nesting_rejected() {
        let text = r#"{"features": [{"properties": {"iau": "BAD"},
            "geometry": {"type": "MultiPolygon", "coordinates": [[0, 0], [1, 1]]}}]}"#;
        let err = Catalogue::from_geojson_str(text).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidGeometry { feature: 0, .. }));
    }

    #[test]
    fn test_empty_polygon_contains_nothing() {
        let text = r#"{"features": [{"properties": {"iau": "NIL"},
            "geometry": {"type": "Polygon", "coordinates": []}}]}"#;
        let catalogue = Catalogue::from_geojson_str(text).unwrap();
        assert!(!catalogue.regions[0].geometry.contains(SkyPoint::new(0.0, 0.0)));
        assert!(catalogue.regions[0].geometry.bbox().is_none());
    }

    #[test]
    fn test_non_string_iau_dropped() {
        let text = r#"{"features": [{"properties": {"iau": 42},
            "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1]]]}}]}"#;
        let catalogue = Catalogue::from_geojson_str(text).unwrap();
        assert_eq!(catalogue.len(), 1);
        assert!(catalogue.regions[0].iau.is_none());
        assert!(catalogue.regions[0].geometry.contains(SkyPoint::new(0.5, 0.5)));
    }

    #[test]
    fn test_multi_polygon_out() {
        let single = MultiPolygon::new(vec![Polygon::new(
            LineString::from(vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]),
            vec![],
        )]);
        assert!(matches!(
            GeometryOut::from_multi_polygon(&single),
            GeometryOut::Polygon { coordinates } if coordinates.len() == 1 && coordinates[0].len() == 4
        ));

        let mut split = single.clone();
        split.0.push(Polygon::new(
            LineString::from(vec![(5.0, 5.0), (6.0, 5.0), (6.0, 6.0)]),
            vec![],
        ));
        let collection = FeatureCollectionOut::new(vec![FeatureOut::new(
            "SPL",
            GeometryOut::from_multi_polygon(&split),
        )]);
        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json["features"][0]["geometry"]["type"], "MultiPolygon");

        let catalogue = Catalogue::from_geojson_str(&json.to_string()).unwrap();
        assert!(matches!(&catalogue.regions[0].geometry, RegionGeometry::MultiPolygon(m) if m.0.len() == 2));
    }

    #[test]
    fn test_empty_collection() {
        let catalogue = Catalogue::from_geojson_str(r#"{"features": []}"#).unwrap();
        assert!(catalogue.is_empty());
    }

    #[test]
    fn test_gzip_bytes() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(CATALOGUE.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let catalogue = Catalogue::from_bytes(&compressed).unwrap();
        assert_eq!(catalogue.len(), 4);
    }

    #[test]
    fn test_write_feature_out() {
        let collection = FeatureCollectionOut::new(vec![FeatureOut::polygon(
            "AND",
            vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 0.0]],
        )]);
        let text = serde_json::to_string(&collection).unwrap();
        let catalogue = Catalogue::from_geojson_str(&text).unwrap();
        assert_eq!(catalogue.regions[0].iau.as_deref(), Some("AND"));
    }
}
