//! Conversion of the IAU constellation boundary listing into GeoJSON.
//!
//! The listing has one vertex per line: right ascension in hours,
//! declination in degrees, then the codes of every constellation the vertex
//! belongs to.

use geo::{Area, Buffer, LineString, Polygon, Validation};
use hashbrown::HashMap;
use std::io::{BufRead, Write};
use tracing::{debug, info, warn};

use super::geojson::{FeatureCollectionOut, FeatureOut, GeometryOut};
use super::CatalogError;

/// Degrees of right ascension per hour
const DEGREES_PER_HOUR: f64 = 15.0;

/// Boundary vertices grouped by constellation, in first-seen order
#[derive(Debug, Default)]
pub struct BoundarySet {
    names: HashMap<String, usize>,
    boundaries: Vec<(String, Vec<[f64; 2]>)>,
}

impl BoundarySet {
    fn push(&mut self, name: &str, point: [f64; 2]) {
        let idx = match self.names.get(name) {
            Some(&idx) => idx,
            None => {
                self.boundaries.push((name.to_string(), Vec::new()));
                self.names.insert(name.to_string(), self.boundaries.len() - 1);
                self.boundaries.len() - 1
            }
        };
        self.boundaries[idx].1.push(point);
    }

    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Vertices collected for a constellation
    pub fn points(&self, name: &str) -> Option<&[[f64; 2]]> {
        self.names
            .get(name)
            .map(|&idx| self.boundaries[idx].1.as_slice())
    }

    /// Build one closed polygon feature per constellation.
    ///
    /// Consecutive duplicate vertices are dropped. Self-intersecting rings are
    /// repaired with a zero-width buffer, which may split them into a
    /// MultiPolygon. Constellations with fewer than three distinct vertices,
    /// a ring that stays invalid, or zero area are skipped.
    pub fn into_features(self) -> Vec<FeatureOut> {
        let mut features = Vec::with_capacity(self.boundaries.len());

        for (name, points) in self.boundaries {
            if points.len() < 3 {
                warn!("Skipping {}: fewer than 3 points ({})", name, points.len());
                continue;
            }

            let mut ring: Vec<[f64; 2]> = Vec::with_capacity(points.len() + 1);
            for point in points {
                if ring.last() != Some(&point) {
                    ring.push(point);
                }
            }

            if ring.len() < 3 {
                warn!("Skipping {}: fewer than 3 points after dedupe", name);
                continue;
            }

            if ring.first() != ring.last() {
                ring.push(ring[0]);
            }

            let polygon = Polygon::new(
                LineString::from(ring.iter().map(|p| (p[0], p[1])).collect::<Vec<_>>()),
                vec![],
            );

            if polygon.is_valid() {
                if polygon.unsigned_area() == 0.0 {
                    warn!("Skipping {}: zero area", name);
                    continue;
                }
                features.push(FeatureOut::polygon(&name, ring));
                continue;
            }

            let repaired = polygon.buffer(0.0);
            if repaired.0.is_empty()
                || !repaired.is_valid()
                || repaired.unsigned_area() == 0.0
            {
                warn!("Skipping {}: invalid polygon or zero area", name);
                continue;
            }
            debug!("Repaired {} into {} polygon(s)", name, repaired.0.len());
            features.push(FeatureOut::new(
                &name,
                GeometryOut::from_multi_polygon(&repaired),
            ));
        }

        features
    }
}

/// Parse a boundary listing.
///
/// Blank lines, lines with fewer than three fields and lines whose
/// coordinates don't parse are skipped.
pub fn parse_boundaries<R: BufRead>(reader: R) -> Result<BoundarySet, CatalogError> {
    let mut set = BoundarySet::default();
    let mut skipped = 0;

    for line in reader.lines() {
        let line = line.map_err(CatalogError::Read)?;
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 3 {
            continue;
        }

        let (ra_hours, dec) = match (parts[0].parse::<f64>(), parts[1].parse::<f64>()) {
            (Ok(ra), Ok(dec)) => (ra, dec),
            _ => {
                skipped += 1;
                continue;
            }
        };

        let point = [ra_hours * DEGREES_PER_HOUR, dec];
        for name in &parts[2..] {
            set.push(name, point);
        }
    }

    info!(
        "Parsed boundaries for {} constellations ({} unparseable lines)",
        set.len(),
        skipped
    );
    Ok(set)
}

/// Write features as a pretty-printed GeoJSON FeatureCollection
pub fn write_feature_collection<W: Write>(
    features: Vec<FeatureOut>,
    writer: W,
) -> Result<(), CatalogError> {
    let collection = FeatureCollectionOut::new(features);
    serde_json::to_writer_pretty(writer, &collection)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SkyPoint;
    use crate::pip::{Catalogue, RegionGeometry};

    const LISTING: &str = "\
22.0 +10.0 AAA
23.0 +10.0 AAA BBB
23.0 +10.0 AAA

23.0 +20.0 AAA BBB
22.0 +20.0 AAA
x.y 5 AAA
1.0 2.0
23.0 +20.0 BBB
1.0 1.0 CCC
2.0 2.0 CCC
3.0 3.0 CCC
5.0 5.0 DDD
5.0 5.0 DDD
6.0 6.0 DDD
";

    #[test]
    fn test_parse_groups_by_name() {
        let set = parse_boundaries(LISTING.as_bytes()).unwrap();
        assert_eq!(set.len(), 4);
        assert_eq!(set.points("AAA").unwrap().len(), 5);
        assert_eq!(set.points("AAA").unwrap()[0], [330.0, 10.0]);
        assert_eq!(set.points("BBB").unwrap().len(), 3);
    }

    #[test]
    fn test_features_skip_degenerate() {
        let features = parse_boundaries(LISTING.as_bytes())
            .unwrap()
            .into_features();
        let names: Vec<&str> = features
            .iter()
            .map(|f| f.properties.iau.as_str())
            .collect();
        // BBB and DDD dedupe to two points, CCC is collinear
        assert_eq!(names, vec!["AAA"]);

        let GeometryOut::Polygon { coordinates } = &features[0].geometry else {
            panic!("expected a polygon, got {:?}", features[0].geometry);
        };
        let ring = &coordinates[0];
        assert_eq!(ring.len(), 5);
        assert_eq!(ring.first(), ring.last());
    }

    #[test]
    fn test_bow_tie_repaired() {
        // Edges (0,0)-(15,10) and (15,0)-(0,10) cross at (7.5, 5)
        let listing = "0.0 0.0 BOW\n1.0 10.0 BOW\n1.0 0.0 BOW\n0.0 10.0 BOW\n";
        let set = parse_boundaries(listing.as_bytes()).unwrap();

        let bow_tie = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (15.0, 10.0), (15.0, 0.0), (0.0, 10.0)]),
            vec![],
        );
        assert!(!bow_tie.is_valid());

        let features = set.into_features();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].properties.iau, "BOW");

        let mut out = Vec::new();
        write_feature_collection(features, &mut out).unwrap();
        let catalogue = Catalogue::from_bytes(&out).unwrap();
        match &catalogue.regions[0].geometry {
            RegionGeometry::Polygon(p) => {
                assert!(p.is_valid());
                assert!(p.unsigned_area() > 0.0);
            }
            RegionGeometry::MultiPolygon(m) => {
                assert!(m.is_valid());
                assert!(m.unsigned_area() > 0.0);
            }
            other => panic!("unexpected geometry {:?}", other),
        }
    }

    #[test]
    fn test_round_trip_into_catalogue() {
        let features = parse_boundaries(LISTING.as_bytes())
            .unwrap()
            .into_features();
        let mut out = Vec::new();
        write_feature_collection(features, &mut out).unwrap();

        let catalogue = Catalogue::from_bytes(&out).unwrap();
        let aaa = catalogue.get("AAA").unwrap();
        assert!(aaa.geometry.contains(SkyPoint::new(340.0, 15.0)));
        assert!(!aaa.geometry.contains(SkyPoint::new(320.0, 15.0)));
    }
}
