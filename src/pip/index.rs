//! Spatial index for fast region candidate lookups.

use hashbrown::HashSet;
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::info;

use super::region::{Catalogue, Region, WRAP_OFFSETS};
use crate::models::{GeoPoint, MatchResult, SkyPoint};

/// Wrapper for R-tree indexing of catalogue regions
#[derive(Clone)]
pub struct IndexedRegion {
    /// Position of the region in the catalogue
    pub position: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedRegion {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedRegion {
    pub fn new(position: usize, region: &Region) -> Option<Self> {
        let rect = region.geometry.bbox()?;
        Some(Self {
            position,
            envelope: AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
        })
    }
}

/// Spatial index over region bounding boxes using an R-tree.
///
/// A point outside a ring's bounding box can never pass the ray-cast test,
/// so filtering on boxes first gives the same answers as a full scan.
pub struct RegionIndex {
    tree: RTree<IndexedRegion>,
    catalogue: Arc<Catalogue>,
}

impl RegionIndex {
    /// Build spatial index from a loaded catalogue
    pub fn build(catalogue: Arc<Catalogue>) -> Self {
        info!("Building region index for {} regions...", catalogue.len());

        let indexed: Vec<IndexedRegion> = catalogue
            .regions
            .iter()
            .enumerate()
            .filter_map(|(position, region)| IndexedRegion::new(position, region))
            .collect();

        let tree = RTree::bulk_load(indexed);

        info!(
            "Region index built with {} entries ({} regions without usable geometry)",
            tree.size(),
            catalogue.len() - tree.size()
        );

        Self { tree, catalogue }
    }

    /// Catalogue positions of regions that contain the point as stored
    pub fn lookup(&self, point: SkyPoint) -> Vec<usize> {
        let query_envelope = AABB::from_point([point.ra, point.dec]);

        // Bounding boxes narrow the candidates, the ray-cast test decides
        self.tree
            .locate_in_envelope_intersecting(&query_envelope)
            .filter(|ir| self.catalogue.regions[ir.position].geometry.contains(point))
            .map(|ir| ir.position)
            .collect()
    }

    /// Catalogue positions of regions containing the point at any wrap offset
    pub fn lookup_wrapped(&self, point: SkyPoint) -> HashSet<usize> {
        WRAP_OFFSETS
            .iter()
            .flat_map(|offset| self.lookup(point.shifted(*offset)))
            .collect()
    }

    /// Same result as [`super::match_regions`], visiting only candidate regions
    pub fn best_match(&self, points: &[GeoPoint]) -> MatchResult {
        let mut counts = vec![0usize; self.catalogue.len()];
        for point in points {
            for position in self.lookup_wrapped(point.to_sky()) {
                counts[position] += 1;
            }
        }

        let mut best = MatchResult::empty(points.len());
        let total = best.total_points;
        for (position, inside) in counts.into_iter().enumerate() {
            let score = inside as f64 / total as f64;
            if score > best.score {
                best = MatchResult {
                    iau: self.catalogue.regions[position].iau.clone(),
                    score,
                    inside,
                    total_points: total,
                };
            }
        }
        best
    }

    /// The catalogue this index was built from
    pub fn catalogue(&self) -> &Arc<Catalogue> {
        &self.catalogue
    }

    /// Get total number of indexed regions
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::super::region::test_support::{rect, rect_ring};
    use super::super::region::RegionGeometry;
    use super::super::scorer::match_regions;
    use super::*;
    use geo::{MultiPolygon, Polygon};

    fn catalogue() -> Catalogue {
        Catalogue::new(vec![
            Region::new(
                "HOL",
                RegionGeometry::Polygon(Polygon::new(
                    rect_ring(0.0, -10.0, 20.0, 10.0),
                    vec![rect_ring(5.0, -2.0, 15.0, 2.0)],
                )),
            ),
            Region::new(
                "SEA",
                RegionGeometry::Polygon(rect(340.0, -20.0, 375.0, 20.0)),
            ),
            Region::new(
                "DUP",
                RegionGeometry::MultiPolygon(MultiPolygon::new(vec![
                    rect(100.0, 0.0, 110.0, 10.0),
                    rect(200.0, 0.0, 210.0, 10.0),
                ])),
            ),
            Region::new(
                "NIL",
                RegionGeometry::Unsupported {
                    kind: "Point".to_string(),
                },
            ),
            Region::new("TIE", RegionGeometry::Polygon(rect(100.0, 0.0, 110.0, 10.0))),
        ])
    }

    #[test]
    fn test_unusable_geometry_not_indexed() {
        let index = RegionIndex::build(Arc::new(catalogue()));
        assert_eq!(index.len(), 4);
        assert!(!index.is_empty());
        assert_eq!(index.catalogue().len(), 5);
    }

    #[test]
    fn test_lookup_respects_holes() {
        let index = RegionIndex::build(Arc::new(catalogue()));
        assert!(index.lookup(SkyPoint::new(10.0, 0.0)).is_empty());
        assert_eq!(index.lookup(SkyPoint::new(10.0, 5.0)), vec![0]);
    }

    #[test]
    fn test_wrapped_point_counted_once() {
        // SEA holds ra 350 as stored; the shifted copies fall outside everything
        let index = RegionIndex::build(Arc::new(catalogue()));
        let hits = index.lookup_wrapped(SkyPoint::new(350.0, 0.0));
        assert_eq!(hits.len(), 1);
        assert!(hits.contains(&1));

        let hits = index.lookup_wrapped(SkyPoint::new(10.0, 15.0));
        assert!(hits.contains(&1));
    }

    #[test]
    fn test_matches_full_scan() {
        let catalogue = catalogue();
        let index = RegionIndex::build(Arc::new(catalogue.clone()));

        let tracks: Vec<Vec<GeoPoint>> = vec![
            vec![],
            vec![GeoPoint::new(0.0, 10.0)],
            vec![GeoPoint::new(5.0, 10.0), GeoPoint::new(0.0, -10.0)],
            vec![GeoPoint::new(5.0, 105.0), GeoPoint::new(5.0, -155.0)],
            vec![GeoPoint::new(5.0, 105.0), GeoPoint::new(80.0, 0.0)],
            vec![
                GeoPoint::new(15.0, 5.0),
                GeoPoint::new(15.0, -5.0),
                GeoPoint::new(-15.0, 12.0),
            ],
        ];

        for points in &tracks {
            assert_eq!(index.best_match(points), match_regions(points, &catalogue));
        }
    }

    #[test]
    fn test_tie_uses_catalogue_order() {
        let index = RegionIndex::build(Arc::new(catalogue()));
        let result = index.best_match(&[GeoPoint::new(5.0, 105.0)]);
        assert_eq!(result.iau.as_deref(), Some("DUP"));
        assert_eq!(result.score, 1.0);
    }
}
