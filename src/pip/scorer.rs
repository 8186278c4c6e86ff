//! Best-match scoring of a point sequence against a catalogue.

use super::region::Catalogue;
use crate::models::{GeoPoint, MatchResult, SkyPoint};

/// Find the region containing the largest fraction of `points`.
///
/// Every region is scored as `inside / max(points.len(), 1)` in catalogue
/// order, and a region only replaces the current best on a strictly higher
/// score, so the first region to reach the top score wins.
pub fn match_regions(points: &[GeoPoint], catalogue: &Catalogue) -> MatchResult {
    let sky: Vec<SkyPoint> = points.iter().map(|p| p.to_sky()).collect();
    let mut best = MatchResult::empty(points.len());
    let total = best.total_points;

    for region in &catalogue.regions {
        let inside = sky
            .iter()
            .filter(|p| region.geometry.contains_wrapped(**p))
            .count();
        let score = inside as f64 / total as f64;

        if score > best.score {
            best = MatchResult {
                iau: region.iau.clone(),
                score,
                inside,
                total_points: total,
            };
        }
    }

    best
}
