//! Match service for finding the constellation a track falls in.

use tracing::debug;

use super::RegionIndex;
use crate::models::{GeoPoint, MatchResult};
use crate::track::ActivityTrack;

/// Constellation lookup service
pub struct MatchService {
    index: RegionIndex,
}

impl MatchService {
    /// Create a new match service from a region index
    pub fn new(index: RegionIndex) -> Self {
        Self { index }
    }

    /// Find the region containing the largest share of `points`
    pub fn best_match(&self, points: &[GeoPoint]) -> MatchResult {
        let result = self.index.best_match(points);

        debug!(
            "Matched {} points: {:?} ({}/{} inside, score {:.3})",
            points.len(),
            result.iau,
            result.inside,
            result.total_points,
            result.score
        );

        result
    }

    /// Match the decoded ground track of an activity
    pub fn match_track(&self, track: &ActivityTrack) -> MatchResult {
        debug!("Matching activity {} ({})", track.id, track.label);
        self.best_match(&track.points)
    }

    /// Get the region index (for stats/debugging)
    pub fn index(&self) -> &RegionIndex {
        &self.index
    }
}
