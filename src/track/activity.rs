//! Activity feed parsing.

use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use super::polyline::decode_polyline;
use super::TrackError;
use crate::models::GeoPoint;

/// A recorded activity reduced to its decoded ground track
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityTrack {
    /// Position of the activity in the feed
    pub index: usize,
    /// Activity ID, or the feed position when the activity has none
    pub id: i64,
    /// Human-readable label (start time, or "Activity {index}")
    pub label: String,
    pub points: Vec<GeoPoint>,
}

#[derive(Debug, Deserialize)]
struct RawActivity {
    id: Option<i64>,
    start_date_local: Option<String>,
    map: Option<RawActivityMap>,
}

#[derive(Debug, Deserialize)]
struct RawActivityMap {
    summary_polyline: Option<String>,
}

/// Parse an activity feed (a JSON array of activities) into tracks.
///
/// Activities without a summary polyline are skipped. A feed that parses
/// but is not an array yields no tracks.
pub fn parse_activities(text: &str) -> Result<Vec<ActivityTrack>, TrackError> {
    if text.trim().is_empty() {
        return Err(TrackError::EmptyFeed);
    }

    let value: serde_json::Value = serde_json::from_str(text)?;
    let serde_json::Value::Array(items) = value else {
        warn!("Activity feed is not an array, ignoring it");
        return Ok(Vec::new());
    };

    let mut tracks = Vec::new();
    for (index, item) in items.into_iter().enumerate() {
        let activity: RawActivity = match serde_json::from_value(item) {
            Ok(a) => a,
            Err(e) => {
                warn!("Skipping malformed activity {}: {}", index, e);
                continue;
            }
        };

        let polyline = match activity.map.and_then(|m| m.summary_polyline) {
            Some(p) if !p.is_empty() => p,
            _ => {
                debug!("Activity {} has no polyline", index);
                continue;
            }
        };

        let points = match decode_polyline(&polyline) {
            Ok(p) => p,
            Err(e) => {
                warn!("Skipping activity {}: {}", index, e);
                continue;
            }
        };

        let label = activity
            .start_date_local
            .as_deref()
            .and_then(format_start_date)
            .unwrap_or_else(|| format!("Activity {}", index));

        tracks.push(ActivityTrack {
            index,
            id: activity.id.unwrap_or(index as i64),
            label,
            points,
        });
    }

    Ok(tracks)
}

/// Load and parse an activity feed from disk
pub fn load_activities<P: AsRef<Path>>(path: P) -> Result<Vec<ActivityTrack>, TrackError> {
    let path = path.as_ref();
    info!("Loading activities from {}", path.display());

    let text = fs::read_to_string(path).map_err(|source| TrackError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let tracks = parse_activities(&text)?;

    info!("Loaded {} activity tracks", tracks.len());
    Ok(tracks)
}

/// Format a feed timestamp as wall-clock time.
///
/// Feeds write local times with a `Z` suffix, so the offset is ignored.
fn format_start_date(raw: &str) -> Option<String> {
    let naive = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.naive_local())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .ok()?;
    Some(naive.format("%Y-%m-%d %H:%M").to_string())
}
