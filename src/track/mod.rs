//! Track ingestion: turns activity feeds into point sequences for matching.

mod activity;
mod polyline;

use std::path::PathBuf;
use thiserror::Error;

pub use activity::{load_activities, parse_activities, ActivityTrack};
pub use polyline::decode_polyline;

/// Errors raised while reading activity feeds and polylines
#[derive(Debug, Error)]
pub enum TrackError {
    #[error("failed to read activity feed {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("activity feed is empty")]
    EmptyFeed,

    #[error("invalid activity feed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("polyline ends in the middle of a value at byte {position}")]
    TruncatedPolyline { position: usize },

    #[error("invalid polyline character {ch:?} at byte {position}")]
    InvalidPolylineChar { ch: char, position: usize },

    #[error("polyline value too long at byte {position}")]
    PolylineOverflow { position: usize },
}
