//! Constellation catalogue loading, caching and conversion.

mod boundary;
mod cache;
mod geojson;

use std::path::PathBuf;
use thiserror::Error;

pub use boundary::{parse_boundaries, write_feature_collection, BoundarySet};
pub use cache::{CatalogCache, CatalogSource};
pub use geojson::{FeatureCollectionOut, FeatureOut, GeometryOut, PropertiesOut};

/// Errors raised while loading or converting a catalogue.
///
/// A catalogue that loads fine but has no features is not an error.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalogue {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read boundary listing: {0}")]
    Read(#[source] std::io::Error),

    #[error("failed to decompress catalogue: {0}")]
    Decompress(#[source] std::io::Error),

    #[error("catalogue is not valid UTF-8")]
    NotUtf8,

    #[error("catalogue request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("catalogue request to {url} returned HTTP {status}")]
    HttpStatus { url: String, status: u16 },

    #[error("invalid catalogue JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("feature {feature} has a {kind} geometry with malformed coordinates: {source}")]
    InvalidGeometry {
        feature: usize,
        kind: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("feature {feature} has a position with {len} values, expected at least 2")]
    InvalidPosition { feature: usize, len: usize },

    #[error("catalogue load task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
