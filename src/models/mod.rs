//! Core data models shared by the matcher, ingestion and binaries.

pub mod matching;
pub mod point;

pub use matching::MatchResult;
pub use point::{normalize_ra, GeoPoint, SkyPoint};
