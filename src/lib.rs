//! Asterism - matches recorded activity tracks to IAU constellations
//!
//! This library provides shared types and modules for the matcher, convert
//! and serve binaries.

pub mod catalog;
pub mod config;
pub mod models;
pub mod pip;
pub mod track;

pub use models::{GeoPoint, MatchResult, SkyPoint};
pub use pip::{match_regions, Catalogue, MatchService, Region, RegionGeometry, RegionIndex};
