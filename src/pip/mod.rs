//! Point-in-polygon constellation matching.
//!
//! Reinterprets track points as right ascension/declination and finds the
//! constellation boundary that contains the largest share of them, looking
//! across the 0°/360° seam.

mod index;
mod region;
mod ring;
mod scorer;
mod service;

pub use index::RegionIndex;
pub use region::{Catalogue, Region, RegionGeometry, WRAP_OFFSETS};
pub use ring::ray_cast_inside;
pub use scorer::match_regions;
pub use service::MatchService;
