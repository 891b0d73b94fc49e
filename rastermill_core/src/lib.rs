//! Core types for tiled raster processing: pixel rectangles, sample-type tags,
//! band-sequential tiles, region-of-interest membership, no-data predicates and
//! a concurrent memoizing tile cache.

pub mod cache;

pub mod types;

#[cfg(feature = "test")]
pub mod fixtures;

pub use cache::TileCache;
pub use types::*;
