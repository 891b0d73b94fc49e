//! Tile builders for tests. Only available with the `test` feature.
//!
//! The builders synthesize source tiles in any of the six sample types from
//! `f64` seed values, so test scenarios can run the same assertions across the
//! whole type matrix.

use crate::types::{PixelRect, RasterRoi, Sample, Tile};

/// A tile with every sample set to `value` (saturating per sample type).
pub fn constant_tile<T: Sample>(rect: PixelRect, bands: usize, value: f64) -> Tile<T> {
	Tile::from_fn(rect, bands, |_, _, _| T::from_f64_lossy(value))
}

/// A deterministic gradient whose values stay within `0..=66`, so every sample
/// type represents them exactly.
pub fn gradient_tile<T: Sample>(rect: PixelRect, bands: usize) -> Tile<T> {
	Tile::from_fn(rect, bands, |x, y, band| {
		T::from_f64_lossy((((x * 3 + y * 5).rem_euclid(64)) + band as i64) as f64)
	})
}

/// A constant tile with `sentinel` placed on every pixel where `(x + y)` is
/// divisible by three.
pub fn speckled_tile<T: Sample>(rect: PixelRect, bands: usize, value: f64, sentinel: f64) -> Tile<T> {
	Tile::from_fn(rect, bands, |x, y, _| {
		if (x + y).rem_euclid(3) == 0 {
			T::from_f64_lossy(sentinel)
		} else {
			T::from_f64_lossy(value)
		}
	})
}

/// A rasterized ROI covering the half-plane left of `split_x` within `rect`.
pub fn half_plane_roi(rect: PixelRect, split_x: i64) -> RasterRoi {
	RasterRoi::from_fn(rect, |x, _| x < split_x)
}
