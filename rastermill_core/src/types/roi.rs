//! This module defines the region-of-interest representation: the
//! [`RoiMembership`] point test and [`RasterRoi`], a rasterized membership
//! backed by a single-band `u8` mask tile (nonzero means inside).
//!
//! [`PixelRect`] also implements [`RoiMembership`], so a plain rectangle can
//! serve as an ROI directly.

use crate::types::{PixelRect, Tile};
use anyhow::{Result, ensure};

/// Point-membership test of a region of interest.
///
/// Coordinates outside [`RoiMembership::bounds`] are never inside the region.
pub trait RoiMembership: Send + Sync {
	fn bounds(&self) -> PixelRect;

	fn contains(&self, x: i64, y: i64) -> bool;
}

impl RoiMembership for PixelRect {
	fn bounds(&self) -> PixelRect {
		*self
	}

	fn contains(&self, x: i64, y: i64) -> bool {
		PixelRect::contains(self, x, y)
	}
}

/// Rasterized region of interest: a single-band `u8` mask where nonzero
/// samples are inside the region.
#[derive(Clone, Debug)]
pub struct RasterRoi {
	mask: Tile<u8>,
}

impl RasterRoi {
	pub fn new(mask: Tile<u8>) -> Result<RasterRoi> {
		ensure!(mask.bands() == 1, "an ROI mask must have exactly one band, got {}", mask.bands());
		Ok(RasterRoi { mask })
	}

	/// Rasterizes a membership function over `rect`.
	pub fn from_fn(rect: PixelRect, f: impl Fn(i64, i64) -> bool) -> RasterRoi {
		RasterRoi {
			mask: Tile::from_fn(rect, 1, |x, y, _| u8::from(f(x, y))),
		}
	}

	pub fn mask(&self) -> &Tile<u8> {
		&self.mask
	}
}

impl RoiMembership for RasterRoi {
	fn bounds(&self) -> PixelRect {
		*self.mask.rect()
	}

	fn contains(&self, x: i64, y: i64) -> bool {
		self.mask.rect().contains(x, y) && self.mask.sample(x, y, 0) != 0
	}
}
