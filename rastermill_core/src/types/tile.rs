//! This module defines [`Tile`], the owned per-band sample storage for one pixel
//! rectangle, and [`TileData`], its type-erased counterpart covering the six
//! supported sample types.
//!
//! A tile stores `bands` parallel sample planes band-sequentially in one vector.
//! Every plane is addressed with a pixel stride of 1 and a row stride equal to
//! the rectangle width; kernels that walk raw planes obtain them via
//! [`Tile::band`] and resolve coordinates against [`Tile::rect`].
//!
//! # Examples
//!
//! ```rust
//! use rastermill_core::{PixelRect, Tile, TileData};
//!
//! let tile = Tile::<u8>::from_fn(PixelRect::new(0, 0, 4, 4), 1, |x, y, _| (x + y) as u8);
//! assert_eq!(tile.sample(2, 1, 0), 3);
//!
//! let data = TileData::from(tile);
//! assert_eq!(data.sample_type(), rastermill_core::SampleType::U8);
//! ```

use crate::types::{PixelRect, SampleType};
use anyhow::{Result, ensure};
use num_traits::{Bounded, NumCast, ToPrimitive};
use std::fmt::Debug;

/// Element bound for tile sample planes.
///
/// Implemented exactly for the six types named by [`SampleType`]; the constant
/// ties the Rust type back to its tag.
pub trait Sample: Bounded + Copy + Debug + Default + NumCast + PartialEq + Send + Sync + ToPrimitive + 'static {
	const TYPE: SampleType;

	/// Widens the sample to `f64`. Exact for every supported type.
	fn as_f64(self) -> f64 {
		self.to_f64().unwrap_or(f64::NAN)
	}

	/// Narrows an `f64` to this sample type, saturating at the type bounds.
	/// A NaN that the type cannot represent becomes the default value.
	fn from_f64_lossy(value: f64) -> Self {
		if let Some(sample) = NumCast::from(value) {
			sample
		} else if value.is_nan() {
			Self::default()
		} else if value < 0.0 {
			Self::min_value()
		} else {
			Self::max_value()
		}
	}
}

impl Sample for u8 {
	const TYPE: SampleType = SampleType::U8;
}
impl Sample for u16 {
	const TYPE: SampleType = SampleType::U16;
}
impl Sample for i16 {
	const TYPE: SampleType = SampleType::I16;
}
impl Sample for i32 {
	const TYPE: SampleType = SampleType::I32;
}
impl Sample for f32 {
	const TYPE: SampleType = SampleType::F32;
}
impl Sample for f64 {
	const TYPE: SampleType = SampleType::F64;
}

/// Band-sequential sample planes over one pixel rectangle.
#[derive(Clone, PartialEq)]
pub struct Tile<T: Sample> {
	rect: PixelRect,
	bands: usize,
	data: Vec<T>,
}

impl<T: Sample> Tile<T> {
	/// Creates a tile filled with the default sample value.
	pub fn new(rect: PixelRect, bands: usize) -> Result<Tile<T>> {
		ensure!(bands >= 1, "a tile needs at least one band");
		Ok(Tile {
			rect,
			bands,
			data: vec![T::default(); rect.pixel_count() * bands],
		})
	}

	/// Creates a tile with every sample set to `value`.
	pub fn filled(rect: PixelRect, bands: usize, value: T) -> Result<Tile<T>> {
		let mut tile = Tile::new(rect, bands)?;
		tile.data.fill(value);
		Ok(tile)
	}

	/// Creates a tile by evaluating `f(x, y, band)` at every absolute coordinate.
	pub fn from_fn(rect: PixelRect, bands: usize, mut f: impl FnMut(i64, i64, usize) -> T) -> Tile<T> {
		assert!(bands >= 1, "a tile needs at least one band");
		let mut data = Vec::with_capacity(rect.pixel_count() * bands);
		for band in 0..bands {
			for y in rect.y..rect.y_max() {
				for x in rect.x..rect.x_max() {
					data.push(f(x, y, band));
				}
			}
		}
		Tile { rect, bands, data }
	}

	pub fn rect(&self) -> &PixelRect {
		&self.rect
	}

	pub fn bands(&self) -> usize {
		self.bands
	}

	/// Element distance between horizontally adjacent samples of one plane.
	pub fn pixel_stride(&self) -> usize {
		1
	}

	/// Element distance between vertically adjacent samples of one plane.
	pub fn row_stride(&self) -> usize {
		self.rect.width as usize
	}

	/// Read-only sample plane of one band.
	pub fn band(&self, band: usize) -> &[T] {
		let len = self.rect.pixel_count();
		&self.data[band * len..(band + 1) * len]
	}

	/// Mutable sample plane of one band.
	pub fn band_mut(&mut self, band: usize) -> &mut [T] {
		let len = self.rect.pixel_count();
		&mut self.data[band * len..(band + 1) * len]
	}

	pub fn sample(&self, x: i64, y: i64, band: usize) -> T {
		assert!(self.rect.contains(x, y), "pixel ({x}, {y}) is outside of {:?}", self.rect);
		let index = (y - self.rect.y) as usize * self.row_stride() + (x - self.rect.x) as usize;
		self.band(band)[index]
	}

	pub fn set_sample(&mut self, x: i64, y: i64, band: usize, value: T) {
		assert!(self.rect.contains(x, y), "pixel ({x}, {y}) is outside of {:?}", self.rect);
		let index = (y - self.rect.y) as usize * self.row_stride() + (x - self.rect.x) as usize;
		self.band_mut(band)[index] = value;
	}
}

impl<T: Sample> Debug for Tile<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Tile")
			.field("rect", &self.rect)
			.field("bands", &self.bands)
			.field("sample_type", &T::TYPE)
			.finish()
	}
}

/// Type-erased tile over the six supported sample types.
///
/// This is the dispatch seam between untyped API surfaces and code that is
/// generic over [`Sample`].
#[derive(Clone, Debug, PartialEq)]
pub enum TileData {
	U8(Tile<u8>),
	U16(Tile<u16>),
	I16(Tile<i16>),
	I32(Tile<i32>),
	F32(Tile<f32>),
	F64(Tile<f64>),
}

impl TileData {
	pub fn sample_type(&self) -> SampleType {
		match self {
			TileData::U8(_) => SampleType::U8,
			TileData::U16(_) => SampleType::U16,
			TileData::I16(_) => SampleType::I16,
			TileData::I32(_) => SampleType::I32,
			TileData::F32(_) => SampleType::F32,
			TileData::F64(_) => SampleType::F64,
		}
	}

	pub fn rect(&self) -> &PixelRect {
		match self {
			TileData::U8(t) => t.rect(),
			TileData::U16(t) => t.rect(),
			TileData::I16(t) => t.rect(),
			TileData::I32(t) => t.rect(),
			TileData::F32(t) => t.rect(),
			TileData::F64(t) => t.rect(),
		}
	}

	pub fn bands(&self) -> usize {
		match self {
			TileData::U8(t) => t.bands(),
			TileData::U16(t) => t.bands(),
			TileData::I16(t) => t.bands(),
			TileData::I32(t) => t.bands(),
			TileData::F32(t) => t.bands(),
			TileData::F64(t) => t.bands(),
		}
	}

	/// Reads one sample widened to `f64`. Exact for every sample type.
	pub fn sample_as_f64(&self, x: i64, y: i64, band: usize) -> f64 {
		match self {
			TileData::U8(t) => t.sample(x, y, band).as_f64(),
			TileData::U16(t) => t.sample(x, y, band).as_f64(),
			TileData::I16(t) => t.sample(x, y, band).as_f64(),
			TileData::I32(t) => t.sample(x, y, band).as_f64(),
			TileData::F32(t) => t.sample(x, y, band).as_f64(),
			TileData::F64(t) => t.sample(x, y, band).as_f64(),
		}
	}
}

impl From<Tile<u8>> for TileData {
	fn from(tile: Tile<u8>) -> TileData {
		TileData::U8(tile)
	}
}
impl From<Tile<u16>> for TileData {
	fn from(tile: Tile<u16>) -> TileData {
		TileData::U16(tile)
	}
}
impl From<Tile<i16>> for TileData {
	fn from(tile: Tile<i16>) -> TileData {
		TileData::I16(tile)
	}
}
impl From<Tile<i32>> for TileData {
	fn from(tile: Tile<i32>) -> TileData {
		TileData::I32(tile)
	}
}
impl From<Tile<f32>> for TileData {
	fn from(tile: Tile<f32>) -> TileData {
		TileData::F32(tile)
	}
}
impl From<Tile<f64>> for TileData {
	fn from(tile: Tile<f64>) -> TileData {
		TileData::F64(tile)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn new_is_zeroed() {
		let tile = Tile::<i16>::new(PixelRect::new(3, -2, 4, 2), 2).unwrap();
		assert_eq!(tile.bands(), 2);
		assert_eq!(tile.band(0), &[0; 8]);
		assert_eq!(tile.band(1), &[0; 8]);
	}

	#[test]
	fn needs_a_band() {
		assert!(Tile::<u8>::new(PixelRect::new(0, 0, 4, 4), 0).is_err());
	}

	#[test]
	fn from_fn_and_sample() {
		let tile = Tile::<i32>::from_fn(PixelRect::new(-1, -1, 3, 3), 2, |x, y, band| (x * 10 + y + band as i64 * 100) as i32);
		assert_eq!(tile.sample(-1, -1, 0), -11);
		assert_eq!(tile.sample(1, 0, 0), 10);
		assert_eq!(tile.sample(1, 1, 1), 111);
	}

	#[test]
	fn set_sample() {
		let mut tile = Tile::<u8>::filled(PixelRect::new(0, 0, 2, 2), 1, 7).unwrap();
		tile.set_sample(1, 0, 0, 9);
		assert_eq!(tile.sample(1, 0, 0), 9);
		assert_eq!(tile.sample(0, 0, 0), 7);
		assert_eq!(tile.band(0), &[7, 9, 7, 7]);
	}

	#[test]
	#[should_panic(expected = "outside of")]
	fn sample_out_of_bounds() {
		let tile = Tile::<u8>::new(PixelRect::new(0, 0, 2, 2), 1).unwrap();
		tile.sample(2, 0, 0);
	}

	#[test]
	fn sample_trait_conversions() {
		assert_eq!(u8::from_f64_lossy(300.0), 255);
		assert_eq!(u8::from_f64_lossy(-3.0), 0);
		assert_eq!(i16::from_f64_lossy(-40000.0), i16::MIN);
		assert_eq!(u16::from_f64_lossy(f64::NAN), 0);
		assert!(f32::from_f64_lossy(f64::NAN).is_nan());
		assert_eq!(f64::from_f64_lossy(1.5), 1.5);
		assert_eq!(255u8.as_f64(), 255.0);
		assert_eq!((-7i32).as_f64(), -7.0);
	}

	#[test]
	fn tile_data_dispatch() {
		let rect = PixelRect::new(0, 0, 2, 2);
		let data = TileData::from(Tile::<f32>::filled(rect, 3, 1.25).unwrap());
		assert_eq!(data.sample_type(), SampleType::F32);
		assert_eq!(data.rect(), &rect);
		assert_eq!(data.bands(), 3);
		assert_eq!(data.sample_as_f64(1, 1, 2), 1.25);
	}
}
