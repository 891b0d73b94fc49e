//! This module defines [`Resampler`], the session-level entry point of the
//! bicubic resampling kernel, and [`ResampleConfig`], its configuration.
//!
//! A session captures scale, translation, gating mode and the precomputed
//! weight tables. Construction validates the configuration and fails fast on
//! malformed scales, bit ranges or the unsupported ROI+no-data combination;
//! after that the session is immutable and safe to share across threads.
//!
//! Per destination pixel the kernel follows one state machine for every
//! sample type and gating mode: gather the 4x4 tap window, classify tap
//! validity, then either emit the destination no-data value (all taps
//! invalid), convolve the raw taps directly (all taps valid), or reconstruct
//! each tap row and the column of row results before the separable
//! convolution. Fixed-point paths shift with a rounding bias once per row and
//! once more on the final sum; this ordering is load-bearing and must not be
//! rearranged.

use crate::{
	axis_map::AxisPositions,
	domain::{Accumulator, F32Domain, F64Domain, I16Domain, I32Domain, PixelDomain, U8Domain, U16Domain},
	gating::{Gating, RoiSource},
	inpaint::reconstruct,
	kernel_table::KernelTable,
	rational::Rational,
};
use anyhow::{Context, Result, ensure};
use log::{debug, trace};
use rastermill_core::{NoDataPredicate, PixelRect, Sample, Tile, TileData};

/// Configuration of a resampling session.
///
/// `scale_*` is the destination/source size ratio per axis and must be
/// positive. At most one of `roi` and `no_data` may be set; setting both is
/// rejected by [`Resampler::new`].
#[derive(Clone, Debug)]
pub struct ResampleConfig {
	pub scale_x: Rational,
	pub scale_y: Rational,
	pub translate_x: Rational,
	pub translate_y: Rational,
	pub roi: Option<RoiSource>,
	pub no_data: Option<NoDataPredicate>,
	/// Substituted for destination pixels without a usable neighborhood,
	/// narrowed to the destination sample type.
	pub dest_no_data: f64,
	pub subsample_bits: u8,
	pub precision_bits: u8,
}

impl Default for ResampleConfig {
	fn default() -> ResampleConfig {
		ResampleConfig {
			scale_x: Rational::integer(1),
			scale_y: Rational::integer(1),
			translate_x: Rational::integer(0),
			translate_y: Rational::integer(0),
			roi: None,
			no_data: None,
			dest_no_data: 0.0,
			subsample_bits: 8,
			precision_bits: 8,
		}
	}
}

/// A validated, immutable resampling session.
pub struct Resampler {
	scale_x: Rational,
	scale_y: Rational,
	translate_x: Rational,
	translate_y: Rational,
	gating: Gating,
	dest_no_data: f64,
	table_x: KernelTable,
	table_y: KernelTable,
}

impl Resampler {
	pub fn new(config: ResampleConfig) -> Result<Resampler> {
		ensure!(
			config.scale_x.is_positive(),
			"horizontal scale factor must be positive, got {:?}",
			config.scale_x
		);
		ensure!(
			config.scale_y.is_positive(),
			"vertical scale factor must be positive, got {:?}",
			config.scale_y
		);

		let gating = Gating::from_options(config.roi, config.no_data)?;
		let table_x = KernelTable::bicubic(config.subsample_bits, config.precision_bits)?;
		let table_y = KernelTable::bicubic(config.subsample_bits, config.precision_bits)?;

		debug!(
			"resampling session: scale {:?}x{:?}, translate {:?}/{:?}, gating {}",
			config.scale_x,
			config.scale_y,
			config.translate_x,
			config.translate_y,
			gating.name()
		);

		Ok(Resampler {
			scale_x: config.scale_x,
			scale_y: config.scale_y,
			translate_x: config.translate_x,
			translate_y: config.translate_y,
			gating,
			dest_no_data: config.dest_no_data,
			table_x,
			table_y,
		})
	}

	pub fn gating(&self) -> &Gating {
		&self.gating
	}

	/// True if the mapping moves pixels by whole-pixel offsets only.
	pub fn is_identity(&self) -> bool {
		self.scale_x.is_one() && self.scale_y.is_one() && self.translate_x.is_integer() && self.translate_y.is_integer()
	}

	/// Fills `dest_rect` by resampling `src`.
	///
	/// The source tile must cover the whole support span of the destination
	/// rectangle: the mapped positions padded by one tap left/top and two taps
	/// right/bottom. ROI-mask gating additionally requires `roi_mask`, a
	/// single-band mask with the same rectangle as the source tile.
	pub fn resample(&self, src: &TileData, roi_mask: Option<&Tile<u8>>, dest_rect: PixelRect) -> Result<TileData> {
		trace!(
			"resampling {:?} -> {dest_rect:?} ({} bands, {}, gating {})",
			src.rect(),
			src.bands(),
			src.sample_type(),
			self.gating.name()
		);
		Ok(match src {
			TileData::U8(tile) => TileData::U8(self.run::<U8Domain>(tile, roi_mask, dest_rect)?),
			TileData::U16(tile) => TileData::U16(self.run::<U16Domain>(tile, roi_mask, dest_rect)?),
			TileData::I16(tile) => TileData::I16(self.run::<I16Domain>(tile, roi_mask, dest_rect)?),
			TileData::I32(tile) => TileData::I32(self.run::<I32Domain>(tile, roi_mask, dest_rect)?),
			TileData::F32(tile) => TileData::F32(self.run::<F32Domain>(tile, roi_mask, dest_rect)?),
			TileData::F64(tile) => TileData::F64(self.run::<F64Domain>(tile, roi_mask, dest_rect)?),
		})
	}

	fn run<D: PixelDomain>(&self, src: &Tile<D::Sample>, roi_mask: Option<&Tile<u8>>, dest_rect: PixelRect) -> Result<Tile<D::Sample>> {
		let mut dest = Tile::new(dest_rect, src.bands())?;
		if dest_rect.is_empty() {
			return Ok(dest);
		}

		// whole-pixel mappings without gating degenerate to a translated copy
		if self.is_identity() && matches!(self.gating, Gating::Unconstrained) {
			self.copy_translated(src, &mut dest)?;
			return Ok(dest);
		}

		let bits = self.table_x.subsample_bits();
		let xs = AxisPositions::build(dest_rect.x, dest_rect.width as usize, &self.scale_x, &self.translate_x, bits)?;
		let ys = AxisPositions::build(dest_rect.y, dest_rect.height as usize, &self.scale_y, &self.translate_y, bits)?;

		let (Some((x_lo, x_hi)), Some((y_lo, y_hi))) = (xs.support(), ys.support()) else {
			return Ok(dest);
		};
		let src_rect = *src.rect();
		ensure!(
			x_lo >= src_rect.x && x_hi < src_rect.x_max() && y_lo >= src_rect.y && y_hi < src_rect.y_max(),
			"source tile {src_rect:?} does not cover the support span x {x_lo}..={x_hi}, y {y_lo}..={y_hi}"
		);

		let lx = AxisLayout::new(&xs, src_rect.x, 1);
		let ly = AxisLayout::new(&ys, src_rect.y, src.row_stride());

		match &self.gating {
			Gating::Unconstrained => self.loop_unconstrained::<D>(src, &mut dest, &lx, &ly),
			Gating::RoiPoint(membership) => {
				self.loop_roi::<D>(src, &mut dest, &lx, &ly, &|x, y| membership.contains(x, y));
			}
			Gating::RoiMask => {
				let mask = roi_mask.context("ROI-mask gating requires a mask tile")?;
				ensure!(
					mask.bands() == 1,
					"the ROI mask tile must have exactly one band, got {}",
					mask.bands()
				);
				ensure!(
					mask.rect() == src.rect(),
					"the ROI mask tile {:?} must match the source tile {:?}",
					mask.rect(),
					src.rect()
				);
				self.loop_roi::<D>(src, &mut dest, &lx, &ly, &|x, y| mask.sample(x, y, 0) != 0);
			}
			Gating::NoData(predicate) => self.loop_no_data::<D>(src, &mut dest, &lx, &ly, predicate),
		}

		Ok(dest)
	}

	/// Identity fast path: every destination pixel is one source pixel.
	fn copy_translated<T: Sample>(&self, src: &Tile<T>, dest: &mut Tile<T>) -> Result<()> {
		let dx = self.translate_x.num();
		let dy = self.translate_y.num();
		let needed = dest.rect().translated(-dx, -dy);
		ensure!(
			src.rect().contains_rect(&needed),
			"source tile {:?} does not cover the translated destination rectangle {needed:?}",
			src.rect()
		);

		let dest_rect = *dest.rect();
		for band in 0..src.bands() {
			for y in dest_rect.y..dest_rect.y_max() {
				for x in dest_rect.x..dest_rect.x_max() {
					dest.set_sample(x, y, band, src.sample(x - dx, y - dy, band));
				}
			}
		}
		Ok(())
	}

	fn loop_unconstrained<D: PixelDomain>(&self, src: &Tile<D::Sample>, dest: &mut Tile<D::Sample>, lx: &AxisLayout, ly: &AxisLayout) {
		let row_stride = src.row_stride();
		for band in 0..src.bands() {
			let plane = src.band(band);
			let out = dest.band_mut(band);
			let mut di = 0;
			for j in 0..ly.len() {
				let wy = D::weights(&self.table_y, ly.fractions[j]);
				let y_off = ly.offsets[j];
				for i in 0..lx.len() {
					let wx = D::weights(&self.table_x, lx.fractions[i]);
					let taps = lift::<D>(&gather::<D>(plane, y_off + lx.offsets[i], row_stride));
					let acc = self.convolve_all::<D>(&taps, &wx, &wy);
					out[di] = D::clamp_store(acc);
					di += 1;
				}
			}
		}
	}

	fn loop_roi<D: PixelDomain>(
		&self,
		src: &Tile<D::Sample>,
		dest: &mut Tile<D::Sample>,
		lx: &AxisLayout,
		ly: &AxisLayout,
		inside: &dyn Fn(i64, i64) -> bool,
	) {
		let no_data = D::Sample::from_f64_lossy(self.dest_no_data);
		let row_stride = src.row_stride();
		for band in 0..src.bands() {
			let plane = src.band(band);
			let out = dest.band_mut(band);
			let mut di = 0;
			for j in 0..ly.len() {
				let wy = D::weights(&self.table_y, ly.fractions[j]);
				let y_off = ly.offsets[j];
				let y0 = ly.positions[j];
				for i in 0..lx.len() {
					let x0 = lx.positions[i];

					// a pixel whose own mapped position is outside the region
					// resolves to no-data without reading any taps
					if !inside(x0, y0) {
						out[di] = no_data;
						di += 1;
						continue;
					}

					let mut mask = 0u16;
					for h in 0..4i64 {
						for z in 0..4i64 {
							if inside(x0 + z - 1, y0 + h - 1) {
								mask |= 1 << (4 * h + z);
							}
						}
					}

					out[di] = if mask == 0 {
						no_data
					} else {
						let wx = D::weights(&self.table_x, lx.fractions[i]);
						let taps = lift::<D>(&gather::<D>(plane, y_off + lx.offsets[i], row_stride));
						let acc = if mask == 0xFFFF {
							self.convolve_all::<D>(&taps, &wx, &wy)
						} else {
							self.convolve_masked::<D>(&taps, mask, &wx, &wy)
						};
						D::clamp_store(acc)
					};
					di += 1;
				}
			}
		}
	}

	fn loop_no_data<D: PixelDomain>(
		&self,
		src: &Tile<D::Sample>,
		dest: &mut Tile<D::Sample>,
		lx: &AxisLayout,
		ly: &AxisLayout,
		predicate: &NoDataPredicate,
	) {
		let no_data = D::Sample::from_f64_lossy(self.dest_no_data);
		let row_stride = src.row_stride();
		for band in 0..src.bands() {
			let plane = src.band(band);
			let out = dest.band_mut(band);
			let mut di = 0;
			for j in 0..ly.len() {
				let wy = D::weights(&self.table_y, ly.fractions[j]);
				let y_off = ly.offsets[j];
				for i in 0..lx.len() {
					let raw = gather::<D>(plane, y_off + lx.offsets[i], row_stride);

					let mut mask = 0u16;
					for h in 0..4 {
						for z in 0..4 {
							if !predicate.matches(raw[h][z].as_f64()) {
								mask |= 1 << (4 * h + z);
							}
						}
					}

					out[di] = if mask == 0 {
						no_data
					} else {
						let wx = D::weights(&self.table_x, lx.fractions[i]);
						let taps = lift::<D>(&raw);
						let acc = if mask == 0xFFFF {
							self.convolve_all::<D>(&taps, &wx, &wy)
						} else {
							self.convolve_masked::<D>(&taps, mask, &wx, &wy)
						};
						D::clamp_store(acc)
					};
					di += 1;
				}
			}
		}
	}

	/// Separable convolution of a fully valid tap window.
	fn convolve_all<D: PixelDomain>(&self, taps: &[[D::Accum; 4]; 4], wx: &[D::Weight; 4], wy: &[D::Weight; 4]) -> D::Accum {
		let mut sum = D::Accum::ZERO;
		for h in 0..4 {
			let mut row = D::Accum::ZERO;
			for z in 0..4 {
				row = D::mul_add(row, taps[h][z], wx[z]);
			}
			sum = D::mul_add(sum, D::round_shift(row, &self.table_x), wy[h]);
		}
		D::round_shift(sum, &self.table_y)
	}

	/// Separable convolution with reconstruction of partially invalid rows
	/// and of the column of row results.
	fn convolve_masked<D: PixelDomain>(&self, taps: &[[D::Accum; 4]; 4], mask: u16, wx: &[D::Weight; 4], wy: &[D::Weight; 4]) -> D::Accum {
		let mut rows = [D::Accum::ZERO; 4];
		let mut rows_valid = 0u8;
		for h in 0..4 {
			let row_mask = ((mask >> (4 * h)) & 0xF) as u8;
			let row_taps = reconstruct(taps[h], row_mask);
			let mut row = D::Accum::ZERO;
			for z in 0..4 {
				row = D::mul_add(row, row_taps[z], wx[z]);
			}
			if row_mask != 0 {
				rows_valid |= 1 << h;
			}
			rows[h] = D::round_shift(row, &self.table_x);
		}

		let rows = reconstruct(rows, rows_valid);
		let mut sum = D::Accum::ZERO;
		for h in 0..4 {
			sum = D::mul_add(sum, rows[h], wy[h]);
		}
		D::round_shift(sum, &self.table_y)
	}
}

impl std::fmt::Debug for Resampler {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Resampler")
			.field("scale_x", &self.scale_x)
			.field("scale_y", &self.scale_y)
			.field("translate_x", &self.translate_x)
			.field("translate_y", &self.translate_y)
			.field("gating", &self.gating)
			.finish()
	}
}

/// Per-axis source layout of one destination rectangle: plane element offsets
/// of the `s0` tap, absolute source positions and sub-pixel fractions.
struct AxisLayout {
	offsets: Vec<usize>,
	positions: Vec<i64>,
	fractions: Vec<u16>,
}

impl AxisLayout {
	fn new(axis: &AxisPositions, origin: i64, stride: usize) -> AxisLayout {
		AxisLayout {
			offsets: axis.positions().iter().map(|&p| (p - origin) as usize * stride).collect(),
			positions: axis.positions().to_vec(),
			fractions: axis.fractions().to_vec(),
		}
	}

	fn len(&self) -> usize {
		self.offsets.len()
	}
}

/// Reads the 4x4 tap window whose `s0` tap sits at plane element `base`.
///
/// The caller has already verified that the support span lies inside the
/// source tile, so no per-tap bounds checks happen here.
fn gather<D: PixelDomain>(plane: &[D::Sample], base: usize, row_stride: usize) -> [[D::Sample; 4]; 4] {
	let start = base - row_stride - 1;
	std::array::from_fn(|h| std::array::from_fn(|z| plane[start + h * row_stride + z]))
}

fn lift<D: PixelDomain>(raw: &[[D::Sample; 4]; 4]) -> [[D::Accum; 4]; 4] {
	std::array::from_fn(|h| std::array::from_fn(|z| D::load(raw[h][z])))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::sync::Arc;

	fn tile_u8(rect: PixelRect, value: u8) -> TileData {
		TileData::from(Tile::<u8>::filled(rect, 1, value).unwrap())
	}

	#[test]
	fn default_config_is_identity() {
		let resampler = Resampler::new(ResampleConfig::default()).unwrap();
		assert!(resampler.is_identity());
		assert!(matches!(resampler.gating(), Gating::Unconstrained));
	}

	#[test]
	fn combined_gating_is_rejected() {
		let config = ResampleConfig {
			roi: Some(RoiSource::MaskTile),
			no_data: Some(NoDataPredicate::value(0.0)),
			..ResampleConfig::default()
		};
		assert!(Resampler::new(config).is_err());
	}

	#[test]
	fn bad_bits_are_rejected() {
		let config = ResampleConfig {
			subsample_bits: 0,
			..ResampleConfig::default()
		};
		assert!(Resampler::new(config).is_err());

		let config = ResampleConfig {
			precision_bits: 21,
			..ResampleConfig::default()
		};
		assert!(Resampler::new(config).is_err());
	}

	#[test]
	fn identity_copy() {
		let src = TileData::from(Tile::<u8>::from_fn(PixelRect::new(0, 0, 6, 6), 1, |x, y, _| (x * 10 + y) as u8));
		let resampler = Resampler::new(ResampleConfig::default()).unwrap();
		let dest = resampler.resample(&src, None, PixelRect::new(1, 1, 4, 4)).unwrap();
		for y in 1..5 {
			for x in 1..5 {
				assert_eq!(dest.sample_as_f64(x, y, 0), src.sample_as_f64(x, y, 0));
			}
		}
	}

	#[test]
	fn identity_copy_with_translation() {
		let src = TileData::from(Tile::<i32>::from_fn(PixelRect::new(0, 0, 4, 4), 1, |x, y, _| (x + 10 * y) as i32));
		let config = ResampleConfig {
			translate_x: Rational::integer(2),
			translate_y: Rational::integer(-1),
			..ResampleConfig::default()
		};
		let resampler = Resampler::new(config).unwrap();
		let dest = resampler.resample(&src, None, PixelRect::new(2, -1, 4, 4)).unwrap();
		assert_eq!(dest.sample_as_f64(2, -1, 0), 0.0);
		assert_eq!(dest.sample_as_f64(5, 2, 0), 33.0);
	}

	#[test]
	fn identity_copy_needs_coverage() {
		let src = tile_u8(PixelRect::new(0, 0, 4, 4), 9);
		let resampler = Resampler::new(ResampleConfig::default()).unwrap();
		assert!(resampler.resample(&src, None, PixelRect::new(2, 2, 4, 4)).is_err());
	}

	#[test]
	fn kernel_path_needs_support_span() {
		let src = tile_u8(PixelRect::new(0, 0, 8, 8), 9);
		let config = ResampleConfig {
			scale_x: Rational::new(1, 2).unwrap(),
			scale_y: Rational::new(1, 2).unwrap(),
			..ResampleConfig::default()
		};
		let resampler = Resampler::new(config).unwrap();
		// dest x=0 maps to source 0.5, so the window starts at source -1
		assert!(resampler.resample(&src, None, PixelRect::new(0, 0, 4, 4)).is_err());
	}

	#[test]
	fn empty_destination() {
		let src = tile_u8(PixelRect::new(0, 0, 4, 4), 9);
		let resampler = Resampler::new(ResampleConfig::default()).unwrap();
		let dest = resampler.resample(&src, None, PixelRect::new(0, 0, 0, 3)).unwrap();
		assert_eq!(dest.rect(), &PixelRect::new(0, 0, 0, 3));
	}

	#[test]
	fn roi_mask_tile_is_required_and_checked() {
		let src = tile_u8(PixelRect::new(-4, -4, 16, 16), 9);
		let config = ResampleConfig {
			roi: Some(RoiSource::MaskTile),
			..ResampleConfig::default()
		};
		let resampler = Resampler::new(config).unwrap();
		let dest_rect = PixelRect::new(0, 0, 4, 4);

		assert!(resampler.resample(&src, None, dest_rect).is_err());

		let misaligned = Tile::<u8>::filled(PixelRect::new(0, 0, 16, 16), 1, 1).unwrap();
		assert!(resampler.resample(&src, Some(&misaligned), dest_rect).is_err());

		let two_bands = Tile::<u8>::filled(PixelRect::new(-4, -4, 16, 16), 2, 1).unwrap();
		assert!(resampler.resample(&src, Some(&two_bands), dest_rect).is_err());

		let aligned = Tile::<u8>::filled(PixelRect::new(-4, -4, 16, 16), 1, 1).unwrap();
		let dest = resampler.resample(&src, Some(&aligned), dest_rect).unwrap();
		assert_eq!(dest.sample_as_f64(0, 0, 0), 9.0);
	}

	#[test]
	fn roi_point_gating_outside_region() {
		let src = tile_u8(PixelRect::new(-4, -4, 16, 16), 9);
		let config = ResampleConfig {
			roi: Some(RoiSource::Membership(Arc::new(PixelRect::new(100, 100, 4, 4)))),
			dest_no_data: 55.0,
			..ResampleConfig::default()
		};
		let resampler = Resampler::new(config).unwrap();
		let dest = resampler.resample(&src, None, PixelRect::new(0, 0, 4, 4)).unwrap();
		for y in 0..4 {
			for x in 0..4 {
				assert_eq!(dest.sample_as_f64(x, y, 0), 55.0);
			}
		}
	}

	#[test]
	fn bands_are_resampled_independently() {
		let src = TileData::from(Tile::<u16>::from_fn(PixelRect::new(-4, -4, 16, 16), 3, |_, _, band| {
			(band * 100) as u16
		}));
		let config = ResampleConfig {
			scale_x: Rational::new(2, 1).unwrap(),
			scale_y: Rational::new(2, 1).unwrap(),
			..ResampleConfig::default()
		};
		let resampler = Resampler::new(config).unwrap();
		let dest = resampler.resample(&src, None, PixelRect::new(0, 0, 8, 8)).unwrap();
		assert_eq!(dest.bands(), 3);
		for band in 0..3 {
			assert_eq!(dest.sample_as_f64(3, 5, band), (band * 100) as f64);
		}
	}

	#[test]
	fn sample_type_is_preserved() {
		let config = || ResampleConfig {
			scale_x: Rational::new(1, 2).unwrap(),
			scale_y: Rational::new(1, 2).unwrap(),
			..ResampleConfig::default()
		};
		let rect = PixelRect::new(-4, -4, 16, 16);
		let dest_rect = PixelRect::new(0, 0, 2, 2);

		let cases: Vec<TileData> = vec![
			Tile::<u8>::filled(rect, 1, 1).unwrap().into(),
			Tile::<u16>::filled(rect, 1, 1).unwrap().into(),
			Tile::<i16>::filled(rect, 1, 1).unwrap().into(),
			Tile::<i32>::filled(rect, 1, 1).unwrap().into(),
			Tile::<f32>::filled(rect, 1, 1.0).unwrap().into(),
			Tile::<f64>::filled(rect, 1, 1.0).unwrap().into(),
		];
		for src in cases {
			let resampler = Resampler::new(config()).unwrap();
			let dest = resampler.resample(&src, None, dest_rect).unwrap();
			assert_eq!(dest.sample_type(), src.sample_type());
			assert_eq!(dest.rect(), &dest_rect);
		}
	}
}
