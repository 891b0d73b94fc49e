//! Bicubic resampling of tiled raster images under rational scale factors,
//! honoring region-of-interest and no-data masking.
//!
//! The kernel maps every destination pixel to a source position split into an
//! integer tap origin and a quantized sub-pixel fraction, reads a 4x4 tap
//! window, classifies tap validity under the session's gating mode,
//! reconstructs missing taps from valid neighbors, and applies a separable
//! convolution with precomputed Keys bicubic weights. Fixed-point arithmetic
//! is used for the integer sample types and floating point for `f32`/`f64`,
//! with identical gating semantics across all six types.
//!
//! # Examples
//!
//! ```rust
//! use rastermill_core::{PixelRect, Tile, TileData};
//! use rastermill_resample::{Rational, ResampleConfig, Resampler};
//!
//! // downscale an 8x8 source by 2 into a 2x2 destination
//! let source = TileData::from(Tile::<u8>::filled(PixelRect::new(-4, -4, 16, 16), 1, 127).unwrap());
//! let config = ResampleConfig {
//! 	scale_x: Rational::new(1, 2).unwrap(),
//! 	scale_y: Rational::new(1, 2).unwrap(),
//! 	..ResampleConfig::default()
//! };
//! let resampler = Resampler::new(config).unwrap();
//! let dest = resampler.resample(&source, None, PixelRect::new(0, 0, 2, 2)).unwrap();
//! assert_eq!(dest.sample_as_f64(0, 0, 0), 127.0);
//! ```

mod axis_map;
mod domain;
mod gating;
mod inpaint;
mod kernel_table;
mod rational;
mod resampler;

pub use axis_map::AxisPositions;
pub use domain::{Accumulator, PixelDomain};
pub use gating::{Gating, RoiSource};
pub use inpaint::reconstruct;
pub use kernel_table::KernelTable;
pub use rational::Rational;
pub use resampler::{ResampleConfig, Resampler};
