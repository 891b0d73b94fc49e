//! This module defines [`AxisPositions`], the per-axis coordinate mapping from
//! destination indexes to source tap origins and quantized sub-pixel fractions.
//!
//! The source coordinate of destination index `i` is the rational
//! `t(i) = (x0 + i - translate + 1/2) * (1 / scale) - 1/2`, kept as an integer
//! numerator over a fixed common denominator and advanced by a constant step
//! per index. The walk is pure integer arithmetic, so positions are exact and
//! monotone for positive scales and fractions never drift.
//!
//! Positions are computed once per destination row/column and reused across
//! all bands of a tile.

use crate::rational::Rational;
use anyhow::{Result, ensure};

/// Integer source positions and sub-pixel fractions along one axis.
#[derive(Clone, Debug)]
pub struct AxisPositions {
	positions: Vec<i64>,
	fractions: Vec<u16>,
}

impl AxisPositions {
	/// Maps `count` destination indexes starting at `dest_origin`.
	///
	/// `scale` is the destination/source size ratio and must be positive;
	/// `translate` may have any sign. `subsample_bits` selects the fraction
	/// quantization (`2^bits` positions) and must lie in `1..=15`.
	pub fn build(dest_origin: i64, count: usize, scale: &Rational, translate: &Rational, subsample_bits: u8) -> Result<AxisPositions> {
		ensure!(scale.is_positive(), "scale factor must be positive, got {scale:?}");
		ensure!(
			(1..=15).contains(&subsample_bits),
			"subsample_bits must lie in 1..=15, got {subsample_bits}"
		);

		// t(i) = ((x0 + i) - tn/td + 1/2) * (sd/sn) - 1/2, written as one
		// numerator over the common denominator 2 * td * sn.
		let sn = i128::from(scale.num());
		let sd = i128::from(scale.den());
		let tn = i128::from(translate.num());
		let td = i128::from(translate.den());

		let den = 2 * td * sn;
		let step = 2 * td * sd;
		let mut num = (2 * td * i128::from(dest_origin) - 2 * tn + td) * sd - td * sn;

		let one = i128::from(1u32 << subsample_bits);
		let mut positions = Vec::with_capacity(count);
		let mut fractions = Vec::with_capacity(count);
		for _ in 0..count {
			positions.push(num.div_euclid(den) as i64);
			fractions.push((num.rem_euclid(den) * one / den) as u16);
			num += step;
		}

		Ok(AxisPositions { positions, fractions })
	}

	pub fn len(&self) -> usize {
		self.positions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.positions.is_empty()
	}

	/// Integer source position of the `s0` tap for destination index `i`.
	pub fn position(&self, i: usize) -> i64 {
		self.positions[i]
	}

	/// Quantized sub-pixel fraction for destination index `i`.
	pub fn fraction(&self, i: usize) -> u16 {
		self.fractions[i]
	}

	pub fn positions(&self) -> &[i64] {
		&self.positions
	}

	pub fn fractions(&self) -> &[u16] {
		&self.fractions
	}

	/// Inclusive source coordinate span read by the 4-tap support window:
	/// one tap left of the first position through two taps right of the last.
	pub fn support(&self) -> Option<(i64, i64)> {
		Some((*self.positions.first()? - 1, *self.positions.last()? + 2))
	}
}
