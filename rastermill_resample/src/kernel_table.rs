//! This module defines [`KernelTable`], the precomputed bicubic tap weights.
//!
//! For each of the `2^subsample_bits` quantized sub-pixel positions the table
//! holds the 4 weights of the Keys cubic-convolution kernel (a = -1/2, support
//! 2, taps at offsets -1, 0, 1, 2) in three numeric domains: scaled integer,
//! `f32` and `f64`. The scaled-integer rows are pre-multiplied by
//! `2^precision_bits`, rounded, and corrected on their dominant tap so every
//! row sums to exactly `2^precision_bits` — interpolating a constant field is
//! then exact in the fixed-point paths.
//!
//! A table is built once per resampling session and never mutated afterwards,
//! so it can be read concurrently without synchronization.

use anyhow::{Result, ensure};

/// Precomputed bicubic tap weights for one axis.
pub struct KernelTable {
	subsample_bits: u8,
	precision_bits: u8,
	round: i64,
	rows_int: Vec<[i64; 4]>,
	rows_f32: Vec<[f32; 4]>,
	rows_f64: Vec<[f64; 4]>,
}

/// Keys cubic-convolution weight, a = -1/2.
fn keys_weight(t: f64) -> f64 {
	const A: f64 = -0.5;
	let t = t.abs();
	if t <= 1.0 {
		(A + 2.0) * t * t * t - (A + 3.0) * t * t + 1.0
	} else if t <= 2.0 {
		A * t * t * t - 5.0 * A * t * t + 8.0 * A * t - 4.0 * A
	} else {
		0.0
	}
}

impl KernelTable {
	/// Builds the bicubic weight table.
	///
	/// `subsample_bits` selects the sub-pixel quantization (`1..=15`);
	/// `precision_bits` the fixed-point scale (`1..=20`, so accumulating four
	/// weighted `i32` taps stays well inside `i64`).
	pub fn bicubic(subsample_bits: u8, precision_bits: u8) -> Result<KernelTable> {
		ensure!(
			(1..=15).contains(&subsample_bits),
			"subsample_bits must lie in 1..=15, got {subsample_bits}"
		);
		ensure!(
			(1..=20).contains(&precision_bits),
			"precision_bits must lie in 1..=20, got {precision_bits}"
		);

		let one = 1usize << subsample_bits;
		let scale = f64::from(1u32 << precision_bits);

		let mut rows_int = Vec::with_capacity(one);
		let mut rows_f32 = Vec::with_capacity(one);
		let mut rows_f64 = Vec::with_capacity(one);

		for idx in 0..one {
			let f = idx as f64 / one as f64;
			let row = [keys_weight(1.0 + f), keys_weight(f), keys_weight(1.0 - f), keys_weight(2.0 - f)];

			let mut row_int = row.map(|w| (w * scale).round() as i64);
			// push the rounding residual into the dominant tap, keeping the
			// row sum at exactly 2^precision_bits
			let residual = (1i64 << precision_bits) - row_int.iter().sum::<i64>();
			let dominant = if f < 0.5 { 1 } else { 2 };
			row_int[dominant] += residual;

			rows_int.push(row_int);
			rows_f32.push(row.map(|w| w as f32));
			rows_f64.push(row);
		}

		Ok(KernelTable {
			subsample_bits,
			precision_bits,
			round: 1i64 << (precision_bits - 1),
			rows_int,
			rows_f32,
			rows_f64,
		})
	}

	pub fn subsample_bits(&self) -> u8 {
		self.subsample_bits
	}

	pub fn precision_bits(&self) -> u8 {
		self.precision_bits
	}

	/// Rounding bias added before every fixed-point right shift.
	pub fn round(&self) -> i64 {
		self.round
	}

	/// Number of quantized sub-pixel positions.
	pub fn positions(&self) -> usize {
		self.rows_int.len()
	}

	pub fn row_int(&self, fraction: u16) -> &[i64; 4] {
		&self.rows_int[fraction as usize]
	}

	pub fn row_f32(&self, fraction: u16) -> &[f32; 4] {
		&self.rows_f32[fraction as usize]
	}

	pub fn row_f64(&self, fraction: u16) -> &[f64; 4] {
		&self.rows_f64[fraction as usize]
	}
}

impl std::fmt::Debug for KernelTable {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("KernelTable")
			.field("subsample_bits", &self.subsample_bits)
			.field("precision_bits", &self.precision_bits)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use approx::assert_abs_diff_eq;

	#[test]
	fn weight_function() {
		assert_eq!(keys_weight(0.0), 1.0);
		assert_eq!(keys_weight(1.0), 0.0);
		assert_eq!(keys_weight(2.0), 0.0);
		assert_eq!(keys_weight(2.5), 0.0);
		assert_eq!(keys_weight(-0.5), keys_weight(0.5));
		assert_eq!(keys_weight(0.5), 0.5625);
		assert_eq!(keys_weight(1.5), -0.0625);
	}

	#[test]
	fn identity_row_at_fraction_zero() {
		let table = KernelTable::bicubic(8, 8).unwrap();
		assert_eq!(table.row_int(0), &[0, 256, 0, 0]);
		assert_eq!(table.row_f64(0), &[0.0, 1.0, 0.0, 0.0]);
	}

	#[test]
	fn half_fraction_row() {
		let table = KernelTable::bicubic(8, 8).unwrap();
		assert_eq!(table.row_int(128), &[-16, 144, 144, -16]);
	}

	#[test]
	fn integer_rows_sum_to_precision_scale() {
		let table = KernelTable::bicubic(8, 8).unwrap();
		for idx in 0..table.positions() {
			let sum: i64 = table.row_int(idx as u16).iter().sum();
			assert_eq!(sum, 256, "row {idx} does not sum to 2^precision_bits");
		}
	}

	#[test]
	fn float_rows_partition_unity() {
		let table = KernelTable::bicubic(8, 8).unwrap();
		for idx in 0..table.positions() {
			let sum: f64 = table.row_f64(idx as u16).iter().sum();
			assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-12);
		}
	}

	#[test]
	fn rows_are_symmetric() {
		let table = KernelTable::bicubic(8, 8).unwrap();
		for idx in 1..table.positions() {
			let row = table.row_f64(idx as u16);
			let mirrored = table.row_f64((table.positions() - idx) as u16);
			for tap in 0..4 {
				assert_abs_diff_eq!(row[tap], mirrored[3 - tap], epsilon = 1e-12);
			}
		}
	}

	#[test]
	fn table_sizes_follow_subsample_bits() {
		assert_eq!(KernelTable::bicubic(4, 8).unwrap().positions(), 16);
		assert_eq!(KernelTable::bicubic(10, 12).unwrap().positions(), 1024);
	}

	#[test]
	fn bit_ranges_are_validated() {
		assert!(KernelTable::bicubic(0, 8).is_err());
		assert!(KernelTable::bicubic(16, 8).is_err());
		assert!(KernelTable::bicubic(8, 0).is_err());
		assert!(KernelTable::bicubic(8, 21).is_err());
	}

	#[test]
	fn round_bias() {
		assert_eq!(KernelTable::bicubic(8, 8).unwrap().round(), 128);
		assert_eq!(KernelTable::bicubic(8, 12).unwrap().round(), 2048);
	}
}
