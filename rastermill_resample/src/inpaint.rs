//! This module implements the missing-sample reconstruction applied to 4-tap
//! vectors whose validity mask marks some taps as unusable.
//!
//! Reconstruction substitutes every invalid tap from its valid neighbors
//! following a fixed 16-case table, so interpolation near ROI or no-data
//! boundaries can proceed instead of discarding the whole pixel. The same
//! table runs twice per pixel: once per tap row before the horizontal pass,
//! then once on the four row results before the vertical pass.

use crate::domain::Accumulator;

/// Fills invalid entries of a 4-tap vector from its valid neighbors.
///
/// Bit `i` of `mask` is set iff `taps[i]` is valid. Mask 15 returns the input
/// unchanged; mask 0 yields all zeros (callers must already have resolved the
/// all-invalid case to the destination no-data value).
///
/// # Panics
/// Panics for mask values outside `0..=15` — such a mask is a programming
/// error, and producing silently wrong pixels is worse than aborting.
pub fn reconstruct<A: Accumulator>(taps: [A; 4], mask: u8) -> [A; 4] {
	let [s_, s0, s1, s2] = taps;
	match mask {
		0 => [A::ZERO; 4],
		1 => [s_; 4],
		2 => [s0; 4],
		3 => [s_, s0, s0, s0],
		4 => [s1; 4],
		5 => [s_, A::average(s_, s1), s1, s1],
		6 => [s0, s0, s1, s1],
		7 => [s_, s0, s1, s1],
		8 => [s2; 4],
		9 => [s_, A::average(s_, s2), A::average(s_, s2), s2],
		10 => [s0, s0, A::average(s0, s2), s2],
		11 => [s_, s0, A::average(s0, s2), s2],
		12 => [s1, s1, s1, s2],
		13 => [s_, A::average(s_, s1), s1, s2],
		14 => [s0, s0, s1, s2],
		15 => taps,
		_ => panic!("validity mask out of range: {mask}"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	const TAPS: [i64; 4] = [10, 20, 40, 80];

	#[rstest]
	#[case(0, [0, 0, 0, 0])]
	#[case(1, [10, 10, 10, 10])]
	#[case(2, [20, 20, 20, 20])]
	#[case(3, [10, 20, 20, 20])]
	#[case(4, [40, 40, 40, 40])]
	#[case(5, [10, 25, 40, 40])]
	#[case(6, [20, 20, 40, 40])]
	#[case(7, [10, 20, 40, 40])]
	#[case(8, [80, 80, 80, 80])]
	#[case(9, [10, 45, 45, 80])]
	#[case(10, [20, 20, 50, 80])]
	#[case(11, [10, 20, 50, 80])]
	#[case(12, [40, 40, 40, 80])]
	#[case(13, [10, 25, 40, 80])]
	#[case(14, [20, 20, 40, 80])]
	#[case(15, [10, 20, 40, 80])]
	fn substitution_table(#[case] mask: u8, #[case] expected: [i64; 4]) {
		assert_eq!(reconstruct(TAPS, mask), expected);
	}

	#[test]
	fn complete_vector_passes_through() {
		let taps = [-3i64, 7, 11, -19];
		assert_eq!(reconstruct(taps, 15), taps);

		let taps = [0.25f64, -0.5, 1.75, 3.5];
		assert_eq!(reconstruct(taps, 15), taps);
	}

	#[test]
	fn integer_average_truncates() {
		// mask 5: element 1 becomes avg(taps[0], taps[2])
		assert_eq!(reconstruct([3i64, 0, 4, 0], 5)[1], 3);
		assert_eq!(reconstruct([-3i64, 0, 0, 0], 5)[1], -1);
	}

	#[test]
	fn float_average_is_exact() {
		assert_eq!(reconstruct([3.0f64, 0.0, 4.0, 0.0], 5)[1], 3.5);
	}

	#[test]
	#[should_panic(expected = "validity mask out of range")]
	fn mask_out_of_range_panics() {
		reconstruct(TAPS, 16);
	}
}
