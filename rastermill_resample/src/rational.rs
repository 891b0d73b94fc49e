//! This module defines [`Rational`], the exact fraction type used for scale
//! factors and translations.
//!
//! Keeping scale and translation rational lets the coordinate mapping advance
//! through purely integral arithmetic, so sub-pixel positions never accumulate
//! floating-point drift across a tile.

use anyhow::{Result, ensure};
use std::fmt;

/// A reduced fraction with a positive denominator.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct Rational {
	num: i64,
	den: i64,
}

impl Rational {
	/// Creates a reduced rational. The denominator must not be zero; its sign
	/// is normalized into the numerator.
	pub fn new(num: i64, den: i64) -> Result<Rational> {
		ensure!(den != 0, "rational denominator must not be zero");
		let (num, den) = if den < 0 { (-num, -den) } else { (num, den) };
		let div = gcd(num.unsigned_abs(), den.unsigned_abs()) as i64;
		Ok(Rational {
			num: num / div,
			den: den / div,
		})
	}

	pub fn integer(value: i64) -> Rational {
		Rational { num: value, den: 1 }
	}

	pub fn num(&self) -> i64 {
		self.num
	}

	pub fn den(&self) -> i64 {
		self.den
	}

	/// The reciprocal. Fails for zero.
	pub fn invert(&self) -> Result<Rational> {
		ensure!(self.num != 0, "cannot invert a zero rational");
		Rational::new(self.den, self.num)
	}

	pub fn is_positive(&self) -> bool {
		self.num > 0
	}

	pub fn is_integer(&self) -> bool {
		self.den == 1
	}

	pub fn is_one(&self) -> bool {
		self.num == 1 && self.den == 1
	}

	pub fn as_f64(&self) -> f64 {
		self.num as f64 / self.den as f64
	}
}

impl Default for Rational {
	fn default() -> Rational {
		Rational::integer(0)
	}
}

impl fmt::Debug for Rational {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_fmt(format_args!("{}/{}", &self.num, &self.den))
	}
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
	if a == 0 {
		return b.max(1);
	}
	while b != 0 {
		(a, b) = (b, a % b);
	}
	a
}
