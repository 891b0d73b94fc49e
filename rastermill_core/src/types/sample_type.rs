//! This module defines the [`SampleType`] enum, the tag for the six sample widths
//! a tile can carry. Every processing path in the workspace is generic over these
//! six types and must preserve identical semantics across them.

use anyhow::{Result, bail};
use std::fmt::{Display, Formatter};

/// Tag for the per-band sample representation of a tile.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SampleType {
	U8,
	U16,
	I16,
	I32,
	F32,
	F64,
}

impl SampleType {
	/// Returns a lowercase string identifier for this sample type.
	pub fn as_str(&self) -> &str {
		match self {
			SampleType::U8 => "u8",
			SampleType::U16 => "u16",
			SampleType::I16 => "i16",
			SampleType::I32 => "i32",
			SampleType::F32 => "f32",
			SampleType::F64 => "f64",
		}
	}

	pub fn try_from_str(value: &str) -> Result<Self> {
		Ok(match value.to_lowercase().trim() {
			"u8" | "byte" => SampleType::U8,
			"u16" | "ushort" => SampleType::U16,
			"i16" | "short" => SampleType::I16,
			"i32" | "int" => SampleType::I32,
			"f32" | "float" => SampleType::F32,
			"f64" | "double" => SampleType::F64,
			_ => bail!("Unknown sample type: '{}'", value),
		})
	}

	/// Size of one sample in bytes.
	pub fn byte_count(&self) -> usize {
		match self {
			SampleType::U8 => 1,
			SampleType::U16 | SampleType::I16 => 2,
			SampleType::I32 | SampleType::F32 => 4,
			SampleType::F64 => 8,
		}
	}

	pub fn is_float(&self) -> bool {
		matches!(self, SampleType::F32 | SampleType::F64)
	}
}

impl Display for SampleType {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.write_str(self.as_str())
	}
}
