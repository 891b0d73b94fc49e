//! This module defines the gating mode of a resampling session: which masking
//! concern (region of interest, no-data sentinel, or none) decides per-tap
//! validity.
//!
//! Exactly one mode is active per session. Requesting ROI and no-data gating
//! together is rejected at configuration time; there is no combined semantics.

use anyhow::{Result, bail};
use rastermill_core::{NoDataPredicate, RoiMembership};
use std::{fmt, sync::Arc};

/// How the region of interest is supplied to the session.
#[derive(Clone)]
pub enum RoiSource {
	/// A point-membership function, queried per tap coordinate.
	Membership(Arc<dyn RoiMembership>),
	/// A rasterized mask tile handed to every `resample` call, consulted at
	/// the same stride offsets as the source tile.
	MaskTile,
}

/// The active masking concern of a session.
#[derive(Clone)]
pub enum Gating {
	Unconstrained,
	RoiPoint(Arc<dyn RoiMembership>),
	RoiMask,
	NoData(NoDataPredicate),
}

impl Gating {
	/// Combines the optional ROI and no-data settings of a configuration into
	/// one gating mode, rejecting the unsupported combination.
	pub fn from_options(roi: Option<RoiSource>, no_data: Option<NoDataPredicate>) -> Result<Gating> {
		Ok(match (roi, no_data) {
			(None, None) => Gating::Unconstrained,
			(Some(RoiSource::Membership(membership)), None) => Gating::RoiPoint(membership),
			(Some(RoiSource::MaskTile), None) => Gating::RoiMask,
			(None, Some(predicate)) => Gating::NoData(predicate),
			(Some(_), Some(_)) => {
				bail!("combining ROI gating with no-data gating in one session is not supported")
			}
		})
	}

	pub fn name(&self) -> &str {
		match self {
			Gating::Unconstrained => "unconstrained",
			Gating::RoiPoint(_) => "roi-point",
			Gating::RoiMask => "roi-mask",
			Gating::NoData(_) => "no-data",
		}
	}
}

impl fmt::Debug for Gating {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Gating::NoData(predicate) => f.write_fmt(format_args!("Gating::NoData({predicate:?})")),
			_ => f.write_fmt(format_args!("Gating::{}", self.name())),
		}
	}
}

impl fmt::Debug for RoiSource {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RoiSource::Membership(membership) => {
				f.write_fmt(format_args!("RoiSource::Membership(bounds: {:?})", membership.bounds()))
			}
			RoiSource::MaskTile => f.write_str("RoiSource::MaskTile"),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rastermill_core::PixelRect;

	#[test]
	fn mode_selection() {
		assert!(matches!(Gating::from_options(None, None).unwrap(), Gating::Unconstrained));

		let roi = Arc::new(PixelRect::new(0, 0, 4, 4));
		assert!(matches!(
			Gating::from_options(Some(RoiSource::Membership(roi)), None).unwrap(),
			Gating::RoiPoint(_)
		));
		assert!(matches!(
			Gating::from_options(Some(RoiSource::MaskTile), None).unwrap(),
			Gating::RoiMask
		));
		assert!(matches!(
			Gating::from_options(None, Some(NoDataPredicate::value(0.0))).unwrap(),
			Gating::NoData(_)
		));
	}

	#[test]
	fn combined_gating_is_rejected() {
		let error = Gating::from_options(Some(RoiSource::MaskTile), Some(NoDataPredicate::value(0.0))).unwrap_err();
		assert!(error.to_string().contains("not supported"));
	}

	#[test]
	fn names() {
		assert_eq!(Gating::Unconstrained.name(), "unconstrained");
		assert_eq!(Gating::RoiMask.name(), "roi-mask");
		assert_eq!(Gating::NoData(NoDataPredicate::value(1.0)).name(), "no-data");
	}
}
