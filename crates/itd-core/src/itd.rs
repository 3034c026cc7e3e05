//! Azimuth to interaural sample offsets.
//!
//! Angles are in radians, `0` straight ahead, positive to the right of the
//! listener. A positive angle moves the right cursor forward in the buffer
//! (the right ear hears the source first) and the left cursor back by the
//! same amount, so the mean playback position stays on the original timeline.

use crate::{Error, Result};
use std::f64::consts::FRAC_PI_2;

/// Physiological maximum interaural delay, in seconds.
pub const MAX_ITD_SECONDS: f64 = 0.0006;

/// Largest accepted azimuth magnitude (full head rotation is not modelled).
pub const AZIMUTH_LIMIT: f64 = FRAC_PI_2;

/// Total interaural spread at the azimuth extremes, in whole samples.
pub fn max_deviation_samples(max_itd_seconds: f64, sample_rate: u32) -> i64 {
    (max_itd_seconds * sample_rate as f64).floor() as i64
}

/// Per-ear cursor offsets for one azimuth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ItdOffsets {
    pub left: i64,
    pub right: i64,
}

impl ItdOffsets {
    /// `delta = angle / (pi/2) * max_deviation / 2`, rounded half away from zero
    /// and kept within half the maximum deviation.
    pub fn for_angle(angle: f64, sample_rate: u32, max_itd_seconds: f64) -> Self {
        let max_deviation = max_deviation_samples(max_itd_seconds, sample_rate);
        let delta = (angle / FRAC_PI_2) * max_deviation as f64 / 2.0;

        let limit = max_deviation / 2;
        let right = (delta.round() as i64).clamp(-limit, limit);

        Self { left: -right, right }
    }

    /// Checked variant of [`ItdOffsets::for_angle`].
    pub fn try_for_angle(angle: f64, sample_rate: u32, max_itd_seconds: f64) -> Result<Self> {
        let angle = validate_angle(angle)?;
        Ok(Self::for_angle(angle, sample_rate, max_itd_seconds))
    }

    /// Interaural difference in samples (right minus left).
    pub fn spread(&self) -> i64 {
        self.right - self.left
    }
}

/// Reject NaN, infinities and angles behind the listener.
pub(crate) fn validate_angle(angle: f64) -> Result<f64> {
    if !angle.is_finite() || angle.abs() > AZIMUTH_LIMIT {
        return Err(Error::InvalidAngle(angle));
    }
    Ok(angle)
}
