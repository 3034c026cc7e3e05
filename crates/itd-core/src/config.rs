//! Engine configuration.

use crate::itd::{validate_angle, MAX_ITD_SECONDS};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Configuration for an ITD engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wrap to the buffer start instead of falling silent at the end.
    pub looping: bool,
    /// Samples per rendered frame. `None` uses the largest of the sinks'
    /// platform minimum buffer sizes.
    pub frame_size: Option<usize>,
    /// Azimuth in radians applied before the first frame.
    pub initial_angle: f64,
    pub left_volume: f32,
    pub right_volume: f32,
    /// Interaural delay at the azimuth extremes, in seconds.
    pub max_itd_seconds: f64,
    /// Raise render threads to the highest scheduling priority available.
    pub realtime_priority: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            looping: false,
            frame_size: None,
            initial_angle: 0.0,
            left_volume: 1.0,
            right_volume: 1.0,
            max_itd_seconds: MAX_ITD_SECONDS,
            realtime_priority: true,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> Result<()> {
        if self.frame_size == Some(0) {
            return Err(Error::InvalidConfig("frame_size must be non-zero".into()));
        }

        if !(self.max_itd_seconds > 0.0 && self.max_itd_seconds <= 0.01) {
            return Err(Error::InvalidConfig(format!(
                "max_itd_seconds {} out of range (0-0.01 s)",
                self.max_itd_seconds
            )));
        }

        for volume in [self.left_volume, self.right_volume] {
            if !volume.is_finite() {
                return Err(Error::InvalidVolume(volume));
            }
        }

        validate_angle(self.initial_angle)?;
        Ok(())
    }
}
