//! Error types for itd-core.

use crate::state::{LifecycleOp, PlaybackState};
use thiserror::Error;

/// Error type for itd-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// The decoded input cannot be played (wrong channel count, rate too low, ...).
    #[error("Decode error: {0}")]
    Decode(String),

    /// An output sink could not be created or started.
    #[error("Output device unavailable: {0}")]
    DeviceUnavailable(String),

    /// A write reached a sink that has been stopped or released.
    #[error("Output sink closed")]
    SinkClosed,

    /// A lifecycle operation was requested from a state that does not allow it.
    #[error("Cannot {op} while {state}")]
    InvalidState {
        op: LifecycleOp,
        state: PlaybackState,
    },

    #[error("Invalid azimuth {0} rad: must be finite and within -pi/2..=pi/2")]
    InvalidAngle(f64),

    #[error("Invalid volume {0}: must be finite")]
    InvalidVolume(f32),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, Error>;
