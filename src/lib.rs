//! # itd - Binaural ITD Playback
//!
//! Places a mono source left or right of the listener by delaying one ear's
//! copy of the signal against the other by a fraction of a millisecond (an
//! interaural time difference).
//!
//! ## Architecture
//!
//! `itd` is an umbrella crate that coordinates:
//! - **itd-core** - Sample buffer, cursors, offset math, frame fill, playback state
//! - **itd-sampler** - WAV decoding, per-ear render threads, output sinks
//!
//! ## Quick Start
//!
//! ```ignore
//! use itd::prelude::*;
//!
//! let mut engine = ItdEngine::builder()
//!     .looping(true)
//!     .build_from_file("voice.wav")?;
//!
//! engine.play()?;
//!
//! // Sweep from hard left to hard right
//! for step in 0..=20 {
//!     engine.set_angle(-FRAC_PI_2 + step as f64 * PI / 20.0)?;
//!     std::thread::sleep(std::time::Duration::from_millis(100));
//! }
//!
//! engine.stop()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `device` - Hardware output through CPAL

/// Re-export of itd-core for direct access
pub use itd_core as core;

/// Re-export of itd-sampler for direct access
pub use itd_sampler as sampler;

pub use itd_core::{
    max_deviation_samples,
    // Audio data
    ChannelSide,
    Cursor,
    CursorSnapshot,
    DecodedAudio,
    // Config
    EngineConfig,
    ItdOffsets,
    // Lifecycle
    LifecycleOp,
    OutputSink,
    PlaybackState,
    SampleBuffer,
    Transition,
    AZIMUTH_LIMIT,
    MAX_ITD_SECONDS,
    MIN_SAMPLE_RATE,
};

pub use itd_sampler::{
    decode_wav, decode_wav_file, CaptureSink, ChannelMetrics, MetricsSnapshot,
};

#[cfg(feature = "device")]
pub use itd_sampler::CpalSink;

mod builder;
mod engine;
mod error;

pub use builder::ItdEngineBuilder;
pub use engine::ItdEngine;
pub use error::{Error, Result};

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{ItdEngine, ItdEngineBuilder};

    // Essential types
    pub use crate::core::{ChannelSide, EngineConfig, OutputSink, PlaybackState, SampleBuffer, Transition};

    // Sinks
    pub use crate::sampler::CaptureSink;
    #[cfg(feature = "device")]
    pub use crate::sampler::CpalSink;

    pub use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
}
