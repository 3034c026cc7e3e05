//! Playback side of the ITD engine: WAV decoding, per-ear render threads and
//! output sinks.
//!
//! - [`decode_wav`] / [`decode_wav_file`]: 16-bit mono PCM into a [`SampleBuffer`](itd_core::SampleBuffer)
//! - [`ChannelWorker`]: long-lived render thread for one ear
//! - [`CaptureSink`]: in-memory [`OutputSink`](itd_core::OutputSink) for tests and offline use
//! - `CpalSink`: hardware output (feature `device`)

pub mod error;
pub use error::{Error, Result};

mod capture;
pub use capture::CaptureSink;

mod decode;
pub use decode::{decode_wav, decode_wav_file, decode_wav_pcm};

mod metrics;
pub use metrics::{ChannelMetrics, MetricsSnapshot};

#[cfg(feature = "device")]
mod output;
#[cfg(feature = "device")]
pub use output::CpalSink;

mod worker;
pub use worker::{ChannelWorker, RenderContext};
