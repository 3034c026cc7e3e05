//! Builder for configuring and constructing an `ItdEngine`.

use crate::{ItdEngine, Result};
use itd_core::{EngineConfig, OutputSink, SampleBuffer};
use std::path::Path;
use std::sync::Arc;

/// Sinks come from [`sinks()`](Self::sinks); without them the engine opens
/// the default output device, which needs the `device` feature.
///
/// # Example
///
/// ```ignore
/// use itd::prelude::*;
///
/// let mut engine = ItdEngine::builder()
///     .looping(true)
///     .angle(-0.5)
///     .build_from_file("voice.wav")?;
///
/// engine.play()?;
/// ```
#[derive(Default)]
pub struct ItdEngineBuilder {
    config: EngineConfig,
    sinks: Option<[Arc<dyn OutputSink>; 2]>,

    #[cfg(feature = "device")]
    output_device: Option<usize>,
}

impl ItdEngineBuilder {
    /// Replace the whole configuration. Later setters still apply on top.
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: false
    pub fn looping(mut self, looping: bool) -> Self {
        self.config.looping = looping;
        self
    }

    /// Initial azimuth in radians. Default: 0.0 (straight ahead)
    pub fn angle(mut self, radians: f64) -> Self {
        self.config.initial_angle = radians;
        self
    }

    /// Samples per frame. Default: the sinks' platform minimum
    pub fn frame_size(mut self, samples: usize) -> Self {
        self.config.frame_size = Some(samples);
        self
    }

    pub fn volume(mut self, left: f32, right: f32) -> Self {
        self.config.left_volume = left;
        self.config.right_volume = right;
        self
    }

    /// Interaural delay at +-90 degrees. Default: 0.0006 s
    pub fn max_itd(mut self, seconds: f64) -> Self {
        self.config.max_itd_seconds = seconds;
        self
    }

    /// Default: true
    pub fn realtime_priority(mut self, enabled: bool) -> Self {
        self.config.realtime_priority = enabled;
        self
    }

    /// Route the left and right ear to caller-provided sinks.
    pub fn sinks(mut self, left: Arc<dyn OutputSink>, right: Arc<dyn OutputSink>) -> Self {
        self.sinks = Some([left, right]);
        self
    }

    /// Output device index (see `CpalSink::list_devices`). Default: system default
    #[cfg(feature = "device")]
    pub fn output_device(mut self, index: usize) -> Self {
        self.output_device = Some(index);
        self
    }

    pub fn build(self, buffer: SampleBuffer) -> Result<ItdEngine> {
        let sinks = match self.sinks {
            Some(sinks) => sinks,
            None => default_sinks(
                buffer.sample_rate(),
                #[cfg(feature = "device")]
                self.output_device,
            )?,
        };

        ItdEngine::from_parts(buffer, sinks, self.config)
    }

    /// Decode a 16-bit mono WAV file and build an engine over it.
    pub fn build_from_file(self, path: impl AsRef<Path>) -> Result<ItdEngine> {
        let buffer = itd_sampler::decode_wav_file(path)?;
        self.build(buffer)
    }
}

#[cfg(feature = "device")]
fn default_sinks(sample_rate: u32, device: Option<usize>) -> Result<[Arc<dyn OutputSink>; 2]> {
    use itd_core::ChannelSide;
    use itd_sampler::CpalSink;

    let open = |side| {
        let sink = CpalSink::new(side, sample_rate);
        let sink = match device {
            Some(index) => sink.with_device(index),
            None => sink,
        };
        Arc::new(sink) as Arc<dyn OutputSink>
    };
    Ok([open(ChannelSide::Left), open(ChannelSide::Right)])
}

#[cfg(not(feature = "device"))]
fn default_sinks(_sample_rate: u32) -> Result<[Arc<dyn OutputSink>; 2]> {
    Err(itd_core::Error::DeviceUnavailable(
        "no sinks given and the `device` feature is disabled".into(),
    )
    .into())
}
