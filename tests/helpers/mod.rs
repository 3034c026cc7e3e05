//! Test helpers and fixtures for itd integration tests
//!
//! Engines here write into in-memory [`CaptureSink`]s, so no audio hardware
//! is needed and every rendered frame can be inspected.

#![allow(dead_code)]

use itd::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Upper bound on any single wait for the render threads.
pub const TIMEOUT: Duration = Duration::from_secs(2);

/// Frames a capture sink holds before the render thread blocks.
pub const SINK_CAPACITY: usize = 4;

/// Route `tracing` output through the test harness. Set `RUST_LOG` to see it.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub struct TestEngine {
    pub engine: ItdEngine,
    pub left: Arc<CaptureSink>,
    pub right: Arc<CaptureSink>,
}

impl TestEngine {
    pub fn sink(&self, side: ChannelSide) -> &CaptureSink {
        match side {
            ChannelSide::Left => &self.left,
            ChannelSide::Right => &self.right,
        }
    }

    /// Next `count` frames from one ear, priming frame included.
    pub fn take(&self, side: ChannelSide, count: usize) -> Vec<Vec<i16>> {
        let frames = self.sink(side).take_frames(count, TIMEOUT);
        assert_eq!(frames.len(), count, "{side} channel stalled");
        frames
    }
}

/// Engine over `samples` with capture sinks on both ears.
pub fn capture_engine(samples: Vec<i16>, sample_rate: u32, frame_size: usize) -> TestEngine {
    capture_engine_with(samples, sample_rate, |b| b.frame_size(frame_size))
}

pub fn capture_engine_with(
    samples: Vec<i16>,
    sample_rate: u32,
    configure: impl FnOnce(ItdEngineBuilder) -> ItdEngineBuilder,
) -> TestEngine {
    init_tracing();

    let left = Arc::new(CaptureSink::new(SINK_CAPACITY, 64));
    let right = Arc::new(CaptureSink::new(SINK_CAPACITY, 64));
    let buffer = SampleBuffer::new(samples, sample_rate).expect("valid test buffer");

    let builder = ItdEngine::builder()
        .realtime_priority(false)
        .sinks(left.clone(), right.clone());
    let engine = configure(builder)
        .build(buffer)
        .expect("Failed to create test engine");

    TestEngine {
        engine,
        left,
        right,
    }
}

/// `1, 2, 3, ...`: every value is its index plus one, so silence (0) never
/// looks like signal.
pub fn ramp(len: usize) -> Vec<i16> {
    (1..=len).map(|i| i as i16).collect()
}

pub fn concat(frames: &[Vec<i16>]) -> Vec<i16> {
    frames.iter().flatten().copied().collect()
}

/// Differences between neighbouring samples.
pub fn steps(samples: &[i16]) -> Vec<i32> {
    samples
        .windows(2)
        .map(|w| w[1] as i32 - w[0] as i32)
        .collect()
}

/// Poll `condition` until it holds or [`TIMEOUT`] passes.
pub fn wait_until(mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + TIMEOUT;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// Write a 16-bit PCM WAV file.
pub fn write_wav(path: &Path, channels: u16, sample_rate: u32, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for &sample in samples {
        writer.write_sample(sample).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}
