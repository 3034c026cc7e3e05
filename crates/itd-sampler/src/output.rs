//! CPAL-backed output sink (requires the `device` feature).
//!
//! Each sink opens its own output stream and drives one side of the device:
//! the left-ear sink writes channel 0, the right-ear sink channel 1, every
//! other channel stays silent. Frames travel to the device callback through a
//! two-slot bounded channel, so `write` blocks once the device falls behind
//! or is paused.

use crossbeam_channel::{bounded, select, Receiver, Sender, TryRecvError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use itd_core::{AtomicFlag, AtomicFloat, ChannelSide, Error, OutputSink, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const QUEUED_FRAMES: usize = 2;
const FALLBACK_BUFFER_FRAMES: usize = 1024;

/// Wrapper to hold `cpal::Stream` in a `Send` context.
///
/// # Safety
/// `cpal::Stream` is `!Send` due to platform internals. This is safe because
/// the stream is only touched behind the sink's `Mutex`, from the control
/// thread.
struct StreamHandle(cpal::Stream);

unsafe impl Send for StreamHandle {}

struct ActiveStream {
    stream: StreamHandle,
    frames: Sender<Vec<i16>>,
    /// Dropped on stop so blocked writers wake up.
    _closing: Sender<()>,
    closed: Receiver<()>,
}

pub struct CpalSink {
    side: ChannelSide,
    device_index: Option<usize>,
    sample_rate: u32,
    volume: Arc<AtomicFloat>,
    underruns: Arc<AtomicU64>,
    active: Mutex<Option<ActiveStream>>,
    released: AtomicFlag,
}

impl CpalSink {
    /// Sink on the default output device. The device is opened on `play()`.
    pub fn new(side: ChannelSide, sample_rate: u32) -> Self {
        Self {
            side,
            device_index: None,
            sample_rate,
            volume: Arc::new(AtomicFloat::new(1.0)),
            underruns: Arc::new(AtomicU64::new(0)),
            active: Mutex::new(None),
            released: AtomicFlag::new(false),
        }
    }

    pub fn with_device(mut self, index: usize) -> Self {
        self.device_index = Some(index);
        self
    }

    pub fn side(&self) -> ChannelSide {
        self.side
    }

    pub fn list_devices() -> Result<Vec<String>> {
        let devices = cpal::default_host()
            .output_devices()
            .map_err(device_error)?;
        devices
            .enumerate()
            .map(|(i, d)| Ok(format!("{i}: {}", d.name().map_err(device_error)?)))
            .collect()
    }

    fn open(&self) -> Result<ActiveStream> {
        let device = get_device(self.device_index)?;
        let supported = device.default_output_config().map_err(device_error)?;

        let config = cpal::StreamConfig {
            channels: supported.channels(),
            sample_rate: cpal::SampleRate(self.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let (frames_tx, frames_rx) = bounded(QUEUED_FRAMES);
        let (closing_tx, closing_rx) = bounded(0);

        let feed = FeedState {
            frames: frames_rx,
            current: Vec::new(),
            read: 0,
            ear: ear_channel(self.side, config.channels as usize),
            volume: Arc::clone(&self.volume),
            underruns: Arc::clone(&self.underruns),
        };

        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, feed)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, feed)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, feed)?,
            format => {
                return Err(Error::DeviceUnavailable(format!(
                    "unsupported sample format: {format:?}"
                )));
            }
        };

        tracing::debug!(
            "Opened {} output stream ({} ch @ {} Hz)",
            self.side,
            config.channels,
            self.sample_rate
        );

        Ok(ActiveStream {
            stream: StreamHandle(stream),
            frames: frames_tx,
            _closing: closing_tx,
            closed: closing_rx,
        })
    }
}

impl OutputSink for CpalSink {
    fn play(&self) -> Result<()> {
        if self.released.get() {
            return Err(Error::DeviceUnavailable(format!(
                "{} sink released",
                self.side
            )));
        }

        let mut active = self.active.lock();
        if active.is_none() {
            *active = Some(self.open()?);
        }

        if let Some(ref stream) = *active {
            stream
                .stream
                .0
                .play()
                .map_err(|e| Error::DeviceUnavailable(e.to_string()))?;
        }
        Ok(())
    }

    fn pause(&self) {
        if let Some(ref active) = *self.active.lock() {
            if let Err(e) = active.stream.0.pause() {
                tracing::warn!("Failed to pause {} output stream: {e}", self.side);
            }
        }
    }

    fn stop(&self) {
        // Dropping the stream closes the channels and wakes blocked writers.
        self.active.lock().take();
    }

    fn release(&self) {
        self.released.set(true);
        self.stop();
    }

    fn write(&self, frame: &[i16]) -> Result<()> {
        let (frames, closed) = match *self.active.lock() {
            Some(ref active) => (active.frames.clone(), active.closed.clone()),
            None => return Err(Error::SinkClosed),
        };

        let frame = frame.to_vec();
        select! {
            send(frames, frame) -> res => res.map_err(|_| Error::SinkClosed),
            recv(closed) -> _ => Err(Error::SinkClosed),
        }
    }

    fn set_volume(&self, volume: f32) {
        self.volume.set(volume);
    }

    fn min_buffer_frames(&self, _sample_rate: u32) -> usize {
        let Ok(device) = get_device(self.device_index) else {
            return FALLBACK_BUFFER_FRAMES;
        };
        match device.default_output_config().map(|c| c.buffer_size().clone()) {
            Ok(cpal::SupportedBufferSize::Range { min, .. }) => (min as usize).max(256),
            _ => FALLBACK_BUFFER_FRAMES,
        }
    }

    fn underrun_count(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }
}

/// Callback-side state: the frame being played out and where we are in it.
struct FeedState {
    frames: Receiver<Vec<i16>>,
    current: Vec<i16>,
    read: usize,
    ear: usize,
    volume: Arc<AtomicFloat>,
    underruns: Arc<AtomicU64>,
}

impl FeedState {
    #[inline]
    fn next_sample(&mut self, starved: &mut bool) -> f32 {
        if self.read >= self.current.len() {
            match self.frames.try_recv() {
                Ok(frame) => {
                    self.current = frame;
                    self.read = 0;
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => {
                    *starved = true;
                    return 0.0;
                }
            }
        }
        let sample = self.current.get(self.read).copied().unwrap_or(0);
        self.read += 1;
        sample as f32 / 32768.0
    }
}

fn ear_channel(side: ChannelSide, channels: usize) -> usize {
    match side {
        ChannelSide::Right if channels > 1 => 1,
        _ => 0,
    }
}

fn device_error(e: impl std::fmt::Display) -> Error {
    Error::DeviceUnavailable(e.to_string())
}

fn get_device(index: Option<usize>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    match index {
        Some(i) => {
            let devices: Vec<_> = host.output_devices().map_err(device_error)?.collect();
            let count = devices.len();
            devices.into_iter().nth(i).ok_or_else(|| {
                Error::DeviceUnavailable(format!(
                    "device index {i} out of range ({count} available)"
                ))
            })
        }
        None => host
            .default_output_device()
            .ok_or_else(|| Error::DeviceUnavailable("no output device available".into())),
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut feed: FeedState,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let channels = config.channels as usize;

    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                let gain = feed.volume.get();
                let mut starved = false;

                for frame in data.chunks_mut(channels) {
                    let value = feed.next_sample(&mut starved) * gain;
                    for (ch, sample) in frame.iter_mut().enumerate() {
                        *sample = T::from_sample(if ch == feed.ear { value } else { 0.0 });
                    }
                }

                if starved {
                    feed.underruns.fetch_add(1, Ordering::Relaxed);
                }
            },
            |err| tracing::error!("Output stream error: {err}"),
            None,
        )
        .map_err(device_error)
}
