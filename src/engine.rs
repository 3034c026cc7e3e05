//! ItdEngine that coordinates the buffer, both ear channels and their sinks

use crate::Result;
use itd_core::{
    max_deviation_samples, AtomicFlag, ChannelSide, Cursor, CursorSnapshot, EngineConfig,
    ItdOffsets, LifecycleOp, OutputSink, PlaybackEpoch, PlaybackFsm, PlaybackState, SampleBuffer,
    Transition,
};
use itd_sampler::{ChannelWorker, MetricsSnapshot, RenderContext};
use std::sync::Arc;

/// Binaural playback of one mono buffer with an interaural time difference.
///
/// Both ears read the same [`SampleBuffer`] through their own cursor. The
/// azimuth set with [`set_angle`](Self::set_angle) moves the cursors apart by
/// a few samples, so one ear hears the signal slightly before the other.
///
/// Lifecycle calls that are not valid in the current state are ignored with a
/// warning and report [`Transition::Ignored`]; after [`release`](Self::release)
/// every call is ignored. The control surface takes `&mut self`, so callers on
/// several threads must serialize access themselves.
///
/// # Example
///
/// ```
/// use itd::prelude::*;
/// use std::sync::Arc;
///
/// let buffer = SampleBuffer::new(vec![0; 32000], 16000)?;
/// let left = Arc::new(CaptureSink::default());
/// let right = Arc::new(CaptureSink::default());
///
/// let mut engine = ItdEngine::builder()
///     .frame_size(256)
///     .sinks(left.clone(), right.clone())
///     .build(buffer)?;
///
/// engine.play()?;
/// engine.set_angle(std::f64::consts::FRAC_PI_4)?;
/// assert_eq!(engine.duration(), 2000);
/// engine.release()?;
/// # Ok::<(), itd::Error>(())
/// ```
pub struct ItdEngine {
    buffer: SampleBuffer,
    cursors: [Arc<Cursor>; 2],
    sinks: [Arc<dyn OutputSink>; 2],
    workers: [ChannelWorker; 2],

    fsm: PlaybackFsm,
    epoch: PlaybackEpoch,

    angle: f64,
    volumes: [f32; 2],
    /// Shared with both render threads, read once per frame.
    looping: Arc<AtomicFlag>,
    frame_size: usize,
    config: EngineConfig,
}

impl ItdEngine {
    /// Create a new engine builder
    pub fn builder() -> crate::ItdEngineBuilder {
        crate::ItdEngineBuilder::default()
    }

    /// Engine with the default configuration over two caller-supplied sinks.
    pub fn new(
        buffer: SampleBuffer,
        left: Arc<dyn OutputSink>,
        right: Arc<dyn OutputSink>,
    ) -> Result<Self> {
        Self::from_parts(buffer, [left, right], EngineConfig::default())
    }

    pub(crate) fn from_parts(
        buffer: SampleBuffer,
        sinks: [Arc<dyn OutputSink>; 2],
        config: EngineConfig,
    ) -> Result<Self> {
        config.validate()?;

        if max_deviation_samples(config.max_itd_seconds, buffer.sample_rate()) < 2 {
            return Err(itd_core::Error::InvalidConfig(format!(
                "max_itd_seconds {} spans under 2 samples at {} Hz",
                config.max_itd_seconds,
                buffer.sample_rate()
            ))
            .into());
        }

        let frame_size = config.frame_size.unwrap_or_else(|| {
            sinks
                .iter()
                .map(|sink| sink.min_buffer_frames(buffer.sample_rate()))
                .max()
                .unwrap_or(1)
                .max(1)
        });

        let mut engine = Self {
            cursors: [Arc::new(Cursor::new()), Arc::new(Cursor::new())],
            workers: [
                ChannelWorker::new(ChannelSide::Left),
                ChannelWorker::new(ChannelSide::Right),
            ],
            fsm: PlaybackFsm::new(),
            epoch: PlaybackEpoch::new(),
            angle: config.initial_angle,
            volumes: [1.0, 1.0],
            looping: Arc::new(AtomicFlag::new(config.looping)),
            frame_size,
            sinks,
            buffer,
            config,
        };

        engine.apply_volume(ChannelSide::Left, engine.config.left_volume);
        engine.apply_volume(ChannelSide::Right, engine.config.right_volume);
        engine.update_itd();

        tracing::debug!(
            "ITD engine ready: {} samples @ {} Hz, {} samples/frame",
            engine.buffer.len(),
            engine.buffer.sample_rate(),
            engine.frame_size
        );

        Ok(engine)
    }

    // ==================== Lifecycle ====================

    /// Start playback, resume from pause, or restart from the top after `stop()`.
    ///
    /// Starting primes each sink with one frame of silence before the render
    /// threads begin. If a sink cannot start, both are stopped again, the
    /// state rolls back and the error is returned. A failed resume leaves
    /// both sinks paused and the engine in `Paused`.
    pub fn play(&mut self) -> Result<Transition> {
        let from = self.fsm.state();
        if from == PlaybackState::Paused {
            self.resume_sinks()?;
        }

        let transition = match self.fsm.transition(LifecycleOp::Play) {
            Ok(t) => t,
            Err(e) => return ignored(e),
        };

        if from == PlaybackState::Paused {
            tracing::debug!("Resumed playback");
            return Ok(transition);
        }

        if let Err(e) = self.start_channels(from == PlaybackState::Stopped) {
            tracing::error!("Failed to start playback: {e}");
            self.stop_channels();
            self.fsm.abort_start(from);
            return Err(e);
        }

        self.epoch.start();
        let to = match self.fsm.transition(LifecycleOp::Play)? {
            Transition::Changed { to, .. } => to,
            Transition::Ignored { state } => state,
        };
        tracing::debug!("Playback started from {from}");
        Ok(Transition::Changed { from, to })
    }

    /// Pause both sinks. The render threads stay alive, parked in their writes.
    pub fn pause(&mut self) -> Result<Transition> {
        let transition = match self.fsm.transition(LifecycleOp::Pause) {
            Ok(t) => t,
            Err(e) => return ignored(e),
        };

        for sink in &self.sinks {
            sink.pause();
        }
        tracing::debug!("Playback paused");
        Ok(transition)
    }

    /// Stop both channels and join their render threads. Cursors keep their
    /// positions; the next `play()` rewinds them.
    pub fn stop(&mut self) -> Result<Transition> {
        let transition = match self.fsm.transition(LifecycleOp::Stop) {
            Ok(t) => t,
            Err(e) => return ignored(e),
        };

        self.stop_channels();
        self.epoch.clear();
        tracing::debug!("Playback stopped");
        Ok(transition)
    }

    /// Stop if needed and release both sinks. Terminal.
    pub fn release(&mut self) -> Result<Transition> {
        let transition = match self.fsm.transition(LifecycleOp::Release) {
            Ok(t) => t,
            Err(e) => return ignored(e),
        };

        self.stop_channels();
        for sink in &self.sinks {
            sink.release();
        }
        self.epoch.clear();
        tracing::debug!("Engine released");
        Ok(transition)
    }

    /// Resume both sinks or neither: a failure re-pauses the ones already resumed.
    fn resume_sinks(&self) -> Result<()> {
        for (i, sink) in self.sinks.iter().enumerate() {
            if let Err(e) = sink.play() {
                for resumed in &self.sinks[..i] {
                    resumed.pause();
                }
                tracing::error!("Failed to resume playback: {e}");
                return Err(e.into());
            }
        }
        Ok(())
    }

    fn start_channels(&mut self, restart: bool) -> Result<()> {
        if restart {
            for cursor in &self.cursors {
                cursor.rewind();
            }
        }

        let silence = vec![0i16; self.frame_size];
        for sink in &self.sinks {
            sink.play()?;
            sink.write(&silence)?;
        }

        for side in ChannelSide::BOTH {
            let i = side.index();
            self.workers[i].start(RenderContext {
                buffer: self.buffer.clone(),
                cursor: Arc::clone(&self.cursors[i]),
                sink: Arc::clone(&self.sinks[i]),
                looping: Arc::clone(&self.looping),
                frame_size: self.frame_size,
                realtime_priority: self.config.realtime_priority,
            })?;
        }
        Ok(())
    }

    fn stop_channels(&mut self) {
        for worker in &self.workers {
            worker.request_stop();
        }
        for sink in &self.sinks {
            sink.stop();
        }
        for worker in &mut self.workers {
            worker.stop();
        }
    }

    // ==================== Spatial / mix control ====================

    /// Set the azimuth in radians, `-pi/2..=pi/2`, positive to the right.
    ///
    /// Takes effect on the next frame each channel renders.
    pub fn set_angle(&mut self, angle: f64) -> Result<()> {
        if !self.usable(LifecycleOp::SetAngle) {
            return Ok(());
        }

        let offsets = ItdOffsets::try_for_angle(
            angle,
            self.buffer.sample_rate(),
            self.config.max_itd_seconds,
        )?;
        self.angle = angle;
        self.shift_cursors(offsets);
        Ok(())
    }

    /// Recompute both offsets from the stored azimuth and shift the cursors.
    pub fn update_itd(&mut self) {
        let offsets = ItdOffsets::for_angle(
            self.angle,
            self.buffer.sample_rate(),
            self.config.max_itd_seconds,
        );
        self.shift_cursors(offsets);
    }

    fn shift_cursors(&self, offsets: ItdOffsets) {
        self.cursors[ChannelSide::Right.index()].shift(offsets.right);
        self.cursors[ChannelSide::Left.index()].shift(offsets.left);
        tracing::trace!(
            "ITD offsets: left {} / right {} samples",
            offsets.left,
            offsets.right
        );
    }

    /// Volumes are clamped to `0.0..=1.0`.
    pub fn set_volume(&mut self, left: f32, right: f32) -> Result<()> {
        if !self.usable(LifecycleOp::SetVolume) {
            return Ok(());
        }
        check_volume(left)?;
        check_volume(right)?;

        self.apply_volume(ChannelSide::Left, left);
        self.apply_volume(ChannelSide::Right, right);
        Ok(())
    }

    pub fn set_left_volume(&mut self, volume: f32) -> Result<()> {
        self.set_side_volume(ChannelSide::Left, volume)
    }

    pub fn set_right_volume(&mut self, volume: f32) -> Result<()> {
        self.set_side_volume(ChannelSide::Right, volume)
    }

    fn set_side_volume(&mut self, side: ChannelSide, volume: f32) -> Result<()> {
        if !self.usable(LifecycleOp::SetVolume) {
            return Ok(());
        }
        check_volume(volume)?;
        self.apply_volume(side, volume);
        Ok(())
    }

    fn apply_volume(&mut self, side: ChannelSide, volume: f32) {
        let volume = volume.clamp(0.0, 1.0);
        self.volumes[side.index()] = volume;
        self.sinks[side.index()].set_volume(volume);
    }

    /// Toggle looping; each channel picks it up on its next frame.
    pub fn set_looping(&mut self, looping: bool) {
        if self.usable(LifecycleOp::SetLooping) {
            self.looping.set(looping);
        }
    }

    fn usable(&self, op: LifecycleOp) -> bool {
        match self.fsm.ensure_usable(op) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Ignoring call: {e}");
                false
            }
        }
    }

    // ==================== Queries ====================

    pub fn state(&self) -> PlaybackState {
        self.fsm.state()
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// `(left, right)`
    pub fn volume(&self) -> (f32, f32) {
        (self.volumes[0], self.volumes[1])
    }

    pub fn is_looping(&self) -> bool {
        self.looping.get()
    }

    /// Wall-clock milliseconds since playback started; 0 unless playing or paused.
    pub fn current_position(&self) -> u64 {
        if self.fsm.state().is_alive() {
            self.epoch.elapsed_ms()
        } else {
            0
        }
    }

    /// Buffer length in milliseconds.
    pub fn duration(&self) -> u64 {
        self.buffer.duration_ms()
    }

    /// Always 1: the source is mono.
    pub fn channels(&self) -> u16 {
        self.buffer.channels()
    }

    pub fn sample_rate(&self) -> u32 {
        self.buffer.sample_rate()
    }

    pub fn sample_count(&self) -> usize {
        self.buffer.len()
    }

    pub fn samples(&self) -> &[i16] {
        self.buffer.samples()
    }

    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn cursor(&self, side: ChannelSide) -> CursorSnapshot {
        self.cursors[side.index()].snapshot()
    }

    /// Not looping and both cursors have run past the last sample.
    pub fn is_finished(&self) -> bool {
        let len = self.buffer.len() as i64;
        !self.looping.get()
            && self
                .cursors
                .iter()
                .all(|cursor| cursor.snapshot().position >= len)
    }

    pub fn metrics(&self, side: ChannelSide) -> MetricsSnapshot {
        self.workers[side.index()].metrics().snapshot()
    }
}

impl Drop for ItdEngine {
    fn drop(&mut self) {
        if self.fsm.state() != PlaybackState::Released {
            let _ = self.release();
        }
    }
}

fn ignored(err: itd_core::Error) -> Result<Transition> {
    match err {
        itd_core::Error::InvalidState { op, state } => {
            tracing::warn!("Ignoring {op}: engine is {state}");
            Ok(Transition::Ignored { state })
        }
        e => Err(e.into()),
    }
}

fn check_volume(volume: f32) -> Result<()> {
    if volume.is_finite() {
        Ok(())
    } else {
        Err(itd_core::Error::InvalidVolume(volume).into())
    }
}
