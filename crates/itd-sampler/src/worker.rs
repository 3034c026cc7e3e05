//! Long-lived render thread for one ear.
//!
//! Each cycle fills one frame from the shared buffer through the channel's
//! cursor and hands it to the sink. The sink's blocking `write` paces the
//! loop; a paused sink parks the thread inside `write` until resumed or
//! stopped. The liveness flag is checked once per frame.

use crate::metrics::ChannelMetrics;
use crate::{Error, Result};
use itd_core::{fill_frame, AtomicFlag, ChannelSide, Cursor, OutputSink, SampleBuffer};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use thread_priority::ThreadPriority;

/// Everything a render thread needs, moved into it at spawn.
pub struct RenderContext {
    pub buffer: SampleBuffer,
    pub cursor: Arc<Cursor>,
    pub sink: Arc<dyn OutputSink>,
    pub looping: Arc<AtomicFlag>,
    pub frame_size: usize,
    pub realtime_priority: bool,
}

pub struct ChannelWorker {
    side: ChannelSide,
    running: Arc<AtomicFlag>,
    metrics: Arc<ChannelMetrics>,
    sink: Option<Arc<dyn OutputSink>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl ChannelWorker {
    pub fn new(side: ChannelSide) -> Self {
        Self {
            side,
            running: Arc::new(AtomicFlag::new(false)),
            metrics: Arc::new(ChannelMetrics::new()),
            sink: None,
            thread_handle: None,
        }
    }

    pub fn side(&self) -> ChannelSide {
        self.side
    }

    /// Spawn the render thread. Does nothing if one is already running; a
    /// thread that exited on its own is reaped and replaced.
    pub fn start(&mut self, ctx: RenderContext) -> Result<()> {
        if let Some(handle) = self.thread_handle.take() {
            if !handle.is_finished() {
                self.thread_handle = Some(handle);
                return Ok(());
            }
            if handle.join().is_err() {
                tracing::error!("{} render thread panicked", self.side);
            }
        }

        self.running.set(true);
        self.metrics.reset_position_state();
        self.sink = Some(Arc::clone(&ctx.sink));

        let side = self.side;
        let running = Arc::clone(&self.running);
        let metrics = Arc::clone(&self.metrics);

        let handle = thread::Builder::new()
            .name(format!("itd-{side}"))
            .spawn(move || render_loop(side, ctx, running, metrics))
            .map_err(|e| {
                self.running.set(false);
                Error::Spawn(side, e)
            })?;

        self.thread_handle = Some(handle);
        Ok(())
    }

    /// Clear the liveness flag without waiting. The thread exits after its
    /// current frame, or once its sink is stopped if it is blocked in `write`.
    pub fn request_stop(&self) {
        self.running.set(false);
    }

    /// Clear the liveness flag, stop the sink to release a blocked write,
    /// and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.running.set(false);

        if let Some(sink) = self.sink.take() {
            sink.stop();
        }

        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                tracing::error!("{} render thread panicked", self.side);
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.thread_handle
            .as_ref()
            .map(|h| !h.is_finished())
            .unwrap_or(false)
    }

    pub fn metrics(&self) -> Arc<ChannelMetrics> {
        Arc::clone(&self.metrics)
    }
}

impl Drop for ChannelWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn render_loop(
    side: ChannelSide,
    ctx: RenderContext,
    running: Arc<AtomicFlag>,
    metrics: Arc<ChannelMetrics>,
) {
    if ctx.realtime_priority {
        if let Err(e) = thread_priority::set_current_thread_priority(ThreadPriority::Max) {
            tracing::debug!("{side} render thread keeps default priority: {e:?}");
        }
    }

    let mut frame = vec![0i16; ctx.frame_size];
    let mut seen_underruns = ctx.sink.underrun_count();
    let mut at_end = false;

    tracing::debug!("{side} render thread started ({} samples/frame)", ctx.frame_size);

    while running.get() {
        let looping = ctx.looping.get();
        let report = ctx
            .cursor
            .render(|position| fill_frame(ctx.buffer.samples(), position, &mut frame, looping));
        metrics.record_fill(&report);

        if report.past_end != at_end {
            at_end = report.past_end;
            if at_end {
                tracing::debug!("{side} channel reached end of track");
            }
        }

        match ctx.sink.write(&frame) {
            Ok(()) => metrics.record_write(),
            Err(itd_core::Error::SinkClosed) if !running.get() => break,
            Err(e) => {
                tracing::error!("{side} sink write failed: {e}");
                break;
            }
        }

        let underruns = ctx.sink.underrun_count();
        if underruns > seen_underruns {
            tracing::warn!(
                "{side} channel buffer underrun ({} new)",
                underruns - seen_underruns
            );
            metrics.record_underruns(underruns - seen_underruns);
            seen_underruns = underruns;
        }
    }

    running.set(false);
    tracing::debug!("{side} render thread exiting");
}
