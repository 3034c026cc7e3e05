//! Per-channel render statistics.
//!
//! Written by the render thread, read by the control thread.

use itd_core::FillReport;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct ChannelMetrics {
    frames_written: AtomicU64,
    samples_copied: AtomicU64,
    loop_wraps: AtomicU64,
    underruns: AtomicU64,
    /// Last rendered frame lay entirely past the end of a non-looping buffer.
    past_end: AtomicBool,
}

/// Point-in-time copy of [`ChannelMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub frames_written: u64,
    pub samples_copied: u64,
    pub loop_wraps: u64,
    pub underruns: u64,
    pub past_end: bool,
}

impl ChannelMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_fill(&self, report: &FillReport) {
        self.samples_copied
            .fetch_add(report.copied as u64, Ordering::Relaxed);
        if report.wrapped {
            self.loop_wraps.fetch_add(1, Ordering::Relaxed);
        }
        self.past_end.store(report.past_end, Ordering::Release);
    }

    #[inline]
    pub(crate) fn record_write(&self) {
        self.frames_written.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_underruns(&self, count: u64) {
        self.underruns.fetch_add(count, Ordering::Relaxed);
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written.load(Ordering::Relaxed)
    }

    pub fn is_past_end(&self) -> bool {
        self.past_end.load(Ordering::Acquire)
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_written: self.frames_written.load(Ordering::Relaxed),
            samples_copied: self.samples_copied.load(Ordering::Relaxed),
            loop_wraps: self.loop_wraps.load(Ordering::Relaxed),
            underruns: self.underruns.load(Ordering::Relaxed),
            past_end: self.past_end.load(Ordering::Acquire),
        }
    }

    /// Clear the end-of-track marker after a restart.
    pub(crate) fn reset_position_state(&self) {
        self.past_end.store(false, Ordering::Release);
    }
}
