//! Wall-clock playback epoch.

use std::time::{Duration, Instant};

/// Wall-clock time since playback started.
///
/// An approximation of the audible position: it keeps counting while paused
/// and drifts from the device clock under scheduling jitter. Use the cursor
/// position when sample accuracy matters.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaybackEpoch {
    started: Option<Instant>,
}

impl PlaybackEpoch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.started = Some(Instant::now());
    }

    pub fn clear(&mut self) {
        self.started = None;
    }

    pub fn is_set(&self) -> bool {
        self.started.is_some()
    }

    /// Zero when no playback is in progress.
    pub fn elapsed(&self) -> Duration {
        self.started.map(|t| t.elapsed()).unwrap_or_default()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}
