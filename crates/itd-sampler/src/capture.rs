//! In-memory output sink.
//!
//! Stands in for an audio device in tests and offline rendering. Frames are
//! queued up to a fixed capacity; once full, or while paused, `write` blocks
//! on a condition variable until a consumer drains frames, playback resumes,
//! or the sink is stopped.

use itd_core::{Error, OutputSink, Result};
use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SinkState {
    Stopped,
    Playing,
    Paused,
    Released,
}

struct CaptureState {
    state: SinkState,
    frames: VecDeque<Vec<i16>>,
    volume: f32,
    writes: u64,
}

pub struct CaptureSink {
    inner: Mutex<CaptureState>,
    /// Signalled when a writer may proceed (drain, resume, stop).
    writable: Condvar,
    /// Signalled when a frame is queued.
    readable: Condvar,
    capacity: usize,
    min_frames: usize,
}

impl CaptureSink {
    /// `capacity` is the number of frames held before writers block.
    pub fn new(capacity: usize, min_frames: usize) -> Self {
        Self {
            inner: Mutex::new(CaptureState {
                state: SinkState::Stopped,
                frames: VecDeque::with_capacity(capacity),
                volume: 1.0,
                writes: 0,
            }),
            writable: Condvar::new(),
            readable: Condvar::new(),
            capacity: capacity.max(1),
            min_frames: min_frames.max(1),
        }
    }

    /// Remove and return every queued frame, unblocking writers.
    pub fn drain(&self) -> Vec<Vec<i16>> {
        let mut inner = self.inner.lock();
        let frames = inner.frames.drain(..).collect();
        self.writable.notify_all();
        frames
    }

    /// Wait until at least `count` frames are queued, then drain them all.
    /// Returns whatever is queued if `timeout` passes first.
    pub fn wait_for_frames(&self, count: usize, timeout: Duration) -> Vec<Vec<i16>> {
        let mut inner = self.inner.lock();
        let deadline = std::time::Instant::now() + timeout;
        while inner.frames.len() < count {
            if self.readable.wait_until(&mut inner, deadline).timed_out() {
                break;
            }
        }
        let frames = inner.frames.drain(..).collect();
        self.writable.notify_all();
        frames
    }

    /// Drain exactly the next `count` frames, waiting as needed.
    pub fn take_frames(&self, count: usize, timeout: Duration) -> Vec<Vec<i16>> {
        let mut taken = Vec::with_capacity(count);
        let deadline = std::time::Instant::now() + timeout;
        let mut inner = self.inner.lock();
        while taken.len() < count {
            match inner.frames.pop_front() {
                Some(frame) => {
                    taken.push(frame);
                    self.writable.notify_all();
                }
                None => {
                    if self.readable.wait_until(&mut inner, deadline).timed_out() {
                        break;
                    }
                }
            }
        }
        taken
    }

    pub fn queued(&self) -> usize {
        self.inner.lock().frames.len()
    }

    /// Number of frames accepted since creation.
    pub fn writes(&self) -> u64 {
        self.inner.lock().writes
    }

    pub fn volume(&self) -> f32 {
        self.inner.lock().volume
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().state == SinkState::Playing
    }

    pub fn is_released(&self) -> bool {
        self.inner.lock().state == SinkState::Released
    }
}

impl Default for CaptureSink {
    fn default() -> Self {
        Self::new(8, 256)
    }
}

impl OutputSink for CaptureSink {
    fn play(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        if inner.state == SinkState::Released {
            return Err(Error::DeviceUnavailable("capture sink released".into()));
        }
        // a fresh start flushes what the previous run left queued
        if inner.state == SinkState::Stopped {
            inner.frames.clear();
        }
        inner.state = SinkState::Playing;
        self.writable.notify_all();
        Ok(())
    }

    fn pause(&self) {
        let mut inner = self.inner.lock();
        if inner.state == SinkState::Playing {
            inner.state = SinkState::Paused;
        }
    }

    fn stop(&self) {
        let mut inner = self.inner.lock();
        if inner.state != SinkState::Released {
            inner.state = SinkState::Stopped;
        }
        self.writable.notify_all();
    }

    fn release(&self) {
        let mut inner = self.inner.lock();
        inner.state = SinkState::Released;
        inner.frames.clear();
        self.writable.notify_all();
    }

    fn write(&self, frame: &[i16]) -> Result<()> {
        let mut inner = self.inner.lock();
        loop {
            let state = inner.state;
            let has_room = inner.frames.len() < self.capacity;
            match state {
                SinkState::Stopped | SinkState::Released => return Err(Error::SinkClosed),
                SinkState::Playing if has_room => break,
                _ => self.writable.wait(&mut inner),
            }
        }

        inner.frames.push_back(frame.to_vec());
        inner.writes += 1;
        self.readable.notify_all();
        Ok(())
    }

    fn set_volume(&self, volume: f32) {
        self.inner.lock().volume = volume;
    }

    fn min_buffer_frames(&self, _sample_rate: u32) -> usize {
        self.min_frames
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_write_requires_play() {
        let sink = CaptureSink::new(2, 4);
        assert_eq!(sink.write(&[1, 2]), Err(Error::SinkClosed));
        sink.play().unwrap();
        sink.write(&[1, 2]).unwrap();
        assert_eq!(sink.drain(), vec![vec![1, 2]]);
    }

    #[test]
    fn test_full_sink_blocks_until_drained() {
        let sink = Arc::new(CaptureSink::new(1, 4));
        sink.play().unwrap();
        sink.write(&[1]).unwrap();

        let writer = {
            let sink = Arc::clone(&sink);
            thread::spawn(move || sink.write(&[2]))
        };

        thread::sleep(Duration::from_millis(20));
        assert_eq!(sink.writes(), 1);

        let first = sink.take_frames(1, Duration::from_secs(1));
        assert_eq!(first, vec![vec![1]]);
        writer.join().unwrap().unwrap();
        assert_eq!(sink.take_frames(1, Duration::from_secs(1)), vec![vec![2]]);
    }

    #[test]
    fn test_paused_sink_blocks_and_stop_unblocks() {
        let sink = Arc::new(CaptureSink::new(4, 4));
        sink.play().unwrap();
        sink.pause();

        let writer = {
            let sink = Arc::clone(&sink);
            thread::spawn(move || sink.write(&[7]))
        };

        thread::sleep(Duration::from_millis(20));
        assert_eq!(sink.queued(), 0);

        sink.stop();
        assert_eq!(writer.join().unwrap(), Err(Error::SinkClosed));
    }

    #[test]
    fn test_restart_flushes_queue() {
        let sink = CaptureSink::new(2, 4);
        sink.play().unwrap();
        sink.write(&[1]).unwrap();
        sink.stop();
        assert_eq!(sink.queued(), 1);

        sink.play().unwrap();
        assert_eq!(sink.queued(), 0);

        sink.write(&[2]).unwrap();
        sink.pause();
        sink.play().unwrap();
        assert_eq!(sink.queued(), 1);
    }

    #[test]
    fn test_released_sink_cannot_play() {
        let sink = CaptureSink::default();
        sink.release();
        assert!(sink.play().is_err());
        assert!(sink.is_released());
    }

    #[test]
    fn test_volume_is_per_sink() {
        let left = CaptureSink::default();
        let right = CaptureSink::default();
        left.set_volume(0.25);
        assert_eq!(left.volume(), 0.25);
        assert_eq!(right.volume(), 1.0);
    }
}
