//! Per-channel read position with an ITD offset folded in.
//!
//! `{position, applied_offset, pending_offset}` form one unit behind a short
//! mutex. The render thread holds it for exactly one frame fill; offset
//! updates from the control thread take the same lock, so a shift is never
//! observed half-applied.

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CursorSnapshot {
    /// Next sample index to render. Negative while a lagging offset is applied.
    pub position: i64,
    /// Offset currently folded into `position`.
    pub applied_offset: i64,
    /// Most recently requested offset.
    pub pending_offset: i64,
}

impl CursorSnapshot {
    /// Position on the unshifted timeline.
    pub fn timeline_position(&self) -> i64 {
        self.position - self.applied_offset
    }

    fn apply_pending(&mut self) -> bool {
        if self.pending_offset == self.applied_offset {
            return false;
        }
        self.position = self.position - self.applied_offset + self.pending_offset;
        self.applied_offset = self.pending_offset;
        true
    }
}

#[derive(Debug, Default)]
pub struct Cursor {
    state: Mutex<CursorSnapshot>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the applied offset with `offset`, moving `position` by the delta.
    ///
    /// The delta is taken against the last applied offset, so repeating the
    /// same value is a no-op.
    pub fn shift(&self, offset: i64) -> CursorSnapshot {
        let mut state = self.state.lock();
        state.pending_offset = offset;
        state.apply_pending();
        *state
    }

    /// Record `offset` without moving the cursor; the next frame applies it.
    pub fn request(&self, offset: i64) {
        self.state.lock().pending_offset = offset;
    }

    /// Fold a pending offset into the position. Returns whether anything moved.
    pub fn apply_pending(&self) -> bool {
        self.state.lock().apply_pending()
    }

    /// Move back to the start of the timeline, keeping the applied offset.
    pub fn rewind(&self) {
        let mut state = self.state.lock();
        state.apply_pending();
        state.position = state.applied_offset;
    }

    pub fn snapshot(&self) -> CursorSnapshot {
        *self.state.lock()
    }

    /// Run one frame's read-and-advance under the cursor lock.
    ///
    /// Pending offsets are applied first so a requested shift lands on a frame
    /// boundary. `f` receives the position and must advance it itself.
    pub fn render<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut i64) -> R,
    {
        let mut state = self.state.lock();
        state.apply_pending();
        f(&mut state.position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_shift_from_start() {
        let cursor = Cursor::new();
        let snap = cursor.shift(3);
        assert_eq!(snap.position, 3);
        assert_eq!(snap.applied_offset, 3);
        assert_eq!(snap.timeline_position(), 0);
    }

    #[test]
    fn test_shift_is_idempotent() {
        let cursor = Cursor::new();
        cursor.render(|pos| *pos += 100);

        let first = cursor.shift(-2);
        let second = cursor.shift(-2);
        assert_eq!(first.position, 98);
        assert_eq!(second.position, 98);
    }

    #[test]
    fn test_shift_replaces_previous_offset() {
        let cursor = Cursor::new();
        cursor.shift(5);
        let snap = cursor.shift(-5);
        assert_eq!(snap.position, -5);
        assert_eq!(snap.applied_offset, -5);
    }

    #[test]
    fn test_request_applies_on_next_render() {
        let cursor = Cursor::new();
        cursor.request(4);
        assert_eq!(cursor.snapshot().position, 0);
        assert_eq!(cursor.snapshot().pending_offset, 4);

        let seen = cursor.render(|pos| *pos);
        assert_eq!(seen, 4);
        assert_eq!(cursor.snapshot().applied_offset, 4);
    }

    #[test]
    fn test_rapid_requests_do_not_accumulate() {
        let cursor = Cursor::new();
        for offset in [1, 2, 3, 2, 1] {
            cursor.request(offset);
        }
        assert!(cursor.apply_pending());
        assert_eq!(cursor.snapshot().position, 1);
        assert!(!cursor.apply_pending());
    }

    #[test]
    fn test_rewind_keeps_offset() {
        let cursor = Cursor::new();
        cursor.shift(-1);
        cursor.render(|pos| *pos += 512);
        cursor.rewind();
        let snap = cursor.snapshot();
        assert_eq!(snap.position, -1);
        assert_eq!(snap.timeline_position(), 0);
    }

    #[test]
    fn test_concurrent_shift_and_advance() {
        let cursor = Arc::new(Cursor::new());
        let renderer = {
            let cursor = Arc::clone(&cursor);
            thread::spawn(move || {
                for _ in 0..10_000 {
                    cursor.render(|pos| *pos += 1);
                }
            })
        };

        for i in 0..10_000 {
            cursor.shift(i % 7 - 3);
        }
        renderer.join().unwrap();

        let snap = cursor.snapshot();
        assert_eq!(snap.timeline_position(), 10_000);
    }
}
