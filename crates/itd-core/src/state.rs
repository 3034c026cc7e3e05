//! Engine-wide playback state machine.
//!
//! ```text
//! Idle ──▶ Starting ──▶ Playing ⇄ Paused
//!             ▲            │        │
//!             └── Stopped ◀┴────────┘
//! any ──▶ Released (terminal)
//! ```
//!
//! One state covers both channels so they always transition together.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlaybackState {
    #[default]
    Idle,
    /// Sinks primed and workers spawning; only visible inside `play()`.
    Starting,
    Playing,
    Paused,
    Stopped,
    Released,
}

impl PlaybackState {
    /// Playing or paused: the epoch is valid and workers exist.
    pub fn is_alive(self) -> bool {
        matches!(self, Self::Playing | Self::Paused)
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
            Self::Released => "released",
        };
        f.write_str(name)
    }
}

/// Operations on the public control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOp {
    Play,
    Pause,
    Stop,
    Release,
    SetAngle,
    SetVolume,
    SetLooping,
}

impl fmt::Display for LifecycleOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Play => "play",
            Self::Pause => "pause",
            Self::Stop => "stop",
            Self::Release => "release",
            Self::SetAngle => "set angle",
            Self::SetVolume => "set volume",
            Self::SetLooping => "set looping",
        };
        f.write_str(name)
    }
}

/// Outcome of a lifecycle call that did not fail outright.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Changed {
        from: PlaybackState,
        to: PlaybackState,
    },
    /// The call was not valid in `state` and was treated as a no-op.
    Ignored { state: PlaybackState },
}

impl Transition {
    pub fn is_changed(&self) -> bool {
        matches!(self, Self::Changed { .. })
    }
}

#[derive(Debug, Default)]
pub struct PlaybackFsm {
    state: PlaybackState,
}

impl PlaybackFsm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Apply a lifecycle operation, or return [`Error::InvalidState`].
    ///
    /// `Play` is two-step from `Idle`/`Stopped`: the first call enters
    /// `Starting`, the second (after the sinks are primed) enters `Playing`.
    pub fn transition(&mut self, op: LifecycleOp) -> Result<Transition> {
        use PlaybackState::*;

        let from = self.state;
        let to = match (op, from) {
            (LifecycleOp::Play, Idle | Stopped) => Starting,
            (LifecycleOp::Play, Starting | Paused) => Playing,
            (LifecycleOp::Pause, Playing) => Paused,
            (LifecycleOp::Stop, Playing | Paused) => Stopped,
            (LifecycleOp::Release, state) if state != Released => Released,
            _ => return Err(Error::InvalidState { op, state: from }),
        };

        self.state = to;
        tracing::trace!("{op}: {from} -> {to}");
        Ok(Transition::Changed { from, to })
    }

    /// Roll a failed start back to where it began.
    pub fn abort_start(&mut self, back_to: PlaybackState) {
        if self.state == PlaybackState::Starting {
            self.state = back_to;
        }
    }

    /// Non-lifecycle operations are allowed in every state but `Released`.
    pub fn ensure_usable(&self, op: LifecycleOp) -> Result<()> {
        if self.state == PlaybackState::Released {
            return Err(Error::InvalidState {
                op,
                state: self.state,
            });
        }
        Ok(())
    }
}
