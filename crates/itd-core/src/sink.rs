//! Output sink abstraction, one instance per ear.

use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelSide {
    Left,
    Right,
}

impl ChannelSide {
    pub const BOTH: [ChannelSide; 2] = [ChannelSide::Left, ChannelSide::Right];

    /// Index into per-ear arrays (left = 0, right = 1).
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }
}

impl fmt::Display for ChannelSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Left => "left",
            Self::Right => "right",
        })
    }
}

/// A mono 16-bit output stream for one ear.
///
/// All methods take `&self`: the control thread calls `play`/`pause`/`stop`
/// while the channel's render thread sits inside `write`. `write` must block
/// until the frame is accepted (that blocking is the render loop's only
/// throttle) and must return once the sink is stopped or released.
pub trait OutputSink: Send + Sync {
    fn play(&self) -> Result<()>;

    fn pause(&self);

    /// Stop output and wake any blocked writer.
    fn stop(&self);

    /// Free device resources. The sink is unusable afterwards.
    fn release(&self);

    /// Blocks until `frame` is accepted. Returns [`Error::SinkClosed`](crate::Error::SinkClosed)
    /// once stopped or released.
    fn write(&self, frame: &[i16]) -> Result<()>;

    /// Linear gain in `0.0..=1.0`.
    fn set_volume(&self, volume: f32);

    /// Smallest frame the platform accepts at `sample_rate`, in samples.
    fn min_buffer_frames(&self, sample_rate: u32) -> usize;

    /// Total underruns observed since creation.
    fn underrun_count(&self) -> u64 {
        0
    }
}
