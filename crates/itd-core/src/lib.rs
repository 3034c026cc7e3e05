//! Core primitives for interaural-time-difference (ITD) binaural playback.
//!
//! A single mono [`SampleBuffer`] is read by two independently shiftable
//! [`Cursor`]s, one per ear. Offsetting the cursors against each other by a
//! few samples creates the timing cue the auditory system uses to place a
//! source left or right of centre.
//!
//! # Primary API
//!
//! - [`SampleBuffer`]: immutable decoded mono samples
//! - [`Cursor`]: per-channel read position plus applied/pending offsets
//! - [`ItdOffsets`]: azimuth to per-ear sample offsets
//! - [`fill_frame`]: boundary-aware frame rendering (silence, looping)
//! - [`PlaybackFsm`]: engine-wide lifecycle state machine
//! - [`OutputSink`]: the blocking output collaborator each channel writes to
//!
//! # Example
//!
//! ```
//! use itd_core::{Cursor, ItdOffsets, SampleBuffer, fill_frame};
//!
//! let buffer = SampleBuffer::new((0..8000).map(|i| i as i16).collect(), 8000).unwrap();
//! let offsets = ItdOffsets::for_angle(std::f64::consts::FRAC_PI_4, buffer.sample_rate(), 0.0006);
//! assert_eq!(offsets.right, 1);
//!
//! let right = Cursor::new();
//! right.shift(offsets.right);
//!
//! let mut frame = vec![0i16; 4];
//! right.render(|position| fill_frame(buffer.samples(), position, &mut frame, false));
//! assert_eq!(frame, [1, 2, 3, 4]);
//! ```

pub mod error;
pub use error::{Error, Result};

mod buffer;
pub use buffer::{DecodedAudio, SampleBuffer, MIN_SAMPLE_RATE};

mod config;
pub use config::EngineConfig;

mod cursor;
pub use cursor::{Cursor, CursorSnapshot};

mod epoch;
pub use epoch::PlaybackEpoch;

mod itd;
pub use itd::{max_deviation_samples, ItdOffsets, AZIMUTH_LIMIT, MAX_ITD_SECONDS};

pub(crate) mod lockfree;
pub use lockfree::{AtomicFlag, AtomicFloat};

mod render;
pub use render::{fill_frame, FillReport};

mod sink;
pub use sink::{ChannelSide, OutputSink};

mod state;
pub use state::{LifecycleOp, PlaybackFsm, PlaybackState, Transition};
