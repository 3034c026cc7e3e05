//! Immutable mono sample storage shared by both channels.

use crate::itd::{max_deviation_samples, MAX_ITD_SECONDS};
use crate::{Error, Result};
use std::sync::Arc;

/// Lowest sample rate that still resolves at least one sample of offset per ear
/// at the default maximum ITD (`floor(0.0006 * 3334) == 2`).
pub const MIN_SAMPLE_RATE: u32 = 3334;

/// Raw output of an external decoder, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAudio {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

/// Fully decoded mono 16-bit samples plus their sample rate.
///
/// Cloning is cheap: the samples live behind an `Arc<[i16]>` and are never
/// mutated, so render threads read them without locking.
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    samples: Arc<[i16]>,
    sample_rate: u32,
}

impl SampleBuffer {
    /// Wrap mono samples recorded at `sample_rate` Hz.
    pub fn new(samples: Vec<i16>, sample_rate: u32) -> Result<Self> {
        Self::with_max_itd(samples, sample_rate, MAX_ITD_SECONDS)
    }

    /// Like [`SampleBuffer::new`], validating the rate against a custom maximum ITD.
    pub fn with_max_itd(samples: Vec<i16>, sample_rate: u32, max_itd_seconds: f64) -> Result<Self> {
        if max_deviation_samples(max_itd_seconds, sample_rate) < 2 {
            return Err(Error::Decode(format!(
                "sample rate {sample_rate} Hz too low to resolve a {:.2} ms ITD",
                max_itd_seconds * 1000.0
            )));
        }

        Ok(Self {
            samples: samples.into(),
            sample_rate,
        })
    }

    /// Validate decoder output: mono only, rate high enough for ITD resolution.
    pub fn from_decoded(decoded: DecodedAudio) -> Result<Self> {
        if decoded.channels != 1 {
            return Err(Error::Decode(format!(
                "expected mono input, got {} channels",
                decoded.channels
            )));
        }
        Self::new(decoded.samples, decoded.sample_rate)
    }

    #[inline]
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Always 1; multi-channel sources are rejected at construction.
    pub fn channels(&self) -> u16 {
        1
    }

    pub fn duration_seconds(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }

    /// Duration in whole milliseconds, truncated.
    pub fn duration_ms(&self) -> u64 {
        (self.duration_seconds() * 1000.0) as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duration() {
        let buffer = SampleBuffer::new(vec![0; 32000], 16000).unwrap();
        assert_eq!(buffer.duration_ms(), 2000);
        assert_eq!(buffer.len(), 32000);
        assert_eq!(buffer.channels(), 1);
    }

    #[test]
    fn test_rejects_stereo() {
        let decoded = DecodedAudio {
            sample_rate: 44100,
            channels: 2,
            samples: vec![0; 16],
        };
        assert!(matches!(
            SampleBuffer::from_decoded(decoded),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_rejects_low_rate() {
        assert!(SampleBuffer::new(vec![0; 16], MIN_SAMPLE_RATE - 1).is_err());
        assert!(SampleBuffer::new(vec![0; 16], MIN_SAMPLE_RATE).is_ok());
    }

    #[test]
    fn test_empty_buffer_allowed() {
        let buffer = SampleBuffer::new(Vec::new(), 8000).unwrap();
        assert!(buffer.is_empty());
        assert_eq!(buffer.duration_ms(), 0);
    }

    #[test]
    fn test_clone_shares_samples() {
        let buffer = SampleBuffer::new(vec![1, 2, 3], 8000).unwrap();
        let other = buffer.clone();
        assert!(std::ptr::eq(buffer.samples(), other.samples()));
    }
}
