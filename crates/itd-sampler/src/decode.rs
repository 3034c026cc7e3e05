//! Mono 16-bit PCM WAV decoding.

use crate::{Error, Result};
use hound::{SampleFormat, WavReader};
use itd_core::{DecodedAudio, SampleBuffer};
use std::io::Read;
use std::path::Path;

/// Read every sample of a WAV stream without judging channel count or rate.
pub fn decode_wav_pcm<R: Read>(reader: R) -> Result<DecodedAudio> {
    let reader = WavReader::new(reader)?;
    let spec = reader.spec();

    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        return Err(Error::Decode(format!(
            "unsupported sample format {:?}/{} bits, expected 16-bit integer PCM",
            spec.sample_format, spec.bits_per_sample
        )));
    }

    let samples = reader
        .into_samples::<i16>()
        .collect::<std::result::Result<Vec<_>, _>>()?;

    tracing::debug!(
        "Decoded {} samples ({} ch @ {} Hz)",
        samples.len(),
        spec.channels,
        spec.sample_rate
    );

    Ok(DecodedAudio {
        sample_rate: spec.sample_rate,
        channels: spec.channels,
        samples,
    })
}

/// Decode a WAV stream into a playable mono buffer.
pub fn decode_wav<R: Read>(reader: R) -> Result<SampleBuffer> {
    Ok(SampleBuffer::from_decoded(decode_wav_pcm(reader)?)?)
}

pub fn decode_wav_file(path: impl AsRef<Path>) -> Result<SampleBuffer> {
    let file = std::fs::File::open(path.as_ref())?;
    decode_wav(std::io::BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hound::{WavSpec, WavWriter};
    use std::io::Cursor;

    fn wav_bytes(channels: u16, sample_rate: u32, bits: u16, samples: &[i16]) -> Vec<u8> {
        let spec = WavSpec {
            channels,
            sample_rate,
            bits_per_sample: bits,
            sample_format: SampleFormat::Int,
        };
        let mut out = Cursor::new(Vec::new());
        {
            let mut writer = WavWriter::new(&mut out, spec).unwrap();
            for &s in samples {
                if bits == 16 {
                    writer.write_sample(s).unwrap();
                } else {
                    writer.write_sample(s as i32).unwrap();
                }
            }
            writer.finalize().unwrap();
        }
        out.into_inner()
    }

    #[test]
    fn test_decode_mono() {
        let bytes = wav_bytes(1, 16000, 16, &[1, -2, 3, i16::MAX, i16::MIN]);
        let buffer = decode_wav(Cursor::new(bytes)).unwrap();
        assert_eq!(buffer.samples(), &[1, -2, 3, i16::MAX, i16::MIN]);
        assert_eq!(buffer.sample_rate(), 16000);
    }

    #[test]
    fn test_decode_rejects_stereo() {
        let bytes = wav_bytes(2, 16000, 16, &[1, 1, 2, 2]);
        let err = decode_wav(Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, Error::Core(itd_core::Error::Decode(_))));

        // the raw decoder still reports it
        let bytes = wav_bytes(2, 16000, 16, &[1, 1, 2, 2]);
        let decoded = decode_wav_pcm(Cursor::new(bytes)).unwrap();
        assert_eq!(decoded.channels, 2);
    }

    #[test]
    fn test_decode_rejects_24_bit() {
        let bytes = wav_bytes(1, 16000, 24, &[1, 2, 3]);
        assert!(matches!(
            decode_wav(Cursor::new(bytes)),
            Err(Error::Decode(_))
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode_wav(Cursor::new(b"not a wav file".to_vec())).unwrap_err();
        assert!(matches!(err, Error::Wav(_)));
    }

    #[test]
    fn test_decode_rejects_low_rate() {
        let bytes = wav_bytes(1, 2000, 16, &[0; 8]);
        assert!(decode_wav(Cursor::new(bytes)).is_err());
    }

    #[test]
    fn test_decode_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        std::fs::write(&path, wav_bytes(1, 8000, 16, &[5; 80])).unwrap();

        let buffer = decode_wav_file(&path).unwrap();
        assert_eq!(buffer.len(), 80);
        assert_eq!(buffer.duration_ms(), 10);
    }
}
