//! Boundary-aware frame rendering.

/// What happened while filling one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FillReport {
    /// Samples copied from the buffer (the rest are silence).
    pub copied: usize,
    /// The position wrapped to the buffer start at least once.
    pub wrapped: bool,
    /// Every index of the frame lay past the end of a non-looping buffer.
    pub past_end: bool,
}

/// Fill `frame` from `samples` starting at `*position`, then advance the
/// position by one frame length.
///
/// - indices before the start render as silence
/// - indices past the end wrap when `looping` (subtracting whole buffer
///   lengths from `*position`), otherwise render as silence
/// - an empty buffer renders silence whether or not it loops
pub fn fill_frame(samples: &[i16], position: &mut i64, frame: &mut [i16], looping: bool) -> FillReport {
    let len = samples.len() as i64;
    let mut report = FillReport::default();

    for (i, out) in frame.iter_mut().enumerate() {
        let mut idx = *position + i as i64;

        if idx < 0 {
            *out = 0;
            continue;
        }

        if idx >= len {
            if !looping || len == 0 {
                *out = 0;
                continue;
            }
            let wraps = idx / len;
            *position -= wraps * len;
            idx -= wraps * len;
            report.wrapped = true;
        }

        *out = samples[idx as usize];
        report.copied += 1;
    }

    let frame_len = frame.len() as i64;
    report.past_end = !looping && !frame.is_empty() && *position >= len;
    *position += frame_len;

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<i16> {
        (1..=n as i16).collect()
    }

    #[test]
    fn test_plain_copy_advances() {
        let samples = ramp(8);
        let mut pos = 2;
        let mut frame = [0i16; 3];
        let report = fill_frame(&samples, &mut pos, &mut frame, false);
        assert_eq!(frame, [3, 4, 5]);
        assert_eq!(pos, 5);
        assert_eq!(report.copied, 3);
        assert!(!report.wrapped);
    }

    #[test]
    fn test_negative_index_is_silence() {
        let samples = ramp(8);
        let mut pos = -1;
        let mut frame = [9i16; 3];
        fill_frame(&samples, &mut pos, &mut frame, false);
        assert_eq!(frame, [0, 1, 2]);
        assert_eq!(pos, 2);
    }

    #[test]
    fn test_past_end_without_loop_is_silence() {
        let samples = ramp(4);
        let mut pos = 2;
        let mut frame = [9i16; 4];
        let report = fill_frame(&samples, &mut pos, &mut frame, false);
        assert_eq!(frame, [3, 4, 0, 0]);
        assert!(!report.past_end);

        let mut pos = 4;
        let report = fill_frame(&samples, &mut pos, &mut frame, false);
        assert_eq!(frame, [0, 0, 0, 0]);
        assert!(report.past_end);
        assert_eq!(pos, 8);
    }

    #[test]
    fn test_loop_wraps_mid_frame() {
        let samples = ramp(4);
        let mut pos = 2;
        let mut frame = [0i16; 6];
        let report = fill_frame(&samples, &mut pos, &mut frame, true);
        assert_eq!(frame, [3, 4, 1, 2, 3, 4]);
        assert!(report.wrapped);
        // wrapped once by 4, then advanced by 6
        assert_eq!(pos, 4);
    }

    #[test]
    fn test_loop_handles_position_far_ahead() {
        let samples = ramp(3);
        let mut pos = 10;
        let mut frame = [0i16; 2];
        fill_frame(&samples, &mut pos, &mut frame, true);
        assert_eq!(frame, [2, 3]);
    }

    #[test]
    fn test_empty_buffer_loops_as_silence() {
        let mut pos = 0;
        let mut frame = [7i16; 4];
        let report = fill_frame(&[], &mut pos, &mut frame, true);
        assert_eq!(frame, [0; 4]);
        assert_eq!(report.copied, 0);
        assert_eq!(pos, 4);
    }

    #[test]
    fn test_loop_is_periodic() {
        let samples = ramp(5);
        let frame_len = 3;
        let mut pos = 0;
        let mut frame = vec![0i16; frame_len];

        let mut first = Vec::new();
        for _ in 0..samples.len() {
            fill_frame(&samples, &mut pos, &mut frame, true);
            first.extend_from_slice(&frame);
        }
        let mut second = Vec::new();
        for _ in 0..samples.len() {
            fill_frame(&samples, &mut pos, &mut frame, true);
            second.extend_from_slice(&frame);
        }

        assert_eq!(first, second);
        assert_eq!(&first[..5], &samples[..]);
    }
}
