//! Block-level sample operations: saturating mix and raw PCM16 byte conversion.

/// Samples per audio block unless configured otherwise.
pub const DEFAULT_BLOCK_SAMPLES: usize = 128;

/// Bytes per 16-bit sample in the raw stream format.
pub const BYTES_PER_SAMPLE: usize = 2;

/// Mix `src` into `dst` sample by sample, clamping to the i16 range.
///
/// Returns the number of sample positions that had to be clamped. A sum
/// that leaves the representable range is a clipping condition, never a
/// wrap and never an abort.
pub fn mix_saturating(dst: &mut [i16], src: &[i16]) -> u64 {
    let mut clipped = 0u64;
    for (d, s) in dst.iter_mut().zip(src.iter()) {
        let sum = *d as i32 + *s as i32;
        if sum > i16::MAX as i32 {
            *d = i16::MAX;
            clipped += 1;
        } else if sum < i16::MIN as i32 {
            *d = i16::MIN;
            clipped += 1;
        } else {
            *d = sum as i16;
        }
    }
    clipped
}

/// Append `samples` to `out` as little-endian PCM16 bytes.
pub fn write_samples_le(samples: &[i16], out: &mut Vec<u8>) {
    for s in samples {
        out.extend_from_slice(&s.to_le_bytes());
    }
}

/// Decode little-endian PCM16 bytes into `out`, returning the number of
/// samples written. A trailing odd byte is ignored.
pub fn read_samples_le(bytes: &[u8], out: &mut [i16]) -> usize {
    let mut count = 0;
    for (dst, pair) in out.iter_mut().zip(bytes.chunks_exact(2)) {
        *dst = i16::from_le_bytes([pair[0], pair[1]]);
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mix_exact_sum_in_range() {
        let mut dst = [100, -200, 0, 32000];
        let src = [50, -50, 7, -32000];
        let clipped = mix_saturating(&mut dst, &src);
        assert_eq!(clipped, 0);
        assert_eq!(dst, [150, -250, 7, 0]);
    }

    #[test]
    fn test_mix_clamps_positive_and_negative() {
        let mut dst = [i16::MAX, i16::MIN, 20000];
        let src = [1, -1, 20000];
        let clipped = mix_saturating(&mut dst, &src);
        assert_eq!(clipped, 3);
        assert_eq!(dst, [i16::MAX, i16::MIN, i16::MAX]);
    }

    #[test]
    fn test_byte_round_trip() {
        let samples = [0i16, 1, -1, i16::MAX, i16::MIN, 12345];
        let mut bytes = Vec::new();
        write_samples_le(&samples, &mut bytes);
        assert_eq!(bytes.len(), samples.len() * BYTES_PER_SAMPLE);

        let mut decoded = [0i16; 6];
        let n = read_samples_le(&bytes, &mut decoded);
        assert_eq!(n, 6);
        assert_eq!(decoded, samples);
    }

    #[test]
    fn test_decode_ignores_trailing_odd_byte() {
        let bytes = [0x01, 0x00, 0xff];
        let mut out = [0i16; 4];
        let n = read_samples_le(&bytes, &mut out);
        assert_eq!(n, 1);
        assert_eq!(out[0], 1);
        assert_eq!(out[1], 0);
    }

    proptest! {
        #[test]
        fn prop_mix_matches_widened_clamp(
            a in proptest::collection::vec(any::<i16>(), 0..256),
            b in proptest::collection::vec(any::<i16>(), 0..256),
        ) {
            let mut dst = a.clone();
            let clipped = mix_saturating(&mut dst, &b);

            let mut expected_clips = 0u64;
            for (i, d) in dst.iter().enumerate() {
                if i < b.len() {
                    let sum = a[i] as i32 + b[i] as i32;
                    let clamped = sum.clamp(i16::MIN as i32, i16::MAX as i32);
                    prop_assert_eq!(*d as i32, clamped);
                    if sum != clamped {
                        expected_clips += 1;
                    }
                } else {
                    prop_assert_eq!(*d, a[i]);
                }
            }
            prop_assert_eq!(clipped, expected_clips);
        }
    }
}
