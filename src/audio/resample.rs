//! Sample conversion, resampling and channel fan-out for playback.
//!
//! Output devices rarely run at the 24 kHz mono the speech model produces.
//! Before samples reach `cpal` they go through three steps:
//!
//! 1. [`pcm16_to_f32`]: scale `i16` into `[-1.0, 1.0]`.
//! 2. [`resample_linear`]: convert to the device's sample rate.
//! 3. [`mono_to_interleaved`]: copy each frame to every device channel.
//!
//! The resampler uses linear interpolation, which is plenty for speech.

// ---------------------------------------------------------------------------
// pcm16_to_f32
// ---------------------------------------------------------------------------

/// Scale signed 16-bit samples to `f32` in `[-1.0, 1.0]`.
///
/// ```rust
/// use studio_assist::audio::pcm16_to_f32;
///
/// let out = pcm16_to_f32(&[0, i16::MIN]);
/// assert_eq!(out, vec![0.0, -1.0]);
/// ```
pub fn pcm16_to_f32(samples: &[i16]) -> Vec<f32> {
    samples
        .iter()
        .map(|&s| s as f32 / 32_768.0)
        .collect()
}

// ---------------------------------------------------------------------------
// mono_to_interleaved
// ---------------------------------------------------------------------------

/// Duplicate every mono sample across `channels` interleaved channels.
///
/// * `channels == 1` returns the input unchanged (as an owned `Vec`).
/// * `channels == 0` returns an empty vector.
///
/// ```rust
/// use studio_assist::audio::mono_to_interleaved;
///
/// let stereo = mono_to_interleaved(&[0.5, -0.5], 2);
/// assert_eq!(stereo, vec![0.5, 0.5, -0.5, -0.5]);
/// ```
pub fn mono_to_interleaved(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => samples
            .iter()
            .flat_map(|&s| std::iter::repeat(s).take(n as usize))
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// resample_linear
// ---------------------------------------------------------------------------

/// Resample `samples` from `source_rate` Hz to `target_rate` Hz using linear
/// interpolation.
///
/// * Equal rates return a copy of the input.
/// * Empty input, or a zero rate on either side, returns an empty vector.
///
/// The output length is `ceil(samples.len() * target_rate / source_rate)`.
///
/// ```rust
/// use studio_assist::audio::resample_linear;
///
/// let hi = vec![0.5_f32; 480];
/// assert_eq!(resample_linear(&hi, 48_000, 16_000).len(), 160);
/// assert_eq!(resample_linear(&hi, 24_000, 48_000).len(), 960);
/// ```
pub fn resample_linear(samples: &[f32], source_rate: u32, target_rate: u32) -> Vec<f32> {
    if source_rate == target_rate {
        return samples.to_vec();
    }

    if samples.is_empty() || source_rate == 0 || target_rate == 0 {
        return Vec::new();
    }

    let ratio = target_rate as f64 / source_rate as f64;
    let output_len = (samples.len() as f64 * ratio).ceil() as usize;
    let mut output = Vec::with_capacity(output_len);

    for i in 0..output_len {
        let src_pos = i as f64 / ratio;
        let idx = src_pos as usize;
        let frac = src_pos - idx as f64;

        let sample = if idx + 1 < samples.len() {
            samples[idx] * (1.0 - frac as f32) + samples[idx + 1] * frac as f32
        } else if idx < samples.len() {
            samples[idx]
        } else {
            0.0
        };

        output.push(sample);
    }

    output
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- pcm16_to_f32 ------------------------------------------------------

    #[test]
    fn pcm16_extremes_stay_in_range() {
        let out = pcm16_to_f32(&[i16::MIN, -1, 0, 1, i16::MAX]);
        assert_eq!(out[0], -1.0);
        assert_eq!(out[2], 0.0);
        assert!(out[4] < 1.0 && out[4] > 0.999);
        assert!(out.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    // ---- mono_to_interleaved -----------------------------------------------

    #[test]
    fn interleave_mono_is_identity() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(mono_to_interleaved(&input, 1), input);
    }

    #[test]
    fn interleave_zero_channels() {
        assert!(mono_to_interleaved(&[1.0, 2.0], 0).is_empty());
    }

    #[test]
    fn interleave_six_channels() {
        let out = mono_to_interleaved(&[0.25, 0.75], 6);
        assert_eq!(out.len(), 12);
        assert!(out[..6].iter().all(|&s| s == 0.25));
        assert!(out[6..].iter().all(|&s| s == 0.75));
    }

    // ---- resample_linear ---------------------------------------------------

    #[test]
    fn resample_same_rate_is_noop() {
        let input: Vec<f32> = (0..160).map(|i| i as f32 / 160.0).collect();
        assert_eq!(resample_linear(&input, 24_000, 24_000), input);
    }

    #[test]
    fn resample_empty_input() {
        assert!(resample_linear(&[], 24_000, 48_000).is_empty());
    }

    #[test]
    fn resample_zero_rate() {
        assert!(resample_linear(&[0.1, 0.2], 0, 48_000).is_empty());
    }

    #[test]
    fn resample_24k_to_44100_output_length() {
        // 1 s @ 24 kHz → ~44 100 samples
        let out = resample_linear(&vec![0.0_f32; 24_000], 24_000, 44_100);
        assert!(
            out.len().abs_diff(44_100) <= 1,
            "expected ~44100, got {}",
            out.len()
        );
    }

    #[test]
    fn resample_constant_signal_preserves_amplitude() {
        let out = resample_linear(&vec![0.5_f32; 480], 24_000, 48_000);
        for &s in &out {
            assert!((s - 0.5).abs() < 1e-5, "amplitude drift: {s}");
        }
    }

    #[test]
    fn upsampling_interpolates_midpoints() {
        let out = resample_linear(&[0.0, 1.0], 1, 2);
        assert_eq!(out.len(), 4);
        assert!((out[1] - 0.5).abs() < 1e-6);
        assert!((out[2] - 1.0).abs() < 1e-6);
    }
}
