//! Sample conversion utilities: channel downmix, resampling to the 16 kHz
//! rate the transcription API expects, 16-bit quantisation, and the dB →
//! linear amplitude map used by the level meter.

/// Target rate for everything leaving the audio module.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

// ---------------------------------------------------------------------------
// stereo_to_mono
// ---------------------------------------------------------------------------

/// Mix interleaved multi-channel audio down to mono by averaging all
/// channels. The output length is `samples.len() / channels`.
///
/// * `channels == 1` returns the input unchanged (owned).
/// * `channels == 0` returns an empty vector.
pub fn stereo_to_mono(samples: &[f32], channels: u16) -> Vec<f32> {
    match channels {
        0 => Vec::new(),
        1 => samples.to_vec(),
        n => {
            let n = n as usize;
            samples
                .chunks_exact(n)
                .map(|frame| frame.iter().sum::<f32>() / n as f32)
                .collect()
        }
    }
}

// ---------------------------------------------------------------------------
// resample_to_16k
// ---------------------------------------------------------------------------

/// Resample `samples` from `source_rate` Hz to 16 000 Hz using linear
/// interpolation.
///
/// A no-op (clone) when the source already runs at 16 kHz. The output length
/// is approximately `samples.len() * 16_000 / source_rate`.
pub fn resample_to_16k(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == TARGET_SAMPLE_RATE {
        return samples.to_vec();
    }

    if samples.is_empty() {
        return Vec::new();
    }

    let ratio = TARGET_SAMPLE_RATE as f64 / source_rate as f64;
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
// f32_to_i16
// ---------------------------------------------------------------------------

/// Quantise `[-1.0, 1.0]` float samples to 16-bit signed PCM, clamping
/// out-of-range values.
pub fn f32_to_i16(samples: &[f32]) -> Vec<i16> {
    samples
        .iter()
        .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
        .collect()
}

// ---------------------------------------------------------------------------
// level_from_rms
// ---------------------------------------------------------------------------

/// Map an RMS signal level onto the `[0.0, 1.0]` meter range.
///
/// The RMS is converted to dBFS and `[-50 dB, 0 dB]` is mapped linearly onto
/// `[0, 1]`, clamped at both ends — quiet rooms sit near 0, speech at a
/// normal distance lands mid-scale.
pub fn level_from_rms(rms: f32) -> f32 {
    if rms <= 0.0 {
        return 0.0;
    }
    let db = 20.0 * rms.log10();
    ((db + 50.0) / 50.0).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- stereo_to_mono ----

    #[test]
    fn mono_passthrough() {
        let input = vec![0.1_f32, 0.2, 0.3];
        assert_eq!(stereo_to_mono(&input, 1), input);
    }

    #[test]
    fn two_channel_average() {
        let input = vec![1.0_f32, -1.0, 0.5, 0.5];
        let out = stereo_to_mono(&input, 2);
        assert_eq!(out.len(), 2);
        assert!((out[0] - 0.0).abs() < 1e-6);
        assert!((out[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn zero_channels_yields_empty() {
        assert!(stereo_to_mono(&[1.0_f32, 2.0], 0).is_empty());
    }

    // ---- resample_to_16k ----

    #[test]
    fn already_16k_is_noop() {
        let input: Vec<f32> = (0..160).map(|i| i as f32 / 160.0).collect();
        let out = resample_to_16k(&input, 16_000);
        assert_eq!(out, input);
    }

    #[test]
    fn downsample_48k_length() {
        // 480 samples @ 48 kHz = 10 ms → 160 samples @ 16 kHz
        let out = resample_to_16k(&vec![0.5_f32; 480], 48_000);
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn upsample_8k_length() {
        let out = resample_to_16k(&vec![0.0_f32; 80], 8_000);
        assert_eq!(out.len(), 160);
    }

    #[test]
    fn constant_signal_preserves_amplitude() {
        let out = resample_to_16k(&vec![0.5_f32; 480], 48_000);
        for &s in &out {
            assert!((s - 0.5).abs() < 1e-5, "amplitude drift: {s}");
        }
    }

    #[test]
    fn empty_input_stays_empty() {
        assert!(resample_to_16k(&[], 48_000).is_empty());
    }

    // ---- f32_to_i16 ----

    #[test]
    fn quantisation_endpoints() {
        let out = f32_to_i16(&[0.0, 1.0, -1.0]);
        assert_eq!(out[0], 0);
        assert_eq!(out[1], i16::MAX);
        assert_eq!(out[2], -i16::MAX);
    }

    #[test]
    fn quantisation_clamps_overdrive() {
        let out = f32_to_i16(&[2.0, -3.0]);
        assert_eq!(out[0], i16::MAX);
        assert_eq!(out[1], -i16::MAX);
    }

    // ---- level_from_rms ----

    #[test]
    fn silence_maps_to_zero() {
        assert_eq!(level_from_rms(0.0), 0.0);
        assert_eq!(level_from_rms(-1.0), 0.0);
    }

    #[test]
    fn full_scale_maps_to_one() {
        // RMS 1.0 = 0 dBFS → top of the meter
        assert!((level_from_rms(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn midpoint_of_db_range() {
        // -25 dB sits exactly halfway through the [-50, 0] window
        let rms = 10.0_f32.powf(-25.0 / 20.0);
        assert!((level_from_rms(rms) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn below_floor_clamps_to_zero() {
        // -60 dB is under the floor
        let rms = 10.0_f32.powf(-60.0 / 20.0);
        assert_eq!(level_from_rms(rms), 0.0);
    }
}
