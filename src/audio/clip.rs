//! [`AudioClip`] — one finished recording, ready for upload.
//!
//! A clip is created when capture stops and consumed exactly once by the
//! transcription call (it moves by value into the provider and is dropped
//! with the episode).

use std::io::Cursor;
use std::time::Duration;

use super::convert::TARGET_SAMPLE_RATE;

// ---------------------------------------------------------------------------
// AudioClip
// ---------------------------------------------------------------------------

/// Mono 16-bit PCM audio at 16 kHz plus its elapsed duration.
#[derive(Debug, Clone)]
pub struct AudioClip {
    samples: Vec<i16>,
    duration: Duration,
}

impl AudioClip {
    /// Wrap already-converted 16 kHz mono samples. The duration is derived
    /// from the sample count.
    pub fn from_samples(samples: Vec<i16>) -> Self {
        let duration =
            Duration::from_secs_f64(samples.len() as f64 / TARGET_SAMPLE_RATE as f64);
        Self { samples, duration }
    }

    /// Raw PCM samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Recording length.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Encode the clip as a WAV file body (16 kHz, mono, 16-bit) for the
    /// multipart upload.
    pub fn wav_bytes(&self) -> Result<Vec<u8>, hound::Error> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: TARGET_SAMPLE_RATE,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for &sample in &self.samples {
                writer.write_sample(sample)?;
            }
            writer.finalize()?;
        }
        Ok(cursor.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_derives_from_sample_count() {
        let clip = AudioClip::from_samples(vec![0_i16; 16_000]);
        assert_eq!(clip.duration(), Duration::from_secs(1));

        let short = AudioClip::from_samples(vec![0_i16; 1_600]);
        assert!((short.duration().as_secs_f64() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn empty_clip() {
        let clip = AudioClip::from_samples(Vec::new());
        assert!(clip.is_empty());
        assert_eq!(clip.duration(), Duration::ZERO);
    }

    #[test]
    fn wav_bytes_carry_riff_header_and_data() {
        let clip = AudioClip::from_samples(vec![100_i16; 160]);
        let wav = clip.wav_bytes().expect("wav encode");

        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        // 44-byte canonical header + 2 bytes per sample
        assert_eq!(wav.len(), 44 + 160 * 2);
    }

    #[test]
    fn wav_round_trips_through_hound() {
        let samples = vec![0_i16, 1000, -1000, i16::MAX];
        let clip = AudioClip::from_samples(samples.clone());
        let wav = clip.wav_bytes().expect("wav encode");

        let mut reader = hound::WavReader::new(Cursor::new(wav)).expect("wav parse");
        assert_eq!(reader.spec().sample_rate, 16_000);
        assert_eq!(reader.spec().channels, 1);
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }
}
