//! Audio capture pipeline.
//!
//! ```text
//! Microphone → cpal callback → scratch buffer ─┬─ meter thread → amplitude [0,1]
//!                                              └─ stop: downmix → 16 kHz → AudioClip
//! ```
//!
//! The [`Recorder`] trait is the seam the orchestrator drives;
//! [`CpalRecorder`] is the production implementation.

pub mod capture;
pub mod clip;
pub mod convert;

pub use capture::{CpalRecorder, Recorder, RecorderError};
pub use clip::AudioClip;
pub use convert::{
    f32_to_i16, level_from_rms, resample_to_16k, stereo_to_mono, TARGET_SAMPLE_RATE,
};
