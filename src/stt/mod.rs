//! Speech-to-text capability.
//!
//! [`SttProvider`] is the seam the orchestrator calls; implementations are
//! interchangeable hosted providers selected by configuration
//! ([`HttpWhisperProvider`] covers Groq and OpenAI, which share the OpenAI
//! transcription wire format).
//!
//! Credentials are checked before any network round-trip — a missing key is
//! [`SttError::NoCredential`], never an HTTP 401.

pub mod http;

pub use http::HttpWhisperProvider;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::audio::AudioClip;
use crate::config::ApiProvider;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// Errors surfaced by a transcription attempt.
#[derive(Debug, Error)]
pub enum SttError {
    /// No API key is configured for the provider.
    #[error("no API key configured for the speech-to-text provider")]
    NoCredential,

    /// The clip contained no audio.
    #[error("audio clip is empty")]
    EmptyAudio,

    /// The provider answered, but not in the expected shape.
    #[error("speech-to-text response was malformed")]
    InvalidResponse,

    /// Transport failure, non-2xx status, or any other provider-side fault.
    #[error("speech-to-text provider error: {0}")]
    Provider(String),
}

// ---------------------------------------------------------------------------
// Transcription
// ---------------------------------------------------------------------------

/// What a provider returns: the transcript plus the language the model
/// detected, when the API reports one.
#[derive(Debug, Clone)]
pub struct Transcription {
    pub text: String,
    pub detected_language: Option<String>,
}

// ---------------------------------------------------------------------------
// SttProvider
// ---------------------------------------------------------------------------

/// Async transcription capability.
///
/// The clip moves by value — it is consumed exactly once per episode and
/// dropped with the request body.
#[async_trait]
pub trait SttProvider: Send + Sync {
    async fn transcribe(
        &self,
        clip: AudioClip,
        language: Option<&str>,
        prompt: Option<&str>,
    ) -> Result<Transcription, SttError>;

    /// Which provider this is, for result labeling and log lines.
    fn provider(&self) -> ApiProvider;
}

// ---------------------------------------------------------------------------
// TranscriptionResult
// ---------------------------------------------------------------------------

/// One finished episode, as held by the orchestrator.
///
/// `processed_text` starts equal to `raw_text` and is replaced by the LLM
/// rewrite and the normalizer as the episode progresses. A new episode's
/// result supersedes (never merges with) the previous one.
#[derive(Debug, Clone)]
pub struct TranscriptionResult {
    /// Transcript exactly as the provider returned it.
    pub raw_text: String,
    /// Transcript after rewrite + normalization.
    pub processed_text: String,
    /// Provider that produced the transcript.
    pub provider: ApiProvider,
    /// Wall-clock time of the transcription call.
    pub elapsed: Duration,
    /// Language tag reported by the provider, if any.
    pub detected_language: Option<String>,
}

impl TranscriptionResult {
    pub fn new(
        raw_text: String,
        provider: ApiProvider,
        elapsed: Duration,
        detected_language: Option<String>,
    ) -> Self {
        Self {
            processed_text: raw_text.clone(),
            raw_text,
            provider,
            elapsed,
            detected_language,
        }
    }
}

// ---------------------------------------------------------------------------
// MockSttProvider  (test double)
// ---------------------------------------------------------------------------

// test-only provider so the orchestrator tests can count transcription
// calls without touching the network.
#[cfg(test)]
pub use mock::MockSttProvider;

#[cfg(test)]
mod mock {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Scripted [`SttProvider`] that records how often it was invoked.
    pub struct MockSttProvider {
        reply: Result<String, String>,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl MockSttProvider {
        pub fn ok(text: &str) -> Self {
            Self {
                reply: Ok(text.to_string()),
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn failing(message: &str) -> Self {
            Self {
                reply: Err(message.to_string()),
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        /// Make every call take `delay` before answering.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SttProvider for MockSttProvider {
        async fn transcribe(
            &self,
            _clip: AudioClip,
            _language: Option<&str>,
            _prompt: Option<&str>,
        ) -> Result<Transcription, SttError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            match &self.reply {
                Ok(text) => Ok(Transcription {
                    text: text.clone(),
                    detected_language: Some("zh".into()),
                }),
                Err(message) => Err(SttError::Provider(message.clone())),
            }
        }

        fn provider(&self) -> ApiProvider {
            ApiProvider::Groq
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
