//! Hosted Whisper transcription over HTTP.
//!
//! [`HttpWhisperProvider`] posts the clip as a multipart form to an
//! OpenAI-style `audio/transcriptions` endpoint. Groq and OpenAI both speak
//! this format; the [`ApiProvider`] catalog supplies the endpoint and model
//! name, so one implementation covers every configured provider.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::audio::AudioClip;
use crate::config::{ApiProvider, CredentialStore};

use super::{SttError, SttProvider, Transcription};

/// Upper bound on one transcription round-trip.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// HttpWhisperProvider
// ---------------------------------------------------------------------------

/// Remote Whisper transcription for any OpenAI-compatible provider.
pub struct HttpWhisperProvider {
    client: reqwest::Client,
    provider: ApiProvider,
    credentials: Arc<dyn CredentialStore>,
}

impl HttpWhisperProvider {
    /// Build a provider client. The API key is read from `credentials` per
    /// call so newly saved keys take effect without a restart.
    pub fn new(provider: ApiProvider, credentials: Arc<dyn CredentialStore>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            provider,
            credentials,
        }
    }
}

#[async_trait]
impl SttProvider for HttpWhisperProvider {
    /// Upload the clip and return the transcript.
    ///
    /// The request carries the model name, `response_format=verbose_json`
    /// (so the detected language comes back) and `temperature=0` for
    /// deterministic output, plus the optional language hint and context
    /// prompt.
    async fn transcribe(
        &self,
        clip: AudioClip,
        language: Option<&str>,
        prompt: Option<&str>,
    ) -> Result<Transcription, SttError> {
        if clip.is_empty() {
            return Err(SttError::EmptyAudio);
        }

        let key = self
            .credentials
            .get(self.provider)
            .ok_or(SttError::NoCredential)?;

        let wav = clip
            .wav_bytes()
            .map_err(|e| SttError::Provider(format!("wav encoding failed: {e}")))?;

        let file = reqwest::multipart::Part::bytes(wav)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| SttError::Provider(e.to_string()))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file)
            .text("model", self.provider.stt_model())
            .text("response_format", "verbose_json")
            .text("temperature", "0");

        if let Some(language) = language {
            form = form.text("language", language.to_string());
        }
        if let Some(prompt) = prompt {
            form = form.text("prompt", prompt.to_string());
        }

        let response = self
            .client
            .post(self.provider.transcription_url())
            .bearer_auth(key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SttError::Provider(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SttError::Provider(e.to_string()))?;

        if !status.is_success() {
            return Err(SttError::Provider(format!("HTTP {status}: {body}")));
        }

        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(|_| SttError::InvalidResponse)?;
        let text = json["text"]
            .as_str()
            .ok_or(SttError::InvalidResponse)?
            .trim()
            .to_string();
        let detected_language = json["language"].as_str().map(str::to_string);

        Ok(Transcription {
            text,
            detected_language,
        })
    }

    fn provider(&self) -> ApiProvider {
        self.provider
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct NoCredentials;

    impl CredentialStore for NoCredentials {
        fn get(&self, _provider: ApiProvider) -> Option<String> {
            None
        }
        fn set(&self, _provider: ApiProvider, _secret: &str) -> anyhow::Result<()> {
            Ok(())
        }
        fn clear(&self, _provider: ApiProvider) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn empty_clip_is_rejected_before_anything_else() {
        let provider =
            HttpWhisperProvider::new(ApiProvider::Groq, Arc::new(NoCredentials));
        let err = provider
            .transcribe(AudioClip::from_samples(Vec::new()), None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, SttError::EmptyAudio));
    }

    /// A missing credential must fail synchronously — no request is sent.
    #[tokio::test]
    async fn missing_credential_fails_without_network() {
        let provider =
            HttpWhisperProvider::new(ApiProvider::Groq, Arc::new(NoCredentials));
        let clip = AudioClip::from_samples(vec![0_i16; 16_000]);
        let err = provider.transcribe(clip, Some("zh"), None).await.unwrap_err();
        assert!(matches!(err, SttError::NoCredential));
    }

    #[test]
    fn provider_is_object_safe() {
        let boxed: Box<dyn SttProvider> = Box::new(HttpWhisperProvider::new(
            ApiProvider::OpenAi,
            Arc::new(NoCredentials),
        ));
        assert_eq!(boxed.provider(), ApiProvider::OpenAi);
    }
}
