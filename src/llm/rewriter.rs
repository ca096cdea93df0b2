//! Chat-completions rewriter.
//!
//! [`ApiRewriter`] calls the configured provider's `/chat/completions`
//! endpoint with the system prompt from settings and the transcript as the
//! user message. Works against any provider in the [`ApiProvider`] catalog;
//! nothing is hardcoded beyond the catalog entries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::config::{ApiProvider, CredentialStore};

use super::{LlmError, LlmRewriter};

// ---------------------------------------------------------------------------
// ApiRewriter
// ---------------------------------------------------------------------------

/// Rewrites transcripts through a hosted chat-completions API.
pub struct ApiRewriter {
    client: reqwest::Client,
    provider: ApiProvider,
    credentials: Arc<dyn CredentialStore>,
}

impl ApiRewriter {
    /// Build a rewriter with a per-request `timeout` (the settings default
    /// is 15 s — long enough for a paragraph, short enough that a hung
    /// provider never stalls an episode noticeably).
    pub fn new(
        provider: ApiProvider,
        timeout: Duration,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
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
impl LlmRewriter for ApiRewriter {
    async fn rewrite(&self, text: &str, system_prompt: &str) -> Result<String, LlmError> {
        if text.is_empty() {
            return Ok(text.to_string());
        }

        let key = self
            .credentials
            .get(self.provider)
            .ok_or_else(|| LlmError::Provider("no API key configured".into()))?;

        let body = serde_json::json!({
            "model": self.provider.llm_model(),
            "messages": [
                { "role": "system", "content": system_prompt },
                { "role": "user",   "content": text }
            ],
            "temperature": 0.7,
            "max_tokens": 2048
        });

        let response = self
            .client
            .post(self.provider.chat_completion_url())
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider(e.to_string()))?;

        let status = response.status();
        let payload = response
            .text()
            .await
            .map_err(|e| LlmError::Provider(e.to_string()))?;

        if !status.is_success() {
            return Err(LlmError::Provider(format!("HTTP {status}: {payload}")));
        }

        let json: serde_json::Value =
            serde_json::from_str(&payload).map_err(|_| LlmError::InvalidResponse)?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or(LlmError::InvalidResponse)?
            .trim();

        // An empty rewrite means "no change", not an error.
        if content.is_empty() {
            return Ok(text.to_string());
        }

        Ok(content.to_string())
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

    fn rewriter() -> ApiRewriter {
        ApiRewriter::new(
            ApiProvider::OpenAi,
            Duration::from_secs(15),
            Arc::new(NoCredentials),
        )
    }

    #[tokio::test]
    async fn empty_input_short_circuits() {
        // No credential configured, yet empty input must succeed unchanged.
        let out = rewriter().rewrite("", "prompt").await.unwrap();
        assert_eq!(out, "");
    }

    #[tokio::test]
    async fn missing_credential_fails_without_network() {
        let err = rewriter().rewrite("text", "prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::Provider(_)));
    }

    #[test]
    fn rewriter_is_object_safe() {
        let _boxed: Box<dyn LlmRewriter> = Box::new(rewriter());
    }
}
