//! LLM rewrite capability — the optional semantic pass over a raw
//! transcript.
//!
//! [`LlmRewriter`] turns spoken-style text into clean written text using a
//! chat-completions endpoint. Failure here is always non-fatal: the
//! orchestrator logs it and keeps the unmodified transcript, and an empty
//! model reply is treated as "no change" rather than an error.

pub mod rewriter;

pub use rewriter::ApiRewriter;

use async_trait::async_trait;
use thiserror::Error;

// ---------------------------------------------------------------------------
// LlmError
// ---------------------------------------------------------------------------

/// Errors surfaced by a rewrite attempt.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The provider answered, but not in the expected shape.
    #[error("language model response was malformed")]
    InvalidResponse,

    /// Transport failure, non-2xx status, timeout, or missing credential.
    #[error("language model provider error: {0}")]
    Provider(String),
}

// ---------------------------------------------------------------------------
// LlmRewriter
// ---------------------------------------------------------------------------

/// Async rewrite capability.
///
/// Implementors must be `Send + Sync` so the orchestrator can share them as
/// `Arc<dyn LlmRewriter>` with episode tasks.
#[async_trait]
pub trait LlmRewriter: Send + Sync {
    /// Rewrite `text` under `system_prompt`. Empty provider output means
    /// "no change" — implementations return the input in that case.
    async fn rewrite(&self, text: &str, system_prompt: &str) -> Result<String, LlmError>;
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use mock::{FailingRewriter, FixedRewriter};

#[cfg(test)]
mod mock {
    use super::*;

    /// Always rewrites to a fixed string.
    pub struct FixedRewriter(pub String);

    #[async_trait]
    impl LlmRewriter for FixedRewriter {
        async fn rewrite(&self, _text: &str, _system_prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.clone())
        }
    }

    /// Always fails; the pipeline must keep the raw transcript.
    pub struct FailingRewriter;

    #[async_trait]
    impl LlmRewriter for FailingRewriter {
        async fn rewrite(&self, _text: &str, _system_prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Provider("connection refused".into()))
        }
    }
}
