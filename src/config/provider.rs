//! API provider catalog — endpoints and model names for the hosted
//! transcription and chat-completion services.
//!
//! Both services speak the OpenAI wire format, so a provider is fully
//! described by its endpoints plus the model identifiers to request.
//! Credentials are stored per provider under [`ApiProvider::id`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ApiProvider
// ---------------------------------------------------------------------------

/// A hosted API provider usable for speech-to-text, LLM rewriting, or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProvider {
    Groq,
    OpenAi,
}

impl ApiProvider {
    /// Stable identifier used as the credential-store key.
    pub fn id(&self) -> &'static str {
        match self {
            ApiProvider::Groq => "groq",
            ApiProvider::OpenAi => "openai",
        }
    }

    /// Human-readable name for log and error messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            ApiProvider::Groq => "Groq",
            ApiProvider::OpenAi => "OpenAI",
        }
    }

    /// Audio-transcription endpoint (multipart upload).
    pub fn transcription_url(&self) -> &'static str {
        match self {
            ApiProvider::Groq => "https://api.groq.com/openai/v1/audio/transcriptions",
            ApiProvider::OpenAi => "https://api.openai.com/v1/audio/transcriptions",
        }
    }

    /// Whisper model requested for transcription.
    pub fn stt_model(&self) -> &'static str {
        match self {
            ApiProvider::Groq => "whisper-large-v3-turbo",
            ApiProvider::OpenAi => "whisper-1",
        }
    }

    /// Chat-completions endpoint used for LLM rewriting.
    pub fn chat_completion_url(&self) -> &'static str {
        match self {
            ApiProvider::Groq => "https://api.groq.com/openai/v1/chat/completions",
            ApiProvider::OpenAi => "https://api.openai.com/v1/chat/completions",
        }
    }

    /// Model requested for LLM rewriting.
    pub fn llm_model(&self) -> &'static str {
        match self {
            ApiProvider::Groq => "llama-3.3-70b-versatile",
            ApiProvider::OpenAi => "gpt-4o-mini",
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
