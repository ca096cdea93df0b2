//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across threads.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::text::PunctuationStyle;

use super::{ApiProvider, AppPaths};

// ---------------------------------------------------------------------------
// Language
// ---------------------------------------------------------------------------

/// Primary dictation language.
///
/// The variants carry BCP-47-ish tags in the settings file; Whisper only
/// distinguishes base languages, so both Chinese variants map to `"zh"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "zh-Hant")]
    ZhHant,
    #[serde(rename = "zh-Hans")]
    ZhHans,
    #[serde(rename = "en")]
    En,
    #[serde(rename = "ja")]
    Ja,
    #[serde(rename = "ko")]
    Ko,
}

impl Language {
    /// Language code sent to the Whisper transcription API.
    pub fn whisper_code(&self) -> &'static str {
        match self {
            Language::ZhHant | Language::ZhHans => "zh",
            Language::En => "en",
            Language::Ja => "ja",
            Language::Ko => "ko",
        }
    }
}

impl Default for Language {
    fn default() -> Self {
        Language::ZhHant
    }
}

// ---------------------------------------------------------------------------
// SttSettings
// ---------------------------------------------------------------------------

/// Settings for the remote speech-to-text call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SttSettings {
    /// Which hosted provider transcribes the audio.
    pub provider: ApiProvider,
    /// Primary speech language, sent as a hint to the API.
    pub language: Language,
    /// Whisper-style context prompt biasing the transcription vocabulary.
    pub prompt: String,
}

impl Default for SttSettings {
    fn default() -> Self {
        Self {
            provider: ApiProvider::Groq,
            language: Language::default(),
            prompt: "繁體中文語音輸入，可能混合英文技術詞彙，例如 API、GitHub、Rust、macOS。"
                .into(),
        }
    }
}

// ---------------------------------------------------------------------------
// TextSettings
// ---------------------------------------------------------------------------

/// Settings consumed by the text normalizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSettings {
    /// Insert a space wherever CJK text meets ASCII letters/digits.
    pub cjk_latin_spacing: bool,
    /// Punctuation conversion applied after spacing.
    pub punctuation: PunctuationStyle,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            cjk_latin_spacing: true,
            punctuation: PunctuationStyle::FullWidth,
        }
    }
}

// ---------------------------------------------------------------------------
// LlmSettings
// ---------------------------------------------------------------------------

/// Settings for the optional LLM rewrite pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Whether the rewrite pass runs at all.
    pub enabled: bool,
    /// Which hosted provider performs the rewrite (independent of the STT
    /// provider).
    pub provider: ApiProvider,
    /// System prompt steering the rewrite.
    pub system_prompt: String,
    /// Maximum seconds to wait for the rewrite before giving up.
    pub timeout_secs: u64,
}

impl LlmSettings {
    const DEFAULT_SYSTEM_PROMPT: &'static str = "你是語音輸入的改寫助手。\
使用者用語音輸入文字，請理解語意後用通順的書面語重寫：去除口語贅詞、\
保持繁體中文、補上合適的標點、英文專有名詞維持正確拼寫、不改變原意。\
直接輸出改寫後的文字，不要任何解釋。";
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            provider: ApiProvider::OpenAi,
            system_prompt: Self::DEFAULT_SYSTEM_PROMPT.into(),
            timeout_secs: 15,
        }
    }
}

// ---------------------------------------------------------------------------
// HotkeySettings
// ---------------------------------------------------------------------------

/// Push-to-talk hotkey binding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotkeySettings {
    /// Key name, parsed by [`crate::hotkey::parse_key`] (e.g. `"RightCmd"`,
    /// `"F9"`).
    pub key: String,
    /// Swallow the key's own events so no other application sees them.
    pub swallow: bool,
}

impl Default for HotkeySettings {
    fn default() -> Self {
        Self {
            key: "RightCmd".into(),
            swallow: true,
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// # Persistence
///
/// ```rust,no_run
/// use talktype::config::AppConfig;
///
/// // Load (returns Default when the file is missing)
/// let config = AppConfig::load().unwrap();
/// // config.save().unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Play short audio cues when recording starts and stops.
    pub play_sound_effects: bool,
    /// Speech-to-text settings.
    pub stt: SttSettings,
    /// Text normalization settings.
    pub text: TextSettings,
    /// LLM rewrite settings.
    pub llm: LlmSettings,
    /// Hotkey binding.
    pub hotkey: HotkeySettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            play_sound_effects: true,
            stt: SttSettings::default(),
            text: TextSettings::default(),
            llm: LlmSettings::default(),
            hotkey: HotkeySettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet
    /// (first-run scenario) so callers never need to special-case a missing
    /// file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::new().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    /// A default `AppConfig` must survive a TOML round trip unchanged.
    #[test]
    fn round_trip_toml() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("settings.toml");

        let original = AppConfig::default();
        original.save_to(&path).expect("save");

        let loaded = AppConfig::load_from(&path).expect("load");

        assert_eq!(original.play_sound_effects, loaded.play_sound_effects);
        assert_eq!(original.stt.provider, loaded.stt.provider);
        assert_eq!(original.stt.language, loaded.stt.language);
        assert_eq!(original.stt.prompt, loaded.stt.prompt);
        assert_eq!(original.text.cjk_latin_spacing, loaded.text.cjk_latin_spacing);
        assert_eq!(original.text.punctuation, loaded.text.punctuation);
        assert_eq!(original.llm.enabled, loaded.llm.enabled);
        assert_eq!(original.llm.provider, loaded.llm.provider);
        assert_eq!(original.llm.timeout_secs, loaded.llm.timeout_secs);
        assert_eq!(original.hotkey.key, loaded.hotkey.key);
        assert_eq!(original.hotkey.swallow, loaded.hotkey.swallow);
    }

    /// `load_from` on a non-existent path must return `Default` without error.
    #[test]
    fn load_missing_returns_default() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("nonexistent.toml");

        let config = AppConfig::load_from(&path).expect("should not error");
        let default = AppConfig::default();

        assert_eq!(config.stt.provider, default.stt.provider);
        assert_eq!(config.hotkey.key, default.hotkey.key);
    }

    #[test]
    fn default_values() {
        let cfg = AppConfig::default();

        assert!(cfg.play_sound_effects);
        assert_eq!(cfg.stt.provider, ApiProvider::Groq);
        assert_eq!(cfg.stt.language, Language::ZhHant);
        assert!(cfg.text.cjk_latin_spacing);
        assert_eq!(cfg.text.punctuation, PunctuationStyle::FullWidth);
        assert!(cfg.llm.enabled);
        assert_eq!(cfg.llm.provider, ApiProvider::OpenAi);
        assert_eq!(cfg.llm.timeout_secs, 15);
        assert_eq!(cfg.hotkey.key, "RightCmd");
        assert!(cfg.hotkey.swallow);
    }

    /// Modified non-default values must survive a round trip.
    #[test]
    fn round_trip_modified_values() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("modified.toml");

        let mut cfg = AppConfig::default();
        cfg.play_sound_effects = false;
        cfg.stt.provider = ApiProvider::OpenAi;
        cfg.stt.language = Language::Ja;
        cfg.text.punctuation = PunctuationStyle::HalfWidth;
        cfg.llm.enabled = false;
        cfg.llm.timeout_secs = 30;
        cfg.hotkey.key = "F9".into();
        cfg.hotkey.swallow = false;

        cfg.save_to(&path).expect("save");
        let loaded = AppConfig::load_from(&path).expect("load");

        assert!(!loaded.play_sound_effects);
        assert_eq!(loaded.stt.provider, ApiProvider::OpenAi);
        assert_eq!(loaded.stt.language, Language::Ja);
        assert_eq!(loaded.text.punctuation, PunctuationStyle::HalfWidth);
        assert!(!loaded.llm.enabled);
        assert_eq!(loaded.llm.timeout_secs, 30);
        assert_eq!(loaded.hotkey.key, "F9");
        assert!(!loaded.hotkey.swallow);
    }

    #[test]
    fn whisper_codes() {
        assert_eq!(Language::ZhHant.whisper_code(), "zh");
        assert_eq!(Language::ZhHans.whisper_code(), "zh");
        assert_eq!(Language::En.whisper_code(), "en");
        assert_eq!(Language::Ja.whisper_code(), "ja");
        assert_eq!(Language::Ko.whisper_code(), "ko");
    }
}
