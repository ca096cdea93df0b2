//! Application entry point — talktype daemon.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] and the vocabulary (defaults on first run).
//! 3. Open the credential store and build the STT / LLM providers.
//! 4. Spawn the audio-capture worker and the sound-cue thread.
//! 5. Construct the orchestrator with every collaborator injected.
//! 6. Activate (arms the input hook, retrying while permission is denied).
//! 7. Block on Ctrl-C, then shut the control loop down.
//!
//! `talktype set-key <provider> <secret>` and `talktype clear-key <provider>`
//! manage API credentials without starting the daemon.

use std::sync::Arc;
use std::time::Duration;

use anyhow::bail;
use talktype::{
    audio::CpalRecorder,
    config::{ApiProvider, AppConfig, CredentialStore, FileCredentialStore},
    hotkey::{parse_key, RdevInterceptor},
    inject::{EnigoPaste, SystemClipboard, TextInjector},
    llm::{ApiRewriter, LlmRewriter},
    pipeline::{Orchestrator, Services, Timings},
    sound::SoundPlayer,
    stt::{HttpWhisperProvider, SttProvider},
    text::VocabularyLibrary,
};

fn parse_provider(name: &str) -> anyhow::Result<ApiProvider> {
    match name.to_lowercase().as_str() {
        "groq" => Ok(ApiProvider::Groq),
        "openai" => Ok(ApiProvider::OpenAi),
        _ => bail!("unknown provider {name:?} (expected \"groq\" or \"openai\")"),
    }
}

/// Credential management commands; returns `false` when no command was given
/// and the daemon should start.
fn run_command(args: &[String]) -> anyhow::Result<bool> {
    let store = FileCredentialStore::open_default();
    match args {
        [] => Ok(false),
        [cmd, provider, secret] if cmd == "set-key" => {
            let provider = parse_provider(provider)?;
            store.set(provider, secret)?;
            println!("stored API key for {}", provider.display_name());
            Ok(true)
        }
        [cmd, provider] if cmd == "clear-key" => {
            let provider = parse_provider(provider)?;
            store.clear(provider)?;
            println!("cleared API key for {}", provider.display_name());
            Ok(true)
        }
        _ => bail!("usage: talktype [set-key <groq|openai> <secret> | clear-key <groq|openai>]"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if run_command(&args)? {
        return Ok(());
    }

    log::info!("talktype starting up");

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("failed to load config ({e}); using defaults");
        AppConfig::default()
    });
    let vocabulary = VocabularyLibrary::load_or_default();
    log::info!(
        "config: stt={}, llm={} ({}), {} vocabulary entries",
        config.stt.provider.display_name(),
        if config.llm.enabled { "on" } else { "off" },
        config.llm.provider.display_name(),
        vocabulary.len()
    );

    let credentials: Arc<dyn CredentialStore> = Arc::new(FileCredentialStore::open_default());

    let stt: Arc<dyn SttProvider> = Arc::new(HttpWhisperProvider::new(
        config.stt.provider,
        Arc::clone(&credentials),
    ));
    let llm: Arc<dyn LlmRewriter> = Arc::new(ApiRewriter::new(
        config.llm.provider,
        Duration::from_secs(config.llm.timeout_secs),
        Arc::clone(&credentials),
    ));

    let injector = Arc::new(TextInjector::new(
        Arc::new(SystemClipboard),
        Arc::new(EnigoPaste),
    ));

    let key = parse_key(&config.hotkey.key).unwrap_or_else(|| {
        log::warn!(
            "unknown hotkey {:?}; falling back to RightCmd",
            config.hotkey.key
        );
        rdev::Key::MetaRight
    });
    let interceptor = RdevInterceptor::new(key, config.hotkey.swallow);

    let sounds = config.play_sound_effects.then(SoundPlayer::spawn);

    let services = Services {
        interceptor: Box::new(interceptor),
        recorder: Box::new(CpalRecorder::new()),
        stt,
        llm,
        credentials,
        injector,
        sounds,
    };

    let hotkey_name = config.hotkey.key.clone();
    let (orchestrator, handle) =
        Orchestrator::new(config, &vocabulary, services, Timings::default());
    let runner = tokio::spawn(orchestrator.run());

    handle.activate().await;
    log::info!("ready — hold {hotkey_name} to dictate");

    tokio::signal::ctrl_c().await?;
    log::info!("shutting down");
    handle.shutdown().await;
    let _ = runner.await;

    Ok(())
}
