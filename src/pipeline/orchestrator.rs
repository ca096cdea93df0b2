//! The orchestrator — single owner of the dictation state machine.
//!
//! Every input that can move the state machine arrives as a [`ControlEvent`]
//! on one mpsc channel: hotkey edges, episode completions, auto-revert
//! timers, activation retries, and handle commands. The control loop is the
//! only code that mutates [`SharedStatus`], so no further locking discipline
//! is needed anywhere else.
//!
//! # Stale-timer discipline
//!
//! Auto-revert timers carry the state-transition `epoch` at which they were
//! scheduled; the epoch bumps on every transition, so a timer that fires
//! after the state moved on compares unequal and does nothing. Activation
//! retries use the same trick with their own generation counter.
//!
//! # Episode flow
//!
//! ```text
//! keyUp ─▶ stop capture ─▶ debounce (< 0.3 s → Idle)
//!            └─▶ spawn episode task:
//!                  STT ─▶ (LLM rewrite, non-fatal) ─▶ normalize ─▶ inject
//!                  └─▶ ControlEvent::EpisodeDone { epoch, outcome }
//! ```
//!
//! At most one episode task is outstanding: `keyDown` is ignored while
//! Recording or Processing, so re-entry is blocked until the episode
//! resolves.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::audio::Recorder;
use crate::config::{AppConfig, CredentialStore};
use crate::hotkey::{HotkeyEdge, InputInterceptor};
use crate::inject::TextInjector;
use crate::llm::LlmRewriter;
use crate::sound::{Cue, SoundPlayer};
use crate::stt::{SttProvider, TranscriptionResult};
use crate::text::{normalize, NormalizeOptions, VocabularyLibrary};

use super::state::{new_shared_status, PipelineState, SharedStatus};

// ---------------------------------------------------------------------------
// Timings
// ---------------------------------------------------------------------------

/// Every delay the orchestrator schedules. Tests shrink these to keep the
/// suite fast; production uses the defaults.
#[derive(Debug, Clone, Copy)]
pub struct Timings {
    /// Clips shorter than this are discarded, not transcribed (debounce
    /// against accidental taps).
    pub min_clip: Duration,
    /// How long `Completed` lingers before reverting to `Idle`.
    pub completed_revert: Duration,
    /// How long `Error` lingers before clearing to `Idle`.
    pub error_revert: Duration,
    /// Interval between activation retries while the input hook is denied.
    pub activation_retry: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            min_clip: Duration::from_millis(300),
            completed_revert: Duration::from_secs(2),
            error_revert: Duration::from_secs(3),
            activation_retry: Duration::from_secs(2),
        }
    }
}

// ---------------------------------------------------------------------------
// Services
// ---------------------------------------------------------------------------

/// The injected collaborators. Constructed explicitly in `main` (or a test)
/// and handed to [`Orchestrator::new`] — there are no global singletons.
pub struct Services {
    pub interceptor: Box<dyn InputInterceptor>,
    pub recorder: Box<dyn Recorder>,
    pub stt: Arc<dyn SttProvider>,
    pub llm: Arc<dyn LlmRewriter>,
    pub credentials: Arc<dyn CredentialStore>,
    pub injector: Arc<TextInjector>,
    pub sounds: Option<SoundPlayer>,
}

// ---------------------------------------------------------------------------
// ControlEvent
// ---------------------------------------------------------------------------

/// Everything that can wake the control loop.
enum ControlEvent {
    Activate,
    Deactivate,
    Shutdown,
    Edge(HotkeyEdge),
    EpisodeDone {
        epoch: u64,
        outcome: Result<TranscriptionResult, String>,
    },
    Revert {
        epoch: u64,
    },
    RetryActivation {
        generation: u64,
    },
}

// ---------------------------------------------------------------------------
// OrchestratorHandle
// ---------------------------------------------------------------------------

/// Cloneable handle for driving and observing a running orchestrator.
#[derive(Clone)]
pub struct OrchestratorHandle {
    events: mpsc::Sender<ControlEvent>,
    status: SharedStatus,
}

impl OrchestratorHandle {
    /// Start the input hook (retrying on permission failure until it
    /// succeeds or `deactivate` is called).
    pub async fn activate(&self) {
        let _ = self.events.send(ControlEvent::Activate).await;
    }

    /// Stop the input hook and cancel any pending activation retry.
    pub async fn deactivate(&self) {
        let _ = self.events.send(ControlEvent::Deactivate).await;
    }

    /// Deactivate and end the control loop.
    pub async fn shutdown(&self) {
        let _ = self.events.send(ControlEvent::Shutdown).await;
    }

    /// Current pipeline state (read-only observation).
    pub fn state(&self) -> PipelineState {
        self.status.lock().unwrap().state.clone()
    }

    /// The most recent finished episode, if any.
    pub fn last_result(&self) -> Option<TranscriptionResult> {
        self.status.lock().unwrap().last_result.clone()
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// Snapshot of everything an episode task needs, cloned per `keyUp` so the
/// task never reaches back into the orchestrator.
struct EpisodeContext {
    stt: Arc<dyn SttProvider>,
    llm: Arc<dyn LlmRewriter>,
    credentials: Arc<dyn CredentialStore>,
    injector: Arc<TextInjector>,
    config: AppConfig,
    rules: Arc<Vec<(String, String)>>,
}

/// Drives the complete dictation pipeline. Create with
/// [`Orchestrator::new`], then spawn [`run`](Self::run) as a tokio task and
/// use the [`OrchestratorHandle`] from anywhere.
pub struct Orchestrator {
    config: AppConfig,
    /// Enabled vocabulary rules, snapshotted in library order.
    rules: Arc<Vec<(String, String)>>,
    services: Services,
    timings: Timings,
    status: SharedStatus,
    events_tx: mpsc::Sender<ControlEvent>,
    events_rx: mpsc::Receiver<ControlEvent>,
    /// Bumped on every state transition; stale timers compare against it.
    epoch: u64,
    /// Bumped whenever the activation retry schedule changes.
    retry_generation: u64,
    /// Whether the input hook is currently armed.
    hook_armed: bool,
    /// Epoch of the outstanding episode task, if any.
    processing_epoch: Option<u64>,
}

impl Orchestrator {
    pub fn new(
        config: AppConfig,
        vocabulary: &VocabularyLibrary,
        services: Services,
        timings: Timings,
    ) -> (Self, OrchestratorHandle) {
        let (events_tx, events_rx) = mpsc::channel(32);
        let status = new_shared_status();

        let handle = OrchestratorHandle {
            events: events_tx.clone(),
            status: Arc::clone(&status),
        };

        let orchestrator = Self {
            config,
            rules: Arc::new(vocabulary.active_rules()),
            services,
            timings,
            status,
            events_tx,
            events_rx,
            epoch: 0,
            retry_generation: 0,
            hook_armed: false,
            processing_epoch: None,
        };

        (orchestrator, handle)
    }

    // -----------------------------------------------------------------------
    // Control loop
    // -----------------------------------------------------------------------

    /// Run until [`OrchestratorHandle::shutdown`] is called (or every handle
    /// is dropped).
    pub async fn run(mut self) {
        while let Some(event) = self.events_rx.recv().await {
            match event {
                ControlEvent::Activate => self.handle_activate(),
                ControlEvent::Deactivate => self.handle_deactivate(),
                ControlEvent::Shutdown => {
                    self.handle_deactivate();
                    break;
                }
                ControlEvent::Edge(HotkeyEdge::Pressed(_)) => self.handle_key_down(),
                ControlEvent::Edge(HotkeyEdge::Released(_)) => self.handle_key_up(),
                ControlEvent::EpisodeDone { epoch, outcome } => {
                    self.handle_episode_done(epoch, outcome)
                }
                ControlEvent::Revert { epoch } => self.handle_revert(epoch),
                ControlEvent::RetryActivation { generation } => {
                    self.handle_retry_activation(generation)
                }
            }
        }

        log::info!("pipeline: control loop shutting down");
    }

    // -----------------------------------------------------------------------
    // Activation lifecycle
    // -----------------------------------------------------------------------

    fn handle_activate(&mut self) {
        // Any pending retry is superseded by this attempt.
        self.retry_generation += 1;

        if self.hook_armed {
            return;
        }

        let (edge_tx, edge_rx) = mpsc::channel(16);
        match self.services.interceptor.start(edge_tx) {
            Ok(()) => {
                self.hook_armed = true;
                self.spawn_edge_forwarder(edge_rx);
                log::info!("pipeline: input hook armed");
                if matches!(self.current_state(), PipelineState::Error(_)) {
                    self.set_state(PipelineState::Idle);
                }
            }
            Err(e) => {
                log::warn!("pipeline: input hook denied ({e}); retrying");
                self.set_state(PipelineState::Error(
                    "accessibility permission required".into(),
                ));
                self.arm_activation_retry();
            }
        }
    }

    fn handle_deactivate(&mut self) {
        self.retry_generation += 1;
        if self.hook_armed {
            self.services.interceptor.stop();
            self.hook_armed = false;
            log::info!("pipeline: input hook stopped");
        }
    }

    fn arm_activation_retry(&mut self) {
        let generation = self.retry_generation;
        let delay = self.timings.activation_retry;
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events
                .send(ControlEvent::RetryActivation { generation })
                .await;
        });
    }

    fn handle_retry_activation(&mut self, generation: u64) {
        if generation != self.retry_generation || self.hook_armed {
            return;
        }
        self.handle_activate();
    }

    /// Funnel interceptor edges into the control channel so state mutation
    /// stays serialized no matter which thread the OS delivers events on.
    fn spawn_edge_forwarder(&self, mut edge_rx: mpsc::Receiver<HotkeyEdge>) {
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            while let Some(edge) = edge_rx.recv().await {
                if events.send(ControlEvent::Edge(edge)).await.is_err() {
                    break;
                }
            }
        });
    }

    // -----------------------------------------------------------------------
    // Hotkey edges
    // -----------------------------------------------------------------------

    fn handle_key_down(&mut self) {
        if self.current_state().is_busy() {
            log::debug!("pipeline: keyDown ignored while busy");
            return;
        }

        if !self.services.recorder.device_available() {
            self.enter_error("microphone unavailable — check input device and permission".into());
            return;
        }

        let provider = self.config.stt.provider;
        if self.services.credentials.get(provider).is_none() {
            self.enter_error(format!(
                "missing API key for {}",
                provider.display_name()
            ));
            return;
        }

        match self.services.recorder.start_recording() {
            Ok(()) => {
                log::debug!("pipeline: keyDown → Recording");
                self.set_state(PipelineState::Recording);
                self.play(Cue::Start);
            }
            Err(e) => self.enter_error(e.to_string()),
        }
    }

    fn handle_key_up(&mut self) {
        if !matches!(self.current_state(), PipelineState::Recording) {
            log::debug!("pipeline: keyUp ignored outside Recording");
            return;
        }

        let Some(clip) = self.services.recorder.stop_recording() else {
            self.set_state(PipelineState::Idle);
            return;
        };

        self.play(Cue::Stop);

        if clip.duration() < self.timings.min_clip {
            log::debug!(
                "pipeline: clip too short ({:?}), discarding",
                clip.duration()
            );
            self.set_state(PipelineState::Idle);
            return;
        }

        log::debug!("pipeline: keyUp → Processing ({:?} clip)", clip.duration());
        self.set_state(PipelineState::Processing);
        let epoch = self.epoch;
        self.processing_epoch = Some(epoch);

        let context = EpisodeContext {
            stt: Arc::clone(&self.services.stt),
            llm: Arc::clone(&self.services.llm),
            credentials: Arc::clone(&self.services.credentials),
            injector: Arc::clone(&self.services.injector),
            config: self.config.clone(),
            rules: Arc::clone(&self.rules),
        };
        let events = self.events_tx.clone();

        tokio::spawn(async move {
            let outcome = run_episode(context, clip).await;
            let _ = events.send(ControlEvent::EpisodeDone { epoch, outcome }).await;
        });
    }

    // -----------------------------------------------------------------------
    // Episode completion and timers
    // -----------------------------------------------------------------------

    fn handle_episode_done(
        &mut self,
        epoch: u64,
        outcome: Result<TranscriptionResult, String>,
    ) {
        if self.processing_epoch != Some(epoch) {
            log::debug!("pipeline: stale episode completion ignored");
            return;
        }
        self.processing_epoch = None;

        match outcome {
            Ok(result) => {
                log::info!(
                    "pipeline: episode complete via {} in {:?}",
                    result.provider.display_name(),
                    result.elapsed
                );
                let text = result.processed_text.clone();
                self.status.lock().unwrap().last_result = Some(result);
                self.set_state(PipelineState::Completed(text));
                self.schedule_revert(self.timings.completed_revert);
            }
            Err(message) => self.enter_error(message),
        }
    }

    fn handle_revert(&mut self, epoch: u64) {
        // The epoch bumps on every transition, so equality means the state
        // this timer was armed for is still current.
        if epoch != self.epoch {
            return;
        }
        if matches!(
            self.current_state(),
            PipelineState::Completed(_) | PipelineState::Error(_)
        ) {
            self.set_state(PipelineState::Idle);
        }
    }

    fn schedule_revert(&self, after: Duration) {
        let epoch = self.epoch;
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(after).await;
            let _ = events.send(ControlEvent::Revert { epoch }).await;
        });
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn current_state(&self) -> PipelineState {
        self.status.lock().unwrap().state.clone()
    }

    fn set_state(&mut self, state: PipelineState) {
        self.epoch += 1;
        self.status.lock().unwrap().state = state;
    }

    fn enter_error(&mut self, message: String) {
        log::error!("pipeline: {message}");
        self.set_state(PipelineState::Error(message));
        self.schedule_revert(self.timings.error_revert);
    }

    fn play(&self, cue: Cue) {
        if !self.config.play_sound_effects {
            return;
        }
        if let Some(sounds) = &self.services.sounds {
            sounds.play(cue);
        }
    }
}

// ---------------------------------------------------------------------------
// Episode task
// ---------------------------------------------------------------------------

/// STT → optional LLM rewrite → normalize → inject. Runs detached from the
/// control loop; its only way back is the `EpisodeDone` message.
async fn run_episode(
    context: EpisodeContext,
    clip: crate::audio::AudioClip,
) -> Result<TranscriptionResult, String> {
    let language = context.config.stt.language.whisper_code();
    let prompt = &context.config.stt.prompt;
    let prompt = (!prompt.is_empty()).then_some(prompt.as_str());

    let started = Instant::now();
    let transcription = context
        .stt
        .transcribe(clip, Some(language), prompt)
        .await
        .map_err(|e| e.to_string())?;
    let elapsed = started.elapsed();

    log::info!(
        "stt: transcript ({} chars{})",
        transcription.text.chars().count(),
        transcription
            .detected_language
            .as_deref()
            .map(|l| format!(", language {l}"))
            .unwrap_or_default()
    );

    let mut result = TranscriptionResult::new(
        transcription.text,
        context.stt.provider(),
        elapsed,
        transcription.detected_language,
    );

    // The rewrite only runs when enabled AND a credential exists for the
    // LLM provider — checked here so no doomed request is ever sent.
    let llm_settings = &context.config.llm;
    if llm_settings.enabled && context.credentials.get(llm_settings.provider).is_some() {
        match context
            .llm
            .rewrite(&result.raw_text, &llm_settings.system_prompt)
            .await
        {
            Ok(rewritten) => result.processed_text = rewritten,
            Err(e) => {
                // Degrade to the raw transcript; never fail the episode.
                log::warn!("llm: rewrite failed ({e}); keeping the transcript");
            }
        }
    }

    let options = NormalizeOptions {
        cjk_latin_spacing: context.config.text.cjk_latin_spacing,
        punctuation: context.config.text.punctuation,
    };
    result.processed_text = normalize(&result.processed_text, &context.rules, &options);

    if !result.processed_text.is_empty() {
        context.injector.inject(&result.processed_text).await;
    }

    Ok(result)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
