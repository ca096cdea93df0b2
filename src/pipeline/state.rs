//! Pipeline state machine types and the shared read-only status handle.
//!
//! [`PipelineState`] is mutated only on the orchestrator's control loop;
//! everything else (UI, logs, tests) observes it through [`SharedStatus`].

use std::sync::{Arc, Mutex};

use crate::stt::TranscriptionResult;

// ---------------------------------------------------------------------------
// PipelineState
// ---------------------------------------------------------------------------

/// States of the dictation pipeline.
///
/// ```text
/// Idle ──keyDown──▶ Recording ──keyUp──▶ Processing
///                       │                    ├─ success ─▶ Completed(text) ──~2s──▶ Idle
///                       └─ clip < 0.3s ─▶ Idle
///                                            └─ failure ─▶ Error(message) ──~3s──▶ Idle
/// ```
///
/// `Error` is also entered from precondition failures (no device, missing
/// credential) and from a denied input hook during activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineState {
    /// Waiting for the push-to-talk key.
    Idle,

    /// Microphone is live; audio is accumulating.
    Recording,

    /// The clip is in flight through STT → rewrite → normalize → inject.
    Processing,

    /// The episode finished; carries the injected text. Auto-reverts to
    /// `Idle` unless a new transition supersedes it first.
    Completed(String),

    /// Something failed; carries a human-readable message. Auto-clears to
    /// `Idle`.
    Error(String),
}

impl PipelineState {
    /// `true` while a new recording may not start.
    ///
    /// ```
    /// use talktype::pipeline::PipelineState;
    ///
    /// assert!(!PipelineState::Idle.is_busy());
    /// assert!(PipelineState::Recording.is_busy());
    /// assert!(PipelineState::Processing.is_busy());
    /// assert!(!PipelineState::Completed("x".into()).is_busy());
    /// assert!(!PipelineState::Error("e".into()).is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, PipelineState::Recording | PipelineState::Processing)
    }

    /// Short label for status displays and log lines.
    pub fn label(&self) -> &'static str {
        match self {
            PipelineState::Idle => "Idle",
            PipelineState::Recording => "Recording",
            PipelineState::Processing => "Processing",
            PipelineState::Completed(_) => "Done",
            PipelineState::Error(_) => "Error",
        }
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        PipelineState::Idle
    }
}

// ---------------------------------------------------------------------------
// Status / SharedStatus
// ---------------------------------------------------------------------------

/// Everything an observer can see: the current state and the most recent
/// finished episode.
#[derive(Debug, Default)]
pub struct Status {
    pub state: PipelineState,
    /// Superseded wholesale by each new episode.
    pub last_result: Option<TranscriptionResult>,
}

/// Thread-safe read handle to [`Status`].
///
/// Cheap to clone. Lock for short critical sections only; never across an
/// `.await`.
pub type SharedStatus = Arc<Mutex<Status>>;

/// Construct a fresh [`SharedStatus`] in `Idle`.
pub fn new_shared_status() -> SharedStatus {
    Arc::new(Mutex::new(Status::default()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
