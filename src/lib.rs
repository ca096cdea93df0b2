//! talktype — push-to-talk dictation.
//!
//! Hold the configured hotkey, speak, release: the recording is transcribed
//! by a hosted speech-to-text provider, optionally rewritten by an LLM,
//! normalized (vocabulary substitution, CJK/Latin spacing, punctuation
//! style), and pasted into whatever application has input focus.
//!
//! # Architecture
//!
//! ```text
//! rdev hook ──edges──▶ Orchestrator (single control loop)
//!                        │  keyDown: cpal capture starts
//!                        │  keyUp:   clip → STT → LLM → normalize → inject
//!                        ▼
//!                  PipelineState (Idle / Recording / Processing /
//!                                 Completed / Error, auto-reverting)
//! ```
//!
//! All collaborators sit behind traits ([`audio::Recorder`],
//! [`hotkey::InputInterceptor`], [`stt::SttProvider`], [`llm::LlmRewriter`],
//! [`inject::ClipboardBackend`], [`config::CredentialStore`]) and are
//! constructed explicitly in `main` — no global singletons anywhere.

pub mod audio;
pub mod config;
pub mod hotkey;
pub mod inject;
pub mod llm;
pub mod pipeline;
pub mod sound;
pub mod stt;
pub mod text;
