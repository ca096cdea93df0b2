//! Global push-to-talk hotkey interception, backed by `rdev`.
//!
//! # Design
//!
//! `rdev::grab()` / `rdev::listen()` are blocking OS-level calls that never
//! return while the hook is healthy. They must run on a **dedicated OS
//! thread** — they cannot live inside a tokio task.
//!
//! [`RdevInterceptor::start`] spawns that thread and reports a
//! [`PermissionError`] when the platform rejects the hook (macOS without
//! accessibility permission, Linux without input-group access). Edges are
//! forwarded over a `tokio::sync::mpsc` channel so the orchestrator's
//! control loop is the single consumer regardless of which thread the OS
//! delivers events on.
//!
//! # Usage
//!
//! ```no_run
//! use tokio::sync::mpsc;
//! use talktype::hotkey::{parse_key, InputInterceptor, RdevInterceptor};
//!
//! let key = parse_key("RightCmd").expect("unknown key");
//! let mut interceptor = RdevInterceptor::new(key, true);
//!
//! let (tx, mut rx) = mpsc::channel(16);
//! interceptor.start(tx).expect("input hook denied");
//! // In your async loop: while let Some(edge) = rx.recv().await { ... }
//! ```

pub mod interceptor;

pub use interceptor::{InputInterceptor, RdevInterceptor};

use thiserror::Error;

// ---------------------------------------------------------------------------
// HotkeyEdge
// ---------------------------------------------------------------------------

/// A press or release transition of the push-to-talk key.
///
/// Carries the physical key that triggered it. Produced by the interceptor
/// thread, consumed exactly once by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyEdge {
    Pressed(rdev::Key),
    Released(rdev::Key),
}

impl HotkeyEdge {
    /// The physical key that produced this edge.
    pub fn key(&self) -> rdev::Key {
        match self {
            HotkeyEdge::Pressed(k) | HotkeyEdge::Released(k) => *k,
        }
    }
}

// ---------------------------------------------------------------------------
// PermissionError
// ---------------------------------------------------------------------------

/// The OS denied low-level input access.
///
/// Recoverable: callers retry with backoff once the user grants permission
/// (see the orchestrator's activation loop).
#[derive(Debug, Clone, Error)]
#[error("low-level input access denied: {0}")]
pub struct PermissionError(pub String);

// ---------------------------------------------------------------------------
// parse_key
// ---------------------------------------------------------------------------

/// Parse a hotkey name from a config string into an [`rdev::Key`].
///
/// Matching is case-insensitive. Supports modifier keys (the usual
/// push-to-talk choices), F1–F12, common named keys, and single ASCII
/// letters. Returns `None` for unrecognised names so callers can fall back
/// to a default or surface a config error.
///
/// # Examples
///
/// ```
/// use talktype::hotkey::parse_key;
///
/// assert_eq!(parse_key("RightCmd"), Some(rdev::Key::MetaRight));
/// assert_eq!(parse_key("F9"),       Some(rdev::Key::F9));
/// assert_eq!(parse_key("a"),        Some(rdev::Key::KeyA));
/// assert_eq!(parse_key("xyz"),      None);
/// ```
pub fn parse_key(key_str: &str) -> Option<rdev::Key> {
    use rdev::Key;

    match key_str.to_uppercase().as_str() {
        // Modifier keys
        "LEFTCMD" | "LEFTMETA" | "CMD" | "META" => Some(Key::MetaLeft),
        "RIGHTCMD" | "RIGHTMETA" => Some(Key::MetaRight),
        "LEFTALT" | "LEFTOPTION" | "ALT" | "OPTION" => Some(Key::Alt),
        "RIGHTALT" | "RIGHTOPTION" => Some(Key::AltGr),
        "LEFTCTRL" | "CTRL" | "CONTROL" => Some(Key::ControlLeft),
        "RIGHTCTRL" => Some(Key::ControlRight),
        "LEFTSHIFT" | "SHIFT" => Some(Key::ShiftLeft),
        "RIGHTSHIFT" => Some(Key::ShiftRight),

        // Function keys
        "F1" => Some(Key::F1),
        "F2" => Some(Key::F2),
        "F3" => Some(Key::F3),
        "F4" => Some(Key::F4),
        "F5" => Some(Key::F5),
        "F6" => Some(Key::F6),
        "F7" => Some(Key::F7),
        "F8" => Some(Key::F8),
        "F9" => Some(Key::F9),
        "F10" => Some(Key::F10),
        "F11" => Some(Key::F11),
        "F12" => Some(Key::F12),

        // Navigation / control
        "ESCAPE" | "ESC" => Some(Key::Escape),
        "SPACE" => Some(Key::Space),
        "TAB" => Some(Key::Tab),
        "RETURN" | "ENTER" => Some(Key::Return),
        "BACKSPACE" => Some(Key::Backspace),
        "DELETE" | "DEL" => Some(Key::Delete),
        "HOME" => Some(Key::Home),
        "END" => Some(Key::End),
        "PAGEUP" => Some(Key::PageUp),
        "PAGEDOWN" => Some(Key::PageDown),
        "UP" | "UPARROW" => Some(Key::UpArrow),
        "DOWN" | "DOWNARROW" => Some(Key::DownArrow),
        "LEFT" | "LEFTARROW" => Some(Key::LeftArrow),
        "RIGHT" | "RIGHTARROW" => Some(Key::RightArrow),

        // Lock / special
        "CAPSLOCK" => Some(Key::CapsLock),
        "NUMLOCK" => Some(Key::NumLock),
        "SCROLLLOCK" => Some(Key::ScrollLock),
        "PRINTSCREEN" => Some(Key::PrintScreen),
        "PAUSE" => Some(Key::Pause),

        // Letter keys
        "A" => Some(Key::KeyA),
        "B" => Some(Key::KeyB),
        "C" => Some(Key::KeyC),
        "D" => Some(Key::KeyD),
        "E" => Some(Key::KeyE),
        "F" => Some(Key::KeyF),
        "G" => Some(Key::KeyG),
        "H" => Some(Key::KeyH),
        "I" => Some(Key::KeyI),
        "J" => Some(Key::KeyJ),
        "K" => Some(Key::KeyK),
        "L" => Some(Key::KeyL),
        "M" => Some(Key::KeyM),
        "N" => Some(Key::KeyN),
        "O" => Some(Key::KeyO),
        "P" => Some(Key::KeyP),
        "Q" => Some(Key::KeyQ),
        "R" => Some(Key::KeyR),
        "S" => Some(Key::KeyS),
        "T" => Some(Key::KeyT),
        "U" => Some(Key::KeyU),
        "V" => Some(Key::KeyV),
        "W" => Some(Key::KeyW),
        "X" => Some(Key::KeyX),
        "Y" => Some(Key::KeyY),
        "Z" => Some(Key::KeyZ),

        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_modifier_keys() {
        assert_eq!(parse_key("RightCmd"), Some(rdev::Key::MetaRight));
        assert_eq!(parse_key("rightmeta"), Some(rdev::Key::MetaRight));
        assert_eq!(parse_key("RightAlt"), Some(rdev::Key::AltGr));
        assert_eq!(parse_key("Ctrl"), Some(rdev::Key::ControlLeft));
    }

    #[test]
    fn parse_function_keys() {
        assert_eq!(parse_key("F9"), Some(rdev::Key::F9));
        assert_eq!(parse_key("f1"), Some(rdev::Key::F1));
        assert_eq!(parse_key("F12"), Some(rdev::Key::F12));
    }

    #[test]
    fn parse_named_keys() {
        assert_eq!(parse_key("Escape"), Some(rdev::Key::Escape));
        assert_eq!(parse_key("esc"), Some(rdev::Key::Escape));
        assert_eq!(parse_key("CapsLock"), Some(rdev::Key::CapsLock));
        assert_eq!(parse_key("Enter"), Some(rdev::Key::Return));
    }

    #[test]
    fn parse_letter_keys_case_insensitive() {
        assert_eq!(parse_key("A"), Some(rdev::Key::KeyA));
        assert_eq!(parse_key("a"), Some(rdev::Key::KeyA));
        assert_eq!(parse_key("z"), Some(rdev::Key::KeyZ));
    }

    #[test]
    fn parse_unknown_key_returns_none() {
        assert_eq!(parse_key("xyz"), None);
        assert_eq!(parse_key(""), None);
        assert_eq!(parse_key("Ctrl+V"), None);
    }

    #[test]
    fn edge_exposes_its_key() {
        assert_eq!(
            HotkeyEdge::Pressed(rdev::Key::F9).key(),
            rdev::Key::F9
        );
        assert_eq!(
            HotkeyEdge::Released(rdev::Key::MetaRight).key(),
            rdev::Key::MetaRight
        );
    }
}
