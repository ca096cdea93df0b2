//! Paste-keystroke synthesis behind a backend trait.
//!
//! [`EnigoPaste`] sends the OS-appropriate paste shortcut to the currently
//! focused window:
//!
//! | Platform | Shortcut |
//! |----------|----------|
//! | macOS    | ⌘V (Meta + V) |
//! | Windows  | Ctrl+V |
//! | Linux    | Ctrl+V |

use enigo::{Direction, Enigo, Key, Keyboard, Settings};

use super::InjectError;

// ---------------------------------------------------------------------------
// PasteKeys
// ---------------------------------------------------------------------------

/// Synthesizes the paste keystroke combination.
pub trait PasteKeys: Send + Sync {
    fn send_paste(&self) -> Result<(), InjectError>;
}

// ---------------------------------------------------------------------------
// EnigoPaste
// ---------------------------------------------------------------------------

/// enigo-backed paste synthesis.
///
/// A new [`Enigo`] instance is created per call because `Enigo` is not
/// `Send` and the handle is cheap to construct.
pub struct EnigoPaste;

impl PasteKeys for EnigoPaste {
    fn send_paste(&self) -> Result<(), InjectError> {
        let mut enigo = Enigo::new(&Settings::default())
            .map_err(|e| InjectError::KeySimulation(e.to_string()))?;

        #[cfg(target_os = "macos")]
        let modifier = Key::Meta;
        #[cfg(not(target_os = "macos"))]
        let modifier = Key::Control;

        enigo
            .key(modifier, Direction::Press)
            .map_err(|e| InjectError::KeySimulation(e.to_string()))?;
        enigo
            .key(Key::Unicode('v'), Direction::Click)
            .map_err(|e| InjectError::KeySimulation(e.to_string()))?;
        enigo
            .key(modifier, Direction::Release)
            .map_err(|e| InjectError::KeySimulation(e.to_string()))?;

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Test doubles
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use fake::{FailingPasteKeys, RecordingPasteKeys};

#[cfg(test)]
mod fake {
    use std::sync::{Arc, Mutex};

    use crate::inject::clipboard::MemoryClipboard;

    use super::*;

    /// Records what the "target application" would have pasted: on each
    /// paste it reads the fake clipboard's current text, like a real paste
    /// target does.
    pub struct RecordingPasteKeys {
        clipboard: Arc<MemoryClipboard>,
        pasted: Mutex<Vec<String>>,
    }

    impl RecordingPasteKeys {
        pub fn new(clipboard: Arc<MemoryClipboard>) -> Self {
            Self {
                clipboard,
                pasted: Mutex::new(Vec::new()),
            }
        }

        pub fn pasted(&self) -> Vec<String> {
            self.pasted.lock().unwrap().clone()
        }
    }

    impl PasteKeys for RecordingPasteKeys {
        fn send_paste(&self) -> Result<(), InjectError> {
            let text = self.clipboard.text().unwrap_or_default();
            self.pasted.lock().unwrap().push(text);
            Ok(())
        }
    }

    /// Always fails, for exercising the restore-even-on-error path.
    pub struct FailingPasteKeys;

    impl PasteKeys for FailingPasteKeys {
        fn send_paste(&self) -> Result<(), InjectError> {
            Err(InjectError::KeySimulation("synthetic failure".into()))
        }
    }
}
