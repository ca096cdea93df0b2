//! Text injection — delivering the final transcript into whatever has input
//! focus, via the clipboard plus a synthesized paste keystroke.
//!
//! # Protocol
//!
//! 1. Snapshot every clipboard representation the backend can see.
//! 2. Overwrite the clipboard with the plain-text payload.
//! 3. Wait a short settle delay so the target app observes the new content.
//! 4. Synthesize the platform paste shortcut.
//! 5. Wait a longer delay for the paste to complete.
//! 6. Restore the snapshot verbatim — exactly once, even when the paste
//!    failed — unless the snapshot was empty.
//!
//! The protocol is deliberately race-tolerant rather than race-free: if the
//! user's own clipboard activity lands inside the injection window, the
//! dictated text wins. That is an accepted property of the clipboard-paste
//! technique, not something this module tries to out-engineer.

pub mod clipboard;
pub mod keyboard;

pub use clipboard::{ClipboardBackend, ClipboardSnapshot, SystemClipboard};
pub use keyboard::{EnigoPaste, PasteKeys};

#[cfg(test)]
pub use clipboard::MemoryClipboard;
#[cfg(test)]
pub use keyboard::{FailingPasteKeys, RecordingPasteKeys};

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

// ---------------------------------------------------------------------------
// InjectError
// ---------------------------------------------------------------------------

/// All errors that can surface during text injection.
#[derive(Debug, Error)]
pub enum InjectError {
    /// Could not open or read the system clipboard.
    #[error("cannot access clipboard: {0}")]
    ClipboardAccess(String),

    /// Could not write to the system clipboard.
    #[error("cannot write clipboard: {0}")]
    ClipboardWrite(String),

    /// Could not synthesize a key event.
    #[error("cannot simulate key press: {0}")]
    KeySimulation(String),
}

// ---------------------------------------------------------------------------
// TextInjector
// ---------------------------------------------------------------------------

/// Clipboard-paste injector with configurable inter-step delays.
pub struct TextInjector {
    clipboard: Arc<dyn ClipboardBackend>,
    keys: Arc<dyn PasteKeys>,
    /// Delay between writing the clipboard and sending the paste keystroke.
    settle: Duration,
    /// Delay between the paste keystroke and restoring the snapshot.
    paste_grace: Duration,
}

impl TextInjector {
    /// Injector with the default delays (50 ms settle, 300 ms paste grace).
    pub fn new(clipboard: Arc<dyn ClipboardBackend>, keys: Arc<dyn PasteKeys>) -> Self {
        Self {
            clipboard,
            keys,
            settle: Duration::from_millis(50),
            paste_grace: Duration::from_millis(300),
        }
    }

    /// Override the delays (slow target apps need more grace; tests want
    /// none).
    pub fn with_delays(mut self, settle: Duration, paste_grace: Duration) -> Self {
        self.settle = settle;
        self.paste_grace = paste_grace;
        self
    }

    /// Run the full injection protocol. Best-effort: every failure is
    /// logged, none is returned — by the time injection runs the episode has
    /// already produced its text, and a paste that half-worked is not worth
    /// surfacing as a pipeline error.
    pub async fn inject(&self, text: &str) {
        let snapshot = match self.clipboard.snapshot() {
            Ok(snapshot) => snapshot,
            Err(e) => {
                log::warn!("inject: clipboard snapshot failed ({e}); nothing to restore");
                ClipboardSnapshot::empty()
            }
        };

        if let Err(e) = self.clipboard.set_text(text) {
            // The clipboard still holds its original content; bail before
            // pasting stale data.
            log::warn!("inject: cannot write clipboard: {e}");
            return;
        }

        tokio::time::sleep(self.settle).await;

        if let Err(e) = self.keys.send_paste() {
            // The clipboard was already overwritten, so the restore below
            // still runs.
            log::warn!("inject: paste keystroke failed: {e}");
        }

        tokio::time::sleep(self.paste_grace).await;

        if !snapshot.is_empty() {
            if let Err(e) = self.clipboard.restore(snapshot) {
                log::warn!("inject: clipboard restore failed: {e}");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::clipboard::TEXT_FORMAT;
    use super::*;

    fn injector(
        clipboard: Arc<MemoryClipboard>,
        keys: Arc<dyn PasteKeys>,
    ) -> TextInjector {
        TextInjector::new(clipboard, keys).with_delays(Duration::ZERO, Duration::ZERO)
    }

    #[tokio::test]
    async fn restores_clipboard_after_injection() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let original = vec![
            (TEXT_FORMAT.to_string(), b"user's text".to_vec()),
            ("image/png".to_string(), vec![9, 9, 9]),
        ];
        clipboard.preload(original.clone());

        let keys = Arc::new(RecordingPasteKeys::new(Arc::clone(&clipboard)));
        injector(Arc::clone(&clipboard), keys.clone())
            .inject("注入的文字")
            .await;

        // The paste saw the injected text…
        assert_eq!(keys.pasted(), vec!["注入的文字".to_string()]);
        // …and the clipboard ended exactly where it started.
        assert_eq!(clipboard.contents(), original);
    }

    #[tokio::test]
    async fn empty_snapshot_skips_restore() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let keys = Arc::new(RecordingPasteKeys::new(Arc::clone(&clipboard)));

        injector(Arc::clone(&clipboard), keys.clone())
            .inject("hello")
            .await;

        assert_eq!(keys.pasted(), vec!["hello".to_string()]);
        // Nothing was on the clipboard before, so the payload stays.
        assert_eq!(clipboard.text().as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn failed_paste_still_restores() {
        let clipboard = Arc::new(MemoryClipboard::new());
        let original = vec![(TEXT_FORMAT.to_string(), b"keep me".to_vec())];
        clipboard.preload(original.clone());

        injector(Arc::clone(&clipboard), Arc::new(FailingPasteKeys))
            .inject("lost text")
            .await;

        assert_eq!(clipboard.contents(), original);
    }
}
