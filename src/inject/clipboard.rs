//! Clipboard access behind a backend trait.
//!
//! The injector snapshots the clipboard before overwriting it and restores
//! the snapshot afterwards. [`ClipboardBackend`] models snapshots as an
//! ordered list of `(format-tag, bytes)` pairs so the protocol (and its
//! tests) stay honest about multi-format clipboards; the arboard-backed
//! [`SystemClipboard`] snapshots the plain-text representation, which is
//! arboard's portable surface. Non-text clipboard content therefore reads as
//! an empty snapshot, which skips the restore step entirely.

use arboard::Clipboard;

use super::InjectError;

/// Format tag used for plain text snapshots.
pub const TEXT_FORMAT: &str = "text/plain";

// ---------------------------------------------------------------------------
// ClipboardSnapshot
// ---------------------------------------------------------------------------

/// Ordered clipboard contents captured immediately before injection.
///
/// Owned exclusively by the injector for the duration of one injection
/// cycle and discarded after restore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardSnapshot {
    items: Vec<(String, Vec<u8>)>,
}

impl ClipboardSnapshot {
    pub fn empty() -> Self {
        Self { items: Vec::new() }
    }

    pub fn from_items(items: Vec<(String, Vec<u8>)>) -> Self {
        Self { items }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[(String, Vec<u8>)] {
        &self.items
    }
}

// ---------------------------------------------------------------------------
// ClipboardBackend
// ---------------------------------------------------------------------------

/// Read/write access to the shared system clipboard.
pub trait ClipboardBackend: Send + Sync {
    /// Capture the current clipboard contents.
    fn snapshot(&self) -> Result<ClipboardSnapshot, InjectError>;

    /// Replace the clipboard with a plain-text payload.
    fn set_text(&self, text: &str) -> Result<(), InjectError>;

    /// Write a previously captured snapshot back verbatim.
    fn restore(&self, snapshot: ClipboardSnapshot) -> Result<(), InjectError>;
}

// ---------------------------------------------------------------------------
// SystemClipboard
// ---------------------------------------------------------------------------

/// arboard-backed clipboard.
///
/// A short-lived [`arboard::Clipboard`] handle is created per call rather
/// than shared, because the handle is not `Send` on all platforms and is
/// cheap to construct.
pub struct SystemClipboard;

impl SystemClipboard {
    fn open() -> Result<Clipboard, InjectError> {
        Clipboard::new().map_err(|e| InjectError::ClipboardAccess(e.to_string()))
    }
}

impl ClipboardBackend for SystemClipboard {
    fn snapshot(&self) -> Result<ClipboardSnapshot, InjectError> {
        let mut clipboard = Self::open()?;
        // get_text errs on an empty or non-text clipboard — both read as an
        // empty snapshot.
        Ok(match clipboard.get_text().ok() {
            Some(text) => ClipboardSnapshot::from_items(vec![(
                TEXT_FORMAT.to_string(),
                text.into_bytes(),
            )]),
            None => ClipboardSnapshot::empty(),
        })
    }

    fn set_text(&self, text: &str) -> Result<(), InjectError> {
        let mut clipboard = Self::open()?;
        clipboard
            .set_text(text)
            .map_err(|e| InjectError::ClipboardWrite(e.to_string()))
    }

    fn restore(&self, snapshot: ClipboardSnapshot) -> Result<(), InjectError> {
        for (format, bytes) in snapshot.items() {
            if format == TEXT_FORMAT {
                let text = String::from_utf8_lossy(bytes);
                self.set_text(&text)?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryClipboard  (test double)
// ---------------------------------------------------------------------------

#[cfg(test)]
pub use fake::MemoryClipboard;


// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_emptiness() {
        assert!(ClipboardSnapshot::empty().is_empty());
        assert!(!ClipboardSnapshot::from_items(vec![(
            TEXT_FORMAT.to_string(),
            b"x".to_vec()
        )])
        .is_empty());
    }

    #[test]
    fn memory_clipboard_round_trip() {
        let clipboard = MemoryClipboard::new();
        clipboard.preload(vec![
            (TEXT_FORMAT.to_string(), b"before".to_vec()),
            ("image/png".to_string(), vec![1, 2, 3]),
        ]);

        let snapshot = clipboard.snapshot().unwrap();
        clipboard.set_text("after").unwrap();
        assert_eq!(clipboard.text().as_deref(), Some("after"));
        assert_eq!(clipboard.contents().len(), 1);

        clipboard.restore(snapshot).unwrap();
        assert_eq!(clipboard.text().as_deref(), Some("before"));
        assert_eq!(clipboard.contents().len(), 2);
    }
}
