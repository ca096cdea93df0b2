//! User vocabulary — ordered substitution rules applied to every transcript.
//!
//! Entries are persisted as JSON in the platform config directory. Only the
//! enabled subset, in list order, reaches the normalizer via
//! [`VocabularyLibrary::active_rules`].

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::config::AppPaths;

// ---------------------------------------------------------------------------
// VocabularyEntry
// ---------------------------------------------------------------------------

/// A single substitution rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// The mis-transcribed form as it appears in raw transcripts.
    pub source: String,
    /// The desired replacement.
    pub target: String,
    /// Disabled entries stay in the library but are not applied.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Free-form user note.
    #[serde(default)]
    pub note: String,
}

fn default_enabled() -> bool {
    true
}

impl VocabularyEntry {
    /// Enabled entry with an empty note.
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            enabled: true,
            note: String::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// VocabularyLibrary
// ---------------------------------------------------------------------------

/// Ordered collection of substitution rules with JSON persistence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VocabularyLibrary {
    entries: Vec<VocabularyEntry>,
}

impl VocabularyLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // CRUD
    // -----------------------------------------------------------------------

    /// Append an entry at the end of the library.
    pub fn add(&mut self, entry: VocabularyEntry) {
        self.entries.push(entry);
    }

    /// Remove the entry at `index`, returning it, or `None` when out of
    /// range.
    pub fn remove(&mut self, index: usize) -> Option<VocabularyEntry> {
        if index < self.entries.len() {
            Some(self.entries.remove(index))
        } else {
            None
        }
    }

    /// Replace the entry at `index`. Returns `false` when out of range.
    pub fn update(&mut self, index: usize, entry: VocabularyEntry) -> bool {
        match self.entries.get_mut(index) {
            Some(slot) => {
                *slot = entry;
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    /// The enabled `(source, target)` pairs, in library order — the exact
    /// input shape [`crate::text::normalize`] expects.
    pub fn active_rules(&self) -> Vec<(String, String)> {
        self.entries
            .iter()
            .filter(|e| e.enabled)
            .map(|e| (e.source.clone(), e.target.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    /// Load from the platform config directory, or return an empty library
    /// when the file does not exist (or cannot be parsed).
    pub fn load_or_default() -> Self {
        Self::load_from(&AppPaths::new().vocabulary_file)
    }

    /// Load from an explicit path (useful for tests). Missing or corrupt
    /// files yield an empty library.
    pub fn load_from(path: &Path) -> Self {
        let Ok(data) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&data).unwrap_or_default()
    }

    /// Save to the platform config directory.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::new().vocabulary_file)
    }

    /// Save to an explicit path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        std::fs::write(path, data)?;
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

    #[test]
    fn starts_empty() {
        let lib = VocabularyLibrary::new();
        assert!(lib.is_empty());
        assert!(lib.active_rules().is_empty());
    }

    #[test]
    fn active_rules_preserve_order() {
        let mut lib = VocabularyLibrary::new();
        lib.add(VocabularyEntry::new("a", "A"));
        lib.add(VocabularyEntry::new("b", "B"));
        lib.add(VocabularyEntry::new("c", "C"));

        let rules = lib.active_rules();
        assert_eq!(
            rules,
            vec![
                ("a".to_string(), "A".to_string()),
                ("b".to_string(), "B".to_string()),
                ("c".to_string(), "C".to_string()),
            ]
        );
    }

    #[test]
    fn disabled_entries_are_filtered_out() {
        let mut lib = VocabularyLibrary::new();
        lib.add(VocabularyEntry::new("a", "A"));
        let mut off = VocabularyEntry::new("b", "B");
        off.enabled = false;
        lib.add(off);

        let rules = lib.active_rules();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].0, "a");
        // The disabled entry stays in the library itself.
        assert_eq!(lib.len(), 2);
    }

    #[test]
    fn remove_and_update() {
        let mut lib = VocabularyLibrary::new();
        lib.add(VocabularyEntry::new("a", "A"));
        lib.add(VocabularyEntry::new("b", "B"));

        assert!(lib.update(1, VocabularyEntry::new("b", "BB")));
        assert_eq!(lib.entries()[1].target, "BB");
        assert!(!lib.update(5, VocabularyEntry::new("x", "X")));

        let removed = lib.remove(0).expect("entry at 0");
        assert_eq!(removed.source, "a");
        assert_eq!(lib.len(), 1);
        assert!(lib.remove(7).is_none());
    }

    #[test]
    fn persists_and_reloads() {
        let dir = tempdir().expect("temp dir");
        let path = dir.path().join("vocabulary.json");

        let mut lib = VocabularyLibrary::new();
        let mut entry = VocabularyEntry::new("特斯拉", "Tesla");
        entry.note = "品牌名".into();
        lib.add(entry);
        lib.save_to(&path).expect("save");

        let reloaded = VocabularyLibrary::load_from(&path);
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.entries()[0].source, "特斯拉");
        assert_eq!(reloaded.entries()[0].target, "Tesla");
        assert_eq!(reloaded.entries()[0].note, "品牌名");
        assert!(reloaded.entries()[0].enabled);
    }

    #[test]
    fn load_missing_or_corrupt_returns_empty() {
        let dir = tempdir().expect("temp dir");
        assert!(VocabularyLibrary::load_from(&dir.path().join("missing.json")).is_empty());

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{ not json").unwrap();
        assert!(VocabularyLibrary::load_from(&bad).is_empty());
    }
}
