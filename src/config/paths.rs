//! Cross-platform application paths using the `dirs` crate.
//!
//! Everything lives under the platform config directory:
//!
//!   Windows: `%APPDATA%\talktype\`
//!   macOS:   `~/Library/Application Support/talktype/`
//!   Linux:   `~/.config/talktype/`

use std::path::PathBuf;

/// Holds all resolved application directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding all persisted user data.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to `vocabulary.json`.
    pub vocabulary_file: PathBuf,
    /// Full path to `credentials.json`.
    pub credentials_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "talktype";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path (should be extremely rare in practice).
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("settings.toml");
        let vocabulary_file = config_dir.join("vocabulary.json");
        let credentials_file = config_dir.join("credentials.json");

        Self {
            config_dir,
            settings_file,
            vocabulary_file,
            credentials_file,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .vocabulary_file
            .file_name()
            .is_some_and(|n| n == "vocabulary.json"));
        assert!(paths
            .credentials_file
            .file_name()
            .is_some_and(|n| n == "credentials.json"));
    }
}
