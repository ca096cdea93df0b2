//! API credential storage.
//!
//! [`CredentialStore`] is the seam the orchestrator and the providers talk
//! to; [`FileCredentialStore`] is the file-backed implementation — a JSON
//! map from provider id to secret, written with owner-only permissions on
//! Unix. Secrets are read fresh on every `get` so external edits (or another
//! process) are picked up without a restart.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::Result;

use super::{ApiProvider, AppPaths};

// ---------------------------------------------------------------------------
// CredentialStore
// ---------------------------------------------------------------------------

/// Read/write access to per-provider API secrets.
///
/// Implementors must be `Send + Sync` so the store can be shared as
/// `Arc<dyn CredentialStore>` between the orchestrator and the providers.
pub trait CredentialStore: Send + Sync {
    /// Return the secret for `provider`, or `None` when none is configured.
    fn get(&self, provider: ApiProvider) -> Option<String>;

    /// Store (or replace) the secret for `provider`.
    fn set(&self, provider: ApiProvider, secret: &str) -> Result<()>;

    /// Remove the secret for `provider`. Removing an absent secret is a
    /// no-op.
    fn clear(&self, provider: ApiProvider) -> Result<()>;
}

// ---------------------------------------------------------------------------
// FileCredentialStore
// ---------------------------------------------------------------------------

/// JSON-file credential store.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store backed by the platform-appropriate `credentials.json`.
    pub fn open_default() -> Self {
        Self {
            path: AppPaths::new().credentials_file,
        }
    }

    /// Store backed by an explicit path (useful for tests).
    pub fn open(path: PathBuf) -> Self {
        Self { path }
    }

    fn read_map(&self) -> BTreeMap<String, String> {
        let Ok(data) = std::fs::read_to_string(&self.path) else {
            return BTreeMap::new();
        };
        serde_json::from_str(&data).unwrap_or_default()
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, data)?;
        harden_permissions(&self.path)?;
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn get(&self, provider: ApiProvider) -> Option<String> {
        self.read_map()
            .get(provider.id())
            .filter(|s| !s.is_empty())
            .cloned()
    }

    fn set(&self, provider: ApiProvider, secret: &str) -> Result<()> {
        let mut map = self.read_map();
        map.insert(provider.id().to_string(), secret.to_string());
        self.write_map(&map)
    }

    fn clear(&self, provider: ApiProvider) -> Result<()> {
        let mut map = self.read_map();
        if map.remove(provider.id()).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }
}

/// Restrict the credential file to the owning user (0600).
#[cfg(unix)]
fn harden_permissions(path: &std::path::Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = std::fs::Permissions::from_mode(0o600);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn harden_permissions(_path: &std::path::Path) -> Result<()> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
