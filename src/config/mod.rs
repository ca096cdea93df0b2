//! Configuration: settings, paths, the provider catalog and credential
//! storage.

pub mod credentials;
pub mod paths;
pub mod provider;
pub mod settings;

pub use credentials::{CredentialStore, FileCredentialStore};
pub use paths::AppPaths;
pub use provider::ApiProvider;
pub use settings::{AppConfig, HotkeySettings, Language, LlmSettings, SttSettings, TextSettings};
