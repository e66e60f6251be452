//! Application-level configuration loading: backend selection and token policy.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "MATCH_TRACKER_CONFIG_PATH";
/// Environment variable that overrides the configured backend.
const BACKEND_ENV: &str = "MATCH_TRACKER_BACKEND";

/// Hosted database product holding matches and role records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Firebase Realtime Database, accounts keyed by sanitized identifier.
    #[default]
    Realtime,
    /// MongoDB collections, accounts keyed by raw identifier.
    Document,
    /// In-process store and auth provider for local development.
    Memory,
}

impl BackendKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "realtime" => Some(BackendKind::Realtime),
            "document" => Some(BackendKind::Document),
            "memory" => Some(BackendKind::Memory),
            _ => None,
        }
    }
}

/// What creating a match under an existing token does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPolicy {
    /// Last write wins.
    #[default]
    Overwrite,
    /// Creation fails with a duplicate-token error.
    Reject,
}

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    pub backend: BackendKind,
    pub token_policy: TokenPolicy,
}

impl AppConfig {
    /// Load the configuration from disk, falling back to defaults, then apply
    /// environment overrides.
    pub fn load() -> Self {
        let path = resolve_config_path();
        let config = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let app_config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        backend = ?app_config.backend,
                        token_policy = ?app_config.token_policy,
                        "loaded configuration"
                    );
                    app_config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        };

        config.with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = env::var(BACKEND_ENV) {
            match BackendKind::parse(&value) {
                Some(backend) => self.backend = backend,
                None => warn!(
                    value = %value,
                    "ignoring unknown backend override"
                ),
            }
        }
        self
    }
}

#[derive(Debug, Default, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    backend: BackendKind,
    #[serde(default)]
    token_policy: TokenPolicy,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        Self {
            backend: value.backend,
            token_policy: value.token_policy,
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: AppConfig = serde_json::from_str::<RawConfig>("{}").unwrap().into();
        assert_eq!(config.backend, BackendKind::Realtime);
        assert_eq!(config.token_policy, TokenPolicy::Overwrite);
    }

    #[test]
    fn explicit_values_are_honoured() {
        let raw = r#"{"backend": "document", "token_policy": "reject"}"#;
        let config: AppConfig = serde_json::from_str::<RawConfig>(raw).unwrap().into();
        assert_eq!(config.backend, BackendKind::Document);
        assert_eq!(config.token_policy, TokenPolicy::Reject);
    }

    #[test]
    fn unknown_backend_is_a_parse_error() {
        assert!(serde_json::from_str::<RawConfig>(r#"{"backend": "sqlite"}"#).is_err());
        assert_eq!(BackendKind::parse(" Memory "), Some(BackendKind::Memory));
        assert_eq!(BackendKind::parse("sqlite"), None);
    }
}
