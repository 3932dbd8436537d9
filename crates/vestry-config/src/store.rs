//! Entitlement store location.
//!
//! Local by default: a libSQL file under `.vestry/`. Setting both `url` and
//! `auth_token` switches the CLI to a remote libSQL server.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

fn default_path() -> String {
    ".vestry/vestry.db".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// Local database file. `:memory:` is accepted for throwaway runs.
    #[serde(default = "default_path")]
    pub path: String,

    /// Remote database URL (e.g., `libsql://vestry-prod.example.io`).
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub auth_token: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            url: String::new(),
            auth_token: String::new(),
        }
    }
}

impl StoreConfig {
    /// True when both the remote URL and token are set.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        !self.url.is_empty() && !self.auth_token.is_empty()
    }

    /// Reject half-configured remote access and an empty local path.
    ///
    /// # Errors
    ///
    /// `NotConfigured` when exactly one of `url`/`auth_token` is set;
    /// `InvalidValue` when local mode has no path.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match (self.url.is_empty(), self.auth_token.is_empty()) {
            (false, true) => Err(ConfigError::NotConfigured {
                section: "store".into(),
                missing: "auth_token".into(),
            }),
            (true, false) => Err(ConfigError::NotConfigured {
                section: "store".into(),
                missing: "url".into(),
            }),
            (true, true) if self.path.trim().is_empty() => Err(ConfigError::InvalidValue {
                field: "store.path".into(),
                reason: "must not be empty".into(),
            }),
            _ => Ok(()),
        }
    }
}
