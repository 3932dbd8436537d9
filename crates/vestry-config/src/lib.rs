//! # vestry-config
//!
//! Layered configuration loading for Vestry using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`VESTRY_*` prefix, `__` as separator)
//! 2. Project-level `.vestry/config.toml`
//! 3. User-level `~/.config/vestry/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `VESTRY_STORE__PATH` -> `store.path`,
//! `VESTRY_TENANT__CHURCH_ID` -> `tenant.church_id`, etc.
//! The `__` (double underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use vestry_config::VestryConfig;
//!
//! let config = VestryConfig::load_with_dotenv().expect("config");
//!
//! if config.store.is_remote() {
//!     println!("remote store: {}", config.store.url);
//! } else {
//!     println!("local store: {}", config.store.path);
//! }
//! ```

mod error;
mod general;
mod store;
mod tenant;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use store::StoreConfig;
pub use tenant::TenantConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Env var prefix for every Vestry setting.
pub const ENV_PREFIX: &str = "VESTRY_";

/// Project-local config file, relative to the working directory.
pub const PROJECT_CONFIG_PATH: &str = ".vestry/config.toml";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VestryConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub tenant: TenantConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl VestryConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a layer fails to parse or extract.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or layer extra
    /// providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(PROJECT_CONFIG_PATH);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check cross-field constraints figment cannot express.
    ///
    /// # Errors
    ///
    /// Returns the first `NotConfigured` or `InvalidValue` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.store.validate()?;
        if self.general.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.default_limit".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vestry").join("config.toml"))
    }

    /// Walk up from `CARGO_MANIFEST_DIR` (crate -> crates/ -> workspace) for a
    /// `.env`, then fall back to the current directory. Missing files are
    /// ignored.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
