//! Errors raised while loading or validating Vestry configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A provider failed to parse, or the merged layers did not fit
    /// [`VestryConfig`](crate::VestryConfig).
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A section is partially filled in, e.g. a remote store URL with no token.
    #[error("Configuration section '{section}' is incomplete: {missing}")]
    NotConfigured { section: String, missing: String },

    /// A field parsed but holds a value Vestry cannot use.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}
