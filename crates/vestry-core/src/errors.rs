//! Cross-cutting error types for Vestry.
//!
//! Domain rule violations raised by the pure reconciliation layer. Store
//! errors (`DatabaseError`) and config errors (`ConfigError`) live in their
//! own crates; `vestry-cli` is where all of them converge.

use thiserror::Error;

/// Errors that can be raised by any Vestry crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Catalog or subscription lookup returned no result.
    #[error("Entity not found: {entity_type} {id}")]
    NotFound { entity_type: String, id: String },

    /// A subscription state transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity_type} {id} from {from} to {to}")]
    InvalidTransition {
        entity_type: String,
        id: String,
        from: String,
        to: String,
    },

    /// Data failed validation (format, constraints).
    #[error("Validation error: {0}")]
    Validation(String),

    /// A required agent cannot be removed on its own; it only goes away
    /// together with its module.
    #[error("Agent '{agent_name}' is required by module '{module_name}' and cannot be removed")]
    RequiredAgent {
        module_name: String,
        agent_name: String,
    },

    /// An agent was requested for a module the church has not subscribed to.
    #[error("Module '{module_name}' is not subscribed; agent '{agent_name}' is not available")]
    ModuleNotSubscribed {
        module_name: String,
        agent_name: String,
    },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CoreError {
    #[must_use]
    pub fn not_found(entity_type: &str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.to_string(),
            id: id.into(),
        }
    }
}
