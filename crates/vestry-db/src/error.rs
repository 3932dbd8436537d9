//! Database error types for vestry-db.

use thiserror::Error;
use vestry_core::enums::EntitlementKind;
use vestry_core::errors::CoreError;

/// Errors from store operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned data that could not be parsed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Insert hit a composite unique key: the row is already subscribed.
    /// Subscribe paths treat this as success.
    #[error("{kind} '{key}' is already subscribed")]
    DuplicateSubscription { kind: EntitlementKind, key: String },

    /// A tenant-scoped operation ran without a resolved church.
    #[error("No church context: {0}")]
    MissingTenantContext(String),

    /// Domain rule violation from the reconciliation layer.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Underlying libSQL error, including transport failures on remote stores.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// True for the benign "already subscribed" outcome.
    #[must_use]
    pub const fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateSubscription { .. })
    }
}

/// Whether a libSQL error is a UNIQUE or PRIMARY KEY violation.
///
/// Local and remote connections report these differently, but both carry
/// SQLite's message text.
fn is_unique_violation(message: &str) -> bool {
    message.contains("UNIQUE constraint failed")
        || message.contains("PRIMARY KEY constraint failed")
}

/// Column list SQLite names when a subscription table's composite key is hit.
const fn subscription_key_columns(kind: EntitlementKind) -> &'static str {
    match kind {
        EntitlementKind::Module => "church_modules.church_id, church_modules.module_name",
        EntitlementKind::Agent => {
            "church_agents.church_id, church_agents.module_name, church_agents.agent_name"
        }
        EntitlementKind::Bundle => "church_bundles.church_id, church_bundles.bundle_id",
    }
}

/// Whether `err` is the church already holding this kind of row.
///
/// A collision on the random `id` column is a different failure and does
/// not match.
pub(crate) fn is_duplicate_subscription(err: &libsql::Error, kind: EntitlementKind) -> bool {
    let message = err.to_string();
    is_unique_violation(&message) && message.contains(subscription_key_columns(kind))
}
