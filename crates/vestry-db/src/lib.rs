//! # vestry-db
//!
//! libSQL catalog and entitlement store for Vestry.
//!
//! Holds the global catalog (modules, agents, bundles), churches and user
//! profiles, and each church's module/agent/bundle subscriptions with an
//! append-only audit trail. [`service::EntitlementService`] is the entry
//! point; every repo in [`repos`] adds methods to it.
//!
//! Uses the `libsql` crate (v0.9.29) for both local files and remote
//! libSQL servers.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
mod tx;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Database handle: a libSQL database plus its single connection.
pub struct VestryDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
    remote: bool,
}

impl VestryDb {
    /// Open a local database file. Pass `":memory:"` for a throwaway store.
    ///
    /// Runs migrations automatically on open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        DatabaseError::InvalidState(format!(
                            "cannot create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
            }
        }

        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Per-connection in SQLite; needed for ON DELETE CASCADE.
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let vestry_db = Self {
            db,
            conn,
            remote: false,
        };
        vestry_db.run_migrations().await?;
        tracing::debug!(path, "opened local store");
        Ok(vestry_db)
    }

    /// Open a remote libSQL database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the server cannot be reached, or
    /// `DatabaseError::Migration` if migrations fail.
    pub async fn open_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        let db = Builder::new_remote(url.to_string(), auth_token.to_string())
            .build()
            .await?;
        let conn = db.connect()?;
        let vestry_db = Self {
            db,
            conn,
            remote: true,
        };
        vestry_db.run_migrations().await?;
        tracing::debug!(url, "opened remote store");
        Ok(vestry_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn is_remote(&self) -> bool {
        self.remote
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"msb-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        generate_id(&self.conn, prefix).await
    }
}

/// Generate a prefixed ID on any connection, including one inside a
/// transaction.
///
/// Uses `randomblob(4)` in SQL to produce 8 hex chars after the prefix.
pub(crate) async fn generate_id(
    conn: &libsql::Connection,
    prefix: &str,
) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
            (),
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}
