//! Database migration runner.
//!
//! Embeds the SQL migration files at compile time and executes them on
//! database open. All statements use `IF NOT EXISTS` for idempotent re-running.

use crate::VestryDb;
use crate::error::DatabaseError;

/// Catalog tables: modules, agents, bundles, bundle membership.
const MIGRATION_001: &str = include_str!("../migrations/001_catalog.sql");
/// Churches, profiles, the three subscription tables, and the audit trail.
const MIGRATION_002: &str = include_str!("../migrations/002_entitlements.sql");

impl VestryDb {
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        for (name, sql) in [
            ("001_catalog", MIGRATION_001),
            ("002_entitlements", MIGRATION_002),
        ] {
            self.conn
                .execute_batch(sql)
                .await
                .map_err(|e| DatabaseError::Migration(format!("{name}: {e}")))?;
        }
        Ok(())
    }
}
