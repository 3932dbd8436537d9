//! Tenant-scoped service over the entitlement store.
//!
//! `EntitlementService` wraps `VestryDb` and the church the caller acts for.
//! All repo methods are implemented as `impl EntitlementService` blocks in
//! [`crate::repos`].
//!
//! Every tenant-scoped mutation follows this protocol:
//! 1. Resolve the church (`require_tenant`) before touching the store
//! 2. Load catalog and entitlement snapshots
//! 3. Compute the change with the pure functions in `vestry_core::reconcile`
//! 4. Begin a transaction, write rows and audit entries, commit

use crate::VestryDb;
use crate::error::DatabaseError;

pub struct EntitlementService {
    db: VestryDb,
    tenant: Option<String>,
}

impl EntitlementService {
    /// Create a service over a local database with no tenant selected.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        Ok(Self::from_db(VestryDb::open_local(db_path).await?))
    }

    /// Create a service over a remote libSQL server.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the server cannot be reached.
    pub async fn new_remote(url: &str, auth_token: &str) -> Result<Self, DatabaseError> {
        Ok(Self::from_db(VestryDb::open_remote(url, auth_token).await?))
    }

    #[must_use]
    pub const fn from_db(db: VestryDb) -> Self {
        Self { db, tenant: None }
    }

    /// Act for `church_id` from now on.
    #[must_use]
    pub fn with_tenant(mut self, church_id: impl Into<String>) -> Self {
        self.tenant = Some(church_id.into());
        self
    }

    pub fn set_tenant(&mut self, church_id: Option<String>) {
        self.tenant = church_id;
    }

    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// The current church, or `MissingTenantContext`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::MissingTenantContext` when no church is set.
    pub fn require_tenant(&self) -> Result<&str, DatabaseError> {
        self.tenant
            .as_deref()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| {
                DatabaseError::MissingTenantContext(
                    "no church selected; pass --church or --user".into(),
                )
            })
    }

    #[must_use]
    pub const fn db(&self) -> &VestryDb {
        &self.db
    }
}
