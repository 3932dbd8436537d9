//! Churches and user profiles.
//!
//! Only what is needed to resolve which church a caller acts for: a church
//! row per tenant and a profile linking a user to at most one church.

use chrono::Utc;

use vestry_core::entities::{Church, Profile};
use vestry_core::errors::CoreError;
use vestry_core::ids::PREFIX_CHURCH;

use crate::error::DatabaseError;
use crate::helpers::{get_bool, get_opt_string, parse_datetime};
use crate::service::EntitlementService;

const PROFILE_COLS: &str =
    "id, full_name, email, church_id, onboarding_completed, created_at, updated_at";

fn row_to_profile(row: &libsql::Row) -> Result<Profile, DatabaseError> {
    Ok(Profile {
        id: row.get(0)?,
        full_name: get_opt_string(row, 1)?,
        email: get_opt_string(row, 2)?,
        church_id: get_opt_string(row, 3)?,
        onboarding_completed: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

pub(crate) async fn fetch_profile(
    conn: &libsql::Connection,
    user_id: &str,
) -> Result<Profile, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {PROFILE_COLS} FROM profiles WHERE id = ?1"),
            [user_id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| CoreError::not_found("profile", user_id))?;
    row_to_profile(&row)
}

pub(crate) async fn mark_onboarding_completed(
    conn: &libsql::Connection,
    user_id: &str,
) -> Result<(), DatabaseError> {
    let changed = conn
        .execute(
            "UPDATE profiles SET onboarding_completed = 1, updated_at = ?2 WHERE id = ?1",
            libsql::params![user_id, Utc::now().to_rfc3339()],
        )
        .await?;
    if changed == 0 {
        return Err(CoreError::not_found("profile", user_id).into());
    }
    Ok(())
}

impl EntitlementService {
    /// Register a new church. Not tenant-scoped.
    ///
    /// # Errors
    ///
    /// Returns `Core(Validation)` for a blank name, or `DatabaseError` if the
    /// insert fails.
    pub async fn register_church(
        &self,
        name: &str,
        denomination: Option<&str>,
    ) -> Result<Church, DatabaseError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CoreError::Validation("church name must not be empty".into()).into());
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_CHURCH).await?;
        self.db()
            .conn()
            .execute(
                "INSERT INTO churches (id, name, denomination, created_at) VALUES (?1, ?2, ?3, ?4)",
                libsql::params![id.as_str(), name, denomination, now.to_rfc3339()],
            )
            .await?;

        tracing::info!(church_id = %id, name, "church registered");
        Ok(Church {
            id,
            name: name.to_string(),
            denomination: denomination.map(String::from),
            created_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `Core(NotFound)` if no church has this ID.
    pub async fn get_church(&self, church_id: &str) -> Result<Church, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT id, name, denomination, created_at FROM churches WHERE id = ?1",
                [church_id],
            )
            .await?;
        let row = rows
            .next()
            .await?
            .ok_or_else(|| CoreError::not_found("church", church_id))?;
        Ok(Church {
            id: row.get(0)?,
            name: row.get(1)?,
            denomination: get_opt_string(&row, 2)?,
            created_at: parse_datetime(&row.get::<String>(3)?)?,
        })
    }

    /// Create a user profile, optionally linked to a church. Not tenant-scoped.
    ///
    /// # Errors
    ///
    /// Returns `Core(NotFound)` if `church_id` does not exist, or
    /// `DatabaseError` if the insert fails (including a duplicate user ID).
    pub async fn create_profile(
        &self,
        user_id: &str,
        full_name: Option<&str>,
        email: Option<&str>,
        church_id: Option<&str>,
    ) -> Result<Profile, DatabaseError> {
        if let Some(church_id) = church_id {
            self.get_church(church_id).await?;
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                &format!("INSERT INTO profiles ({PROFILE_COLS}) VALUES (?1, ?2, ?3, ?4, 0, ?5, ?6)"),
                libsql::params![
                    user_id,
                    full_name,
                    email,
                    church_id,
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        Ok(Profile {
            id: user_id.to_string(),
            full_name: full_name.map(String::from),
            email: email.map(String::from),
            church_id: church_id.map(String::from),
            onboarding_completed: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// # Errors
    ///
    /// Returns `Core(NotFound)` if the user has no profile.
    pub async fn get_profile(&self, user_id: &str) -> Result<Profile, DatabaseError> {
        fetch_profile(self.db().conn(), user_id).await
    }

    /// The church a user acts for.
    ///
    /// # Errors
    ///
    /// Returns `Core(NotFound)` if the user has no profile, or
    /// `MissingTenantContext` if the profile has no church.
    pub async fn resolve_church_for_user(&self, user_id: &str) -> Result<String, DatabaseError> {
        let profile = self.get_profile(user_id).await?;
        profile.church_id.ok_or_else(|| {
            DatabaseError::MissingTenantContext(format!("user '{user_id}' has no church"))
        })
    }
}
