//! Entitlement audit repository.
//!
//! Append-only entries, one per subscription row inserted or deleted. Rows
//! written as a side effect of a bundle or module change carry a
//! `CascadeDetail` naming the trigger.

use chrono::Utc;

use vestry_core::audit_detail::CascadeDetail;
use vestry_core::entities::AuditEntry;
use vestry_core::enums::{AuditAction, EntitlementKind};
use vestry_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::EntitlementService;

/// Filter criteria for audit queries. Always scoped to the current church.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub kind: Option<EntitlementKind>,
    pub entity_key: Option<String>,
    pub action: Option<AuditAction>,
    pub limit: Option<u32>,
}

/// Append one audit entry on `conn`.
pub(crate) async fn append_audit(
    conn: &libsql::Connection,
    church_id: &str,
    kind: EntitlementKind,
    entity_key: &str,
    action: AuditAction,
    cause: Option<&CascadeDetail>,
) -> Result<(), DatabaseError> {
    let id = generate_id(conn, PREFIX_AUDIT).await?;
    let detail = cause
        .map(serde_json::to_string)
        .transpose()
        .map_err(|e| DatabaseError::Other(e.into()))?;

    conn.execute(
        "INSERT INTO entitlement_audit (id, church_id, kind, entity_key, action, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        libsql::params![
            id.as_str(),
            church_id,
            kind.as_str(),
            entity_key,
            action.as_str(),
            detail.as_deref(),
            Utc::now().to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

impl EntitlementService {
    /// Query the current church's audit entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let church_id = self.require_tenant()?;

        let mut conditions = vec!["church_id = ?1".to_string()];
        let mut params: Vec<libsql::Value> = vec![libsql::Value::Text(church_id.to_string())];

        if let Some(kind) = filter.kind {
            params.push(libsql::Value::Text(kind.as_str().to_string()));
            conditions.push(format!("kind = ?{}", params.len()));
        }
        if let Some(ref key) = filter.entity_key {
            params.push(libsql::Value::Text(key.clone()));
            conditions.push(format!("entity_key = ?{}", params.len()));
        }
        if let Some(action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, church_id, kind, entity_key, action, detail, created_at
             FROM entitlement_audit WHERE {}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}",
            conditions.join(" AND ")
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;

        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(AuditEntry {
                id: row.get::<String>(0)?,
                church_id: row.get::<String>(1)?,
                kind: parse_enum(&row.get::<String>(2)?)?,
                entity_key: row.get::<String>(3)?,
                action: parse_enum(&row.get::<String>(4)?)?,
                detail: parse_optional_json(get_opt_string(&row, 5)?.as_deref())?,
                created_at: parse_datetime(&row.get::<String>(6)?)?,
            });
        }
        Ok(entries)
    }
}
