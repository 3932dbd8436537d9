//! Repository modules implementing the store operations.
//!
//! Each module adds methods to `EntitlementService` via `impl EntitlementService`
//! blocks. Row-level helpers are free functions over `&libsql::Connection` so
//! they run the same inside or outside a transaction.

pub mod agents;
pub mod audit;
pub mod bundles;
pub mod catalog;
pub mod modules;
pub mod onboarding;
pub mod status;
pub mod tenant;

use vestry_core::enums::EntitlementKind;

use crate::error::{DatabaseError, is_duplicate_subscription};

/// Collapse the benign duplicate outcome of an insert: `Ok(true)` if a row
/// was written, `Ok(false)` if it was already there.
pub(crate) fn inserted(result: Result<(), DatabaseError>) -> Result<bool, DatabaseError> {
    match result {
        Ok(()) => Ok(true),
        Err(err) if err.is_duplicate() => {
            tracing::debug!(%err, "skipping existing subscription");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

/// Map a composite-key violation on a subscription insert to
/// `DuplicateSubscription`. Any other failure, including an `id` collision,
/// is returned as is.
pub(crate) fn classify_insert(
    result: Result<u64, libsql::Error>,
    kind: EntitlementKind,
    key: &str,
) -> Result<(), DatabaseError> {
    match result {
        Ok(_) => Ok(()),
        Err(err) if is_duplicate_subscription(&err, kind) => {
            Err(DatabaseError::DuplicateSubscription {
                kind,
                key: key.to_string(),
            })
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::tenant_service;

    async fn insert_module_row(
        conn: &libsql::Connection,
        id: &str,
        church_id: &str,
        module_name: &str,
    ) -> Result<u64, libsql::Error> {
        conn.execute(
            "INSERT INTO church_modules (id, church_id, module_name) VALUES (?1, ?2, ?3)",
            [id, church_id, module_name],
        )
        .await
    }

    #[tokio::test]
    async fn composite_key_hit_is_a_duplicate() {
        let svc = tenant_service().await;
        let church_id = svc.tenant().unwrap().to_string();
        let conn = svc.db().conn();
        insert_module_row(conn, "msb-00000001", &church_id, "A")
            .await
            .unwrap();

        let result = insert_module_row(conn, "msb-00000002", &church_id, "A").await;
        let outcome = classify_insert(result, EntitlementKind::Module, "A");
        assert!(matches!(outcome, Err(DatabaseError::DuplicateSubscription { .. })));
        assert!(!inserted(outcome).unwrap());
    }

    #[tokio::test]
    async fn id_collision_is_not_a_duplicate() {
        let svc = tenant_service().await;
        let church_id = svc.tenant().unwrap().to_string();
        let conn = svc.db().conn();
        insert_module_row(conn, "msb-deadbeef", &church_id, "A")
            .await
            .unwrap();

        let result = insert_module_row(conn, "msb-deadbeef", &church_id, "B").await;
        let outcome = classify_insert(result, EntitlementKind::Module, "B");
        assert!(matches!(outcome, Err(DatabaseError::LibSql(_))));
        assert!(inserted(outcome).is_err());
    }
}
