//! Transaction finishing for multi-table cascades.

use crate::error::DatabaseError;

/// Commit `tx` if `outcome` is `Ok`, otherwise roll it back and return the
/// original error.
///
/// A rollback failure is logged and the original error is still returned.
pub(crate) async fn finish<T>(
    tx: libsql::Transaction,
    outcome: Result<T, DatabaseError>,
    operation: &str,
) -> Result<T, DatabaseError> {
    match outcome {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            tracing::warn!(operation, error = %err, "rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(operation, error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
