//! Module subscriptions.
//!
//! Subscribing a module also subscribes its required agents. Unsubscribing a
//! module removes every agent subscription of that module with it.

use std::collections::HashSet;

use chrono::Utc;

use vestry_core::audit_detail::CascadeDetail;
use vestry_core::catalog::Catalog;
use vestry_core::entities::ModuleSubscription;
use vestry_core::enums::{AuditAction, EntitlementKind, SubscriptionState};
use vestry_core::errors::CoreError;
use vestry_core::ids::{AgentKey, PREFIX_MODULE_SUB};
use vestry_core::reconcile::missing_modules;
use vestry_core::responses::{ModuleUnsubscribeReport, SubscribeReport};

use super::agents::{delete_agent_sub, fetch_agent_keys_for_module, insert_agent_sub};
use super::audit::append_audit;
use super::{classify_insert, inserted};
use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{get_opt_price, parse_datetime, parse_enum};
use crate::service::EntitlementService;
use crate::tx;

const SELECT_COLS: &str =
    "id, church_id, module_name, module_price, status, created_at, updated_at";

fn row_to_module_sub(row: &libsql::Row) -> Result<ModuleSubscription, DatabaseError> {
    Ok(ModuleSubscription {
        id: row.get(0)?,
        church_id: row.get(1)?,
        module_name: row.get(2)?,
        module_price: get_opt_price(row, 3)?,
        status: parse_enum(&row.get::<String>(4)?)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

pub(crate) async fn fetch_module_subs(
    conn: &libsql::Connection,
    church_id: &str,
) -> Result<Vec<ModuleSubscription>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!(
                "SELECT {SELECT_COLS} FROM church_modules WHERE church_id = ?1 ORDER BY rowid"
            ),
            [church_id],
        )
        .await?;
    let mut subs = Vec::new();
    while let Some(row) = rows.next().await? {
        subs.push(row_to_module_sub(&row)?);
    }
    Ok(subs)
}

/// Insert one module row plus its audit entry.
///
/// Returns `DuplicateSubscription` if the church already holds the module.
pub(crate) async fn insert_module_sub(
    conn: &libsql::Connection,
    church_id: &str,
    module_name: &str,
    price: Option<f64>,
    cause: Option<&CascadeDetail>,
) -> Result<(), DatabaseError> {
    let id = generate_id(conn, PREFIX_MODULE_SUB).await?;
    let now = Utc::now().to_rfc3339();
    let result = conn
        .execute(
            &format!("INSERT INTO church_modules ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            libsql::params![
                id.as_str(),
                church_id,
                module_name,
                price,
                SubscriptionState::Subscribed.as_str(),
                now.as_str(),
                now.as_str()
            ],
        )
        .await;
    classify_insert(result, EntitlementKind::Module, module_name)?;

    append_audit(
        conn,
        church_id,
        EntitlementKind::Module,
        module_name,
        AuditAction::Subscribed,
        cause,
    )
    .await
}

/// Delete one module row. Returns whether a row existed.
async fn delete_module_sub(
    conn: &libsql::Connection,
    church_id: &str,
    module_name: &str,
    cause: Option<&CascadeDetail>,
) -> Result<bool, DatabaseError> {
    let deleted = conn
        .execute(
            "DELETE FROM church_modules WHERE church_id = ?1 AND module_name = ?2",
            [church_id, module_name],
        )
        .await?;
    if deleted > 0 {
        append_audit(
            conn,
            church_id,
            EntitlementKind::Module,
            module_name,
            AuditAction::Unsubscribed,
            cause,
        )
        .await?;
    }
    Ok(deleted > 0)
}

/// Subscribe `names` and the required agents of each.
///
/// Names must already be validated against `catalog`. `held_agents` is the
/// church's agent set before the call and is kept current.
pub(crate) async fn write_module_subscribe(
    conn: &libsql::Connection,
    church_id: &str,
    catalog: &Catalog,
    names: &[String],
    held_agents: &mut HashSet<AgentKey>,
) -> Result<SubscribeReport, DatabaseError> {
    let mut report = SubscribeReport::new(EntitlementKind::Module);
    let mut seen = HashSet::new();

    for name in names.iter().filter(|n| seen.insert(n.as_str())) {
        let price = catalog.module(name).and_then(|m| m.price);
        if inserted(insert_module_sub(conn, church_id, name, price, None).await)? {
            report.created.push(name.clone());
        } else {
            report.skipped.push(name.clone());
        }

        let cause = CascadeDetail::new(EntitlementKind::Module, name.as_str());
        for agent in catalog.required_agents_for(name) {
            let key = agent.key();
            if held_agents.contains(&key) {
                continue;
            }
            if inserted(insert_agent_sub(conn, church_id, &key, agent.price, Some(&cause)).await)? {
                report.agents_added.push(key.clone());
            }
            held_agents.insert(key);
        }
    }
    Ok(report)
}

/// Remove a module and every agent subscription under it.
///
/// Agent rows are audited with `cause` if given, otherwise as a cascade of
/// this module.
pub(crate) async fn remove_module(
    conn: &libsql::Connection,
    church_id: &str,
    module_name: &str,
    cause: Option<&CascadeDetail>,
) -> Result<ModuleUnsubscribeReport, DatabaseError> {
    let module_cause = CascadeDetail::new(EntitlementKind::Module, module_name);
    let agent_cause = cause.unwrap_or(&module_cause);

    let mut agents_removed = Vec::new();
    for key in fetch_agent_keys_for_module(conn, church_id, module_name).await? {
        if delete_agent_sub(conn, church_id, &key, Some(agent_cause)).await? {
            agents_removed.push(key);
        }
    }

    let was_subscribed = delete_module_sub(conn, church_id, module_name, cause).await?;
    Ok(ModuleUnsubscribeReport {
        module_name: module_name.to_string(),
        was_subscribed,
        agents_removed,
        held_by_bundles: Vec::new(),
    })
}

/// Bundle IDs the church holds whose catalog entry includes `module_name`.
async fn fetch_covering_bundles(
    conn: &libsql::Connection,
    church_id: &str,
    module_name: &str,
) -> Result<Vec<String>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT cb.bundle_id FROM church_bundles cb
             JOIN bundle_modules bm ON bm.bundle_id = cb.bundle_id
             WHERE cb.church_id = ?1 AND bm.module_name = ?2
             ORDER BY cb.rowid",
            [church_id, module_name],
        )
        .await?;
    let mut bundle_ids = Vec::new();
    while let Some(row) = rows.next().await? {
        bundle_ids.push(row.get::<String>(0)?);
    }
    Ok(bundle_ids)
}

impl EntitlementService {
    /// The current church's module subscriptions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if the query fails.
    pub async fn list_module_subscriptions(
        &self,
    ) -> Result<Vec<ModuleSubscription>, DatabaseError> {
        let church_id = self.require_tenant()?;
        fetch_module_subs(self.db().conn(), church_id).await
    }

    /// Subscribe the given modules plus each module's required agents.
    ///
    /// Already-subscribed modules are reported as skipped.
    ///
    /// # Errors
    ///
    /// Returns `Core(NotFound)` for a module missing from the catalog,
    /// before anything is written.
    pub async fn subscribe_modules(
        &self,
        names: &[String],
    ) -> Result<SubscribeReport, DatabaseError> {
        let church_id = self.require_tenant()?;
        let catalog = self.load_catalog().await?;
        if let Some(unknown) = names.iter().find(|n| catalog.module(n).is_none()) {
            return Err(CoreError::not_found("module", unknown.as_str()).into());
        }
        let mut held_agents = self.load_entitlements().await?.agent_keys();

        let tx = self.db().conn().transaction().await?;
        let outcome =
            write_module_subscribe(&tx, church_id, &catalog, names, &mut held_agents).await;
        let report = tx::finish(tx, outcome, "module subscribe").await?;

        tracing::info!(
            church_id,
            created = report.created.len(),
            skipped = report.skipped.len(),
            required_agents = report.agents_added.len(),
            "modules subscribed"
        );
        Ok(report)
    }

    /// Subscribe every catalog module the church does not hold yet.
    ///
    /// An empty result (nothing missing) is a no-op, not an error.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if a write fails.
    pub async fn subscribe_missing_modules(&self) -> Result<SubscribeReport, DatabaseError> {
        let church_id = self.require_tenant()?;
        let catalog = self.load_catalog().await?;
        let held = self.load_entitlements().await?.module_names();

        let missing = missing_modules(&catalog.modules, &held);
        tracing::debug!(church_id, ?missing, "computed missing modules");
        if missing.is_empty() {
            tracing::info!(church_id, "all modules already subscribed");
            return Ok(SubscribeReport::new(EntitlementKind::Module));
        }
        self.subscribe_modules(&missing).await
    }

    /// Unsubscribe a module and all of its agents. Idempotent.
    ///
    /// A held bundle that lists the module is not touched: the bundle row
    /// stays and the report names it in `held_by_bundles`. Subscribing the
    /// bundle again restores the module.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if a delete fails (nothing is removed in that case).
    pub async fn unsubscribe_module(
        &self,
        module_name: &str,
    ) -> Result<ModuleUnsubscribeReport, DatabaseError> {
        let church_id = self.require_tenant()?;

        let tx = self.db().conn().transaction().await?;
        let outcome = async {
            let mut report = remove_module(&tx, church_id, module_name, None).await?;
            report.held_by_bundles = fetch_covering_bundles(&tx, church_id, module_name).await?;
            Ok::<_, DatabaseError>(report)
        }
        .await;
        let report = tx::finish(tx, outcome, "module unsubscribe").await?;

        if !report.held_by_bundles.is_empty() {
            tracing::warn!(
                church_id,
                module_name,
                bundles = ?report.held_by_bundles,
                "module removed while a held bundle still lists it"
            );
        }
        if report.was_subscribed {
            tracing::info!(
                church_id,
                module_name,
                agents_removed = report.agents_removed.len(),
                "module unsubscribed"
            );
        } else {
            tracing::warn!(church_id, module_name, "module was not subscribed");
        }
        Ok(report)
    }
}
