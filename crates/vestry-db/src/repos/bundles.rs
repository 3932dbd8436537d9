//! Bundle subscriptions and their cascades.
//!
//! Subscribing a bundle subscribes every member module and every agent of
//! those modules. Unsubscribing removes only the member modules that no other
//! held bundle still covers, together with all of their agents.

use std::collections::HashSet;

use chrono::Utc;

use vestry_core::audit_detail::CascadeDetail;
use vestry_core::catalog::Catalog;
use vestry_core::entities::{Bundle, BundleSubscription};
use vestry_core::enums::{AuditAction, EntitlementKind, SubscriptionState};
use vestry_core::errors::CoreError;
use vestry_core::ids::{AgentKey, PREFIX_BUNDLE_SUB};
use vestry_core::reconcile::{missing_bundles, plan_bundle_subscribe, plan_bundle_unsubscribe};
use vestry_core::responses::{BundleSubscribeReport, BundleUnsubscribeReport};

use super::agents::insert_agent_sub;
use super::audit::append_audit;
use super::modules::{insert_module_sub, remove_module};
use super::{classify_insert, inserted};
use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{parse_datetime, parse_enum};
use crate::service::EntitlementService;
use crate::tx;

fn row_to_bundle_sub(row: &libsql::Row) -> Result<BundleSubscription, DatabaseError> {
    Ok(BundleSubscription {
        id: row.get(0)?,
        church_id: row.get(1)?,
        bundle_id: row.get(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
    })
}

pub(crate) async fn fetch_bundle_subs(
    conn: &libsql::Connection,
    church_id: &str,
) -> Result<Vec<BundleSubscription>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT id, church_id, bundle_id, status, created_at
             FROM church_bundles WHERE church_id = ?1 ORDER BY rowid",
            [church_id],
        )
        .await?;
    let mut subs = Vec::new();
    while let Some(row) = rows.next().await? {
        subs.push(row_to_bundle_sub(&row)?);
    }
    Ok(subs)
}

async fn insert_bundle_sub(
    conn: &libsql::Connection,
    church_id: &str,
    bundle_id: &str,
) -> Result<(), DatabaseError> {
    let id = generate_id(conn, PREFIX_BUNDLE_SUB).await?;
    let result = conn
        .execute(
            "INSERT INTO church_bundles (id, church_id, bundle_id, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            libsql::params![
                id.as_str(),
                church_id,
                bundle_id,
                SubscriptionState::Subscribed.as_str(),
                Utc::now().to_rfc3339()
            ],
        )
        .await;
    classify_insert(result, EntitlementKind::Bundle, bundle_id)?;

    append_audit(
        conn,
        church_id,
        EntitlementKind::Bundle,
        bundle_id,
        AuditAction::Subscribed,
        None,
    )
    .await
}

async fn delete_bundle_sub(
    conn: &libsql::Connection,
    church_id: &str,
    bundle_id: &str,
) -> Result<bool, DatabaseError> {
    let deleted = conn
        .execute(
            "DELETE FROM church_bundles WHERE church_id = ?1 AND bundle_id = ?2",
            [church_id, bundle_id],
        )
        .await?;
    if deleted > 0 {
        append_audit(
            conn,
            church_id,
            EntitlementKind::Bundle,
            bundle_id,
            AuditAction::Unsubscribed,
            None,
        )
        .await?;
    }
    Ok(deleted > 0)
}

/// Write one bundle and its cascade on `conn`.
///
/// `held_modules` and `held_agents` are the church's sets before the call and
/// are updated in place, so several bundles can be applied in sequence.
pub(crate) async fn apply_bundle_subscribe(
    conn: &libsql::Connection,
    church_id: &str,
    catalog: &Catalog,
    bundle: &Bundle,
    held_modules: &mut HashSet<String>,
    held_agents: &mut HashSet<AgentKey>,
) -> Result<BundleSubscribeReport, DatabaseError> {
    let already_subscribed =
        !inserted(insert_bundle_sub(conn, church_id, &bundle.bundle_id).await)?;

    let plan = plan_bundle_subscribe(bundle, held_modules, held_agents, &catalog.agents);
    let cause = CascadeDetail::new(EntitlementKind::Bundle, bundle.bundle_id.as_str());

    // Bundle members carry no captured price; the bundle price covers them.
    let mut modules_added = Vec::new();
    for name in plan.modules_to_insert {
        if inserted(insert_module_sub(conn, church_id, &name, None, Some(&cause)).await)? {
            modules_added.push(name.clone());
        }
        held_modules.insert(name);
    }

    let mut agents_added = Vec::new();
    for key in plan.agents_to_insert {
        if inserted(insert_agent_sub(conn, church_id, &key, None, Some(&cause)).await)? {
            agents_added.push(key.clone());
        }
        held_agents.insert(key);
    }

    Ok(BundleSubscribeReport {
        bundle_id: bundle.bundle_id.clone(),
        already_subscribed,
        modules_added,
        agents_added,
    })
}

async fn remove_bundle(
    conn: &libsql::Connection,
    church_id: &str,
    catalog: &Catalog,
    bundle_id: &str,
    held_bundles: &HashSet<String>,
) -> Result<BundleUnsubscribeReport, DatabaseError> {
    let members = catalog
        .bundle(bundle_id)
        .map(|b| b.modules.clone())
        .unwrap_or_default();
    let to_remove = plan_bundle_unsubscribe(bundle_id, held_bundles, &catalog.bundle_module_map());
    let modules_retained = members
        .into_iter()
        .filter(|m| !to_remove.contains(m))
        .collect();

    let cause = CascadeDetail::new(EntitlementKind::Bundle, bundle_id);
    let mut modules_removed = Vec::new();
    let mut agents_removed = Vec::new();
    for name in to_remove {
        let removed = remove_module(conn, church_id, &name, Some(&cause)).await?;
        agents_removed.extend(removed.agents_removed);
        if removed.was_subscribed {
            modules_removed.push(name);
        }
    }

    let was_subscribed = delete_bundle_sub(conn, church_id, bundle_id).await?;
    Ok(BundleUnsubscribeReport {
        bundle_id: bundle_id.to_string(),
        was_subscribed,
        modules_removed,
        modules_retained,
        agents_removed,
    })
}

impl EntitlementService {
    /// The current church's bundle subscriptions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if the query fails.
    pub async fn list_bundle_subscriptions(
        &self,
    ) -> Result<Vec<BundleSubscription>, DatabaseError> {
        let church_id = self.require_tenant()?;
        fetch_bundle_subs(self.db().conn(), church_id).await
    }

    /// Subscribe each bundle with its full cascade, all in one transaction.
    ///
    /// Re-subscribing a held bundle still backfills any member module or
    /// agent that went missing.
    ///
    /// # Errors
    ///
    /// Returns `Core(NotFound)` for a bundle missing from the catalog,
    /// before anything is written.
    pub async fn subscribe_bundles(
        &self,
        bundle_ids: &[String],
    ) -> Result<Vec<BundleSubscribeReport>, DatabaseError> {
        let church_id = self.require_tenant()?;
        let catalog = self.load_catalog().await?;

        let mut seen = HashSet::new();
        let mut bundles = Vec::new();
        for id in bundle_ids.iter().filter(|id| seen.insert(id.as_str())) {
            let bundle = catalog
                .bundle(id)
                .ok_or_else(|| CoreError::not_found("bundle", id.as_str()))?;
            bundles.push(bundle);
        }

        let held = self.load_entitlements().await?;
        let mut held_modules = held.module_names();
        let mut held_agents = held.agent_keys();

        let tx = self.db().conn().transaction().await?;
        let outcome = async {
            let mut reports = Vec::with_capacity(bundles.len());
            for bundle in &bundles {
                reports.push(
                    apply_bundle_subscribe(
                        &tx,
                        church_id,
                        &catalog,
                        bundle,
                        &mut held_modules,
                        &mut held_agents,
                    )
                    .await?,
                );
            }
            Ok::<_, DatabaseError>(reports)
        }
        .await;
        let reports = tx::finish(tx, outcome, "bundle subscribe").await?;

        for report in &reports {
            tracing::info!(
                church_id,
                bundle_id = %report.bundle_id,
                already_subscribed = report.already_subscribed,
                modules_added = report.modules_added.len(),
                agents_added = report.agents_added.len(),
                "bundle subscribed"
            );
        }
        Ok(reports)
    }

    /// Subscribe a single bundle. See [`Self::subscribe_bundles`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::subscribe_bundles`].
    pub async fn subscribe_bundle(
        &self,
        bundle_id: &str,
    ) -> Result<BundleSubscribeReport, DatabaseError> {
        let mut reports = self.subscribe_bundles(&[bundle_id.to_string()]).await?;
        reports.pop().ok_or(DatabaseError::NoResult)
    }

    /// Subscribe every catalog bundle the church does not hold, each with
    /// its full cascade.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if a write fails.
    pub async fn subscribe_missing_bundles(
        &self,
    ) -> Result<Vec<BundleSubscribeReport>, DatabaseError> {
        let church_id = self.require_tenant()?;
        let catalog = self.load_catalog().await?;
        let held = self.load_entitlements().await?.bundle_ids();

        let missing = missing_bundles(&catalog.bundles, &held);
        tracing::debug!(church_id, ?missing, "computed missing bundles");
        if missing.is_empty() {
            tracing::info!(church_id, "all bundles already subscribed");
            return Ok(Vec::new());
        }
        self.subscribe_bundles(&missing).await
    }

    /// Unsubscribe a bundle.
    ///
    /// Member modules still covered by another held bundle are kept. The rest
    /// are removed with all of their agents, including agents the church
    /// added by hand. Unsubscribing a bundle that is not held changes
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if a delete fails (nothing is removed in that case).
    pub async fn unsubscribe_bundle(
        &self,
        bundle_id: &str,
    ) -> Result<BundleUnsubscribeReport, DatabaseError> {
        let church_id = self.require_tenant()?;
        let held_bundles = self.load_entitlements().await?.bundle_ids();

        if !held_bundles.contains(bundle_id) {
            tracing::warn!(church_id, bundle_id, "bundle was not subscribed");
            return Ok(BundleUnsubscribeReport {
                bundle_id: bundle_id.to_string(),
                was_subscribed: false,
                modules_removed: Vec::new(),
                modules_retained: Vec::new(),
                agents_removed: Vec::new(),
            });
        }
        let catalog = self.load_catalog().await?;

        let tx = self.db().conn().transaction().await?;
        let outcome = remove_bundle(&tx, church_id, &catalog, bundle_id, &held_bundles).await;
        let report = tx::finish(tx, outcome, "bundle unsubscribe").await?;

        tracing::info!(
            church_id,
            bundle_id,
            modules_removed = report.modules_removed.len(),
            modules_retained = report.modules_retained.len(),
            agents_removed = report.agents_removed.len(),
            "bundle unsubscribed"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{names, tenant_service};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn subscribe_cascades_modules_and_all_agents() {
        let svc = tenant_service().await;
        let report = svc.subscribe_bundle("bundle1").await.unwrap();
        assert!(!report.already_subscribed);
        assert_eq!(report.modules_added, vec!["A", "B"]);
        assert_eq!(report.agents_added.len(), 4);

        let ent = svc.load_entitlements().await.unwrap();
        assert_eq!(ent.module_names().len(), 2);
        assert!(ent.agent_keys().contains(&AgentKey::new("B", "b2")));
    }

    #[tokio::test]
    async fn resubscribe_backfills_missing_rows() {
        let svc = tenant_service().await;
        svc.subscribe_bundle("bundle1").await.unwrap();
        svc.unsubscribe_agent(&AgentKey::new("B", "b1")).await.unwrap();

        let report = svc.subscribe_bundle("bundle1").await.unwrap();
        assert!(report.already_subscribed);
        assert!(report.modules_added.is_empty());
        assert_eq!(report.agents_added, vec![AgentKey::new("B", "b1")]);
    }

    #[tokio::test]
    async fn cascaded_rows_are_audited_with_their_source() {
        let svc = tenant_service().await;
        svc.subscribe_bundle("bundle2").await.unwrap();

        let entries = svc
            .query_audit(&crate::repos::audit::AuditFilter {
                kind: Some(EntitlementKind::Module),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        let detail: CascadeDetail =
            serde_json::from_value(entries[0].detail.clone().unwrap()).unwrap();
        assert_eq!(detail, CascadeDetail::new(EntitlementKind::Bundle, "bundle2"));
    }

    #[tokio::test]
    async fn unknown_bundle_is_not_found() {
        let svc = tenant_service().await;
        let err = svc
            .subscribe_bundles(&names(&["bundle1", "nope"]))
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Core(CoreError::NotFound { .. })));
        assert!(svc.list_bundle_subscriptions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unsubscribe_keeps_modules_shared_with_other_bundles() {
        let svc = tenant_service().await;
        svc.subscribe_bundles(&names(&["bundle1", "bundle2"]))
            .await
            .unwrap();

        let report = svc.unsubscribe_bundle("bundle1").await.unwrap();
        assert!(report.was_subscribed);
        assert_eq!(report.modules_removed, vec!["A"]);
        assert_eq!(report.modules_retained, vec!["B"]);

        let ent = svc.load_entitlements().await.unwrap();
        assert_eq!(ent.module_names(), HashSet::from(["B".to_string()]));
        assert!(ent.agents.iter().all(|a| a.module_name == "B"));
        assert_eq!(ent.bundle_ids(), HashSet::from(["bundle2".to_string()]));
    }

    #[tokio::test]
    async fn unsubscribe_unheld_bundle_is_noop() {
        let svc = tenant_service().await;
        svc.subscribe_modules(&names(&["A"])).await.unwrap();

        let report = svc.unsubscribe_bundle("bundle1").await.unwrap();
        assert!(!report.was_subscribed);
        assert!(svc.load_entitlements().await.unwrap().has_module("A"));
    }

    #[tokio::test]
    async fn subscribe_missing_bundles_covers_all() {
        let svc = tenant_service().await;
        svc.subscribe_bundle("bundle2").await.unwrap();

        let reports = svc.subscribe_missing_bundles().await.unwrap();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].bundle_id, "bundle1");
        assert!(svc.subscribe_missing_bundles().await.unwrap().is_empty());
    }
}
