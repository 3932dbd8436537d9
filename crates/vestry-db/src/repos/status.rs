//! Entitlement snapshots, status and billing.

use vestry_core::entitlements::Entitlements;
use vestry_core::pricing::{self, BillingSummary, BundleSavings};
use vestry_core::reconcile::{missing_agents, missing_bundles, missing_modules};
use vestry_core::responses::EntitlementStatus;

use super::agents::fetch_agent_subs;
use super::bundles::fetch_bundle_subs;
use super::modules::fetch_module_subs;
use crate::error::DatabaseError;
use crate::service::EntitlementService;

pub(crate) async fn fetch_entitlements(
    conn: &libsql::Connection,
    church_id: &str,
) -> Result<Entitlements, DatabaseError> {
    Ok(Entitlements {
        church_id: church_id.to_string(),
        modules: fetch_module_subs(conn, church_id).await?,
        agents: fetch_agent_subs(conn, church_id).await?,
        bundles: fetch_bundle_subs(conn, church_id).await?,
    })
}

impl EntitlementService {
    /// Everything the current church holds.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if a query fails.
    pub async fn load_entitlements(&self) -> Result<Entitlements, DatabaseError> {
        let church_id = self.require_tenant()?;
        fetch_entitlements(self.db().conn(), church_id).await
    }

    /// Held and missing keys of every kind, plus any orphaned agent rows.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if a query fails.
    pub async fn entitlement_status(&self) -> Result<EntitlementStatus, DatabaseError> {
        self.require_tenant()?;
        let catalog = self.load_catalog().await?;
        let held = self.load_entitlements().await?;

        let module_names = held.module_names();
        let agent_keys = held.agent_keys();
        let orphaned_agents: Vec<_> = held.orphaned_agents().iter().map(|a| a.key()).collect();
        if !orphaned_agents.is_empty() {
            tracing::warn!(
                church_id = %held.church_id,
                orphaned = orphaned_agents.len(),
                "agent subscriptions without their module"
            );
        }

        Ok(EntitlementStatus {
            missing_modules: missing_modules(&catalog.modules, &module_names),
            missing_agents: missing_agents(&catalog.agents, &module_names, &agent_keys),
            missing_bundles: missing_bundles(&catalog.bundles, &held.bundle_ids()),
            modules: held.modules.iter().map(|m| m.module_name.clone()).collect(),
            agents: held.agents.iter().map(|a| a.key()).collect(),
            bundles: held.bundles.iter().map(|b| b.bundle_id.clone()).collect(),
            orphaned_agents,
            church_id: held.church_id,
        })
    }

    /// Monthly totals for the current church.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if a query fails.
    pub async fn billing_summary(&self) -> Result<BillingSummary, DatabaseError> {
        self.require_tenant()?;
        let catalog = self.load_catalog().await?;
        let held = self.load_entitlements().await?;
        Ok(pricing::billing_summary(&catalog, &held))
    }

    /// Savings of every catalog bundle against the church's held modules.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if a query fails.
    pub async fn bundle_savings(&self) -> Result<Vec<BundleSavings>, DatabaseError> {
        self.require_tenant()?;
        let catalog = self.load_catalog().await?;
        let held = self.load_entitlements().await?.module_names();
        Ok(catalog
            .bundles
            .iter()
            .map(|b| pricing::bundle_savings(b, &catalog, &held))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DatabaseError;
    use crate::test_support::helpers::{names, tenant_service, test_service};
    use pretty_assertions::assert_eq;
    use vestry_core::ids::AgentKey;

    #[tokio::test]
    async fn reports_fail_on_tenant_before_reading_the_store() {
        let svc = test_service().await;
        // Any catalog read would now fail with a libSQL error instead.
        svc.db()
            .conn()
            .execute("DROP TABLE bundle_modules", ())
            .await
            .unwrap();

        assert!(matches!(
            svc.entitlement_status().await,
            Err(DatabaseError::MissingTenantContext(_))
        ));
        assert!(matches!(
            svc.billing_summary().await,
            Err(DatabaseError::MissingTenantContext(_))
        ));
        assert!(matches!(
            svc.bundle_savings().await,
            Err(DatabaseError::MissingTenantContext(_))
        ));
    }

    #[tokio::test]
    async fn fresh_church_is_missing_everything() {
        let svc = tenant_service().await;
        let status = svc.entitlement_status().await.unwrap();
        assert!(status.modules.is_empty());
        assert_eq!(status.missing_modules, vec!["A", "B", "C"]);
        assert!(status.missing_agents.is_empty());
        assert_eq!(status.missing_bundles, vec!["bundle1", "bundle2"]);
    }

    #[tokio::test]
    async fn status_tracks_held_rows() {
        let svc = tenant_service().await;
        svc.subscribe_modules(&names(&["A"])).await.unwrap();

        let status = svc.entitlement_status().await.unwrap();
        assert_eq!(status.modules, vec!["A"]);
        assert_eq!(status.agents, vec![AgentKey::new("A", "a1")]);
        assert_eq!(status.missing_agents, vec![AgentKey::new("A", "a2")]);
        assert!(status.orphaned_agents.is_empty());
    }

    #[tokio::test]
    async fn billing_uses_captured_prices() {
        let svc = tenant_service().await;
        svc.subscribe_bundle("bundle2").await.unwrap();
        svc.subscribe_modules(&names(&["A"])).await.unwrap();
        svc.subscribe_agents(&[AgentKey::new("A", "a2")]).await.unwrap();

        let bill = svc.billing_summary().await.unwrap();
        assert_eq!(bill.modules_total, 10.0);
        assert_eq!(bill.agents_total, 2.0);
        assert_eq!(bill.bundles_total, 4.0);
        assert_eq!(bill.total, 16.0);
    }

    #[tokio::test]
    async fn bundle_members_are_not_billed_twice() {
        let svc = tenant_service().await;
        svc.subscribe_bundle("bundle1").await.unwrap();

        let ent = svc.load_entitlements().await.unwrap();
        assert!(ent.modules.iter().all(|m| m.module_price.is_none()));
        assert!(ent.agents.iter().all(|a| a.agent_price.is_none()));

        let bill = svc.billing_summary().await.unwrap();
        assert_eq!(bill.modules_total, 0.0);
        assert_eq!(bill.agents_total, 0.0);
        assert_eq!(bill.bundles_total, 12.0);
        assert_eq!(bill.total, 12.0);
    }

    #[tokio::test]
    async fn savings_per_bundle() {
        let svc = tenant_service().await;
        svc.subscribe_modules(&names(&["B"])).await.unwrap();

        let savings = svc.bundle_savings().await.unwrap();
        assert_eq!(savings.len(), 2);
        assert_eq!(savings[0].bundle_id, "bundle1");
        assert_eq!(savings[0].individual_total, 15.0);
        assert_eq!(savings[0].savings, 3.0);
        assert_eq!(savings[0].included_modules, 1);
        assert_eq!(savings[1].savings, 1.0);
    }
}
