//! Onboarding: write a user's initial selection for their church.
//!
//! The church comes from the user's profile, not from the service tenant.
//! Bundles go first so their members are audited as bundle cascades, then
//! the selected modules (with required agents), then the remaining agents.

use vestry_core::catalog::Catalog;
use vestry_core::draft::{OnboardingPlan, SelectionDraft};
use vestry_core::errors::CoreError;
use vestry_core::ids::AgentKey;
use vestry_core::responses::OnboardingReport;

use super::agents::insert_agent_sub;
use super::bundles::apply_bundle_subscribe;
use super::catalog::fetch_catalog;
use super::inserted;
use super::modules::write_module_subscribe;
use super::status::fetch_entitlements;
use super::tenant::{fetch_profile, mark_onboarding_completed};
use crate::error::DatabaseError;
use crate::service::EntitlementService;
use crate::tx;

struct Written {
    modules_added: Vec<String>,
    agents_added: Vec<AgentKey>,
    bundles_added: Vec<String>,
}

async fn write_plan(
    conn: &libsql::Connection,
    church_id: &str,
    user_id: &str,
    plan: &OnboardingPlan,
    catalog: &Catalog,
) -> Result<Written, DatabaseError> {
    let held = fetch_entitlements(conn, church_id).await?;
    let mut held_modules = held.module_names();
    let mut held_agents = held.agent_keys();
    let mut written = Written {
        modules_added: Vec::new(),
        agents_added: Vec::new(),
        bundles_added: Vec::new(),
    };

    for bundle_id in &plan.bundles {
        let bundle = catalog
            .bundle(bundle_id)
            .ok_or_else(|| CoreError::not_found("bundle", bundle_id.as_str()))?;
        let report = apply_bundle_subscribe(
            conn,
            church_id,
            catalog,
            bundle,
            &mut held_modules,
            &mut held_agents,
        )
        .await?;
        if !report.already_subscribed {
            written.bundles_added.push(report.bundle_id);
        }
        written.modules_added.extend(report.modules_added);
        written.agents_added.extend(report.agents_added);
    }

    let remaining: Vec<String> = plan
        .modules
        .iter()
        .filter(|m| !held_modules.contains(*m))
        .cloned()
        .collect();
    let report =
        write_module_subscribe(conn, church_id, catalog, &remaining, &mut held_agents).await?;
    written.modules_added.extend(report.created);
    written.agents_added.extend(report.agents_added);

    for key in &plan.agents {
        if held_agents.contains(key) {
            continue;
        }
        let price = catalog.agent(key).and_then(|a| a.price);
        if inserted(insert_agent_sub(conn, church_id, key, price, None).await)? {
            written.agents_added.push(key.clone());
        }
        held_agents.insert(key.clone());
    }

    mark_onboarding_completed(conn, user_id).await?;
    Ok(written)
}

impl EntitlementService {
    /// Resolve `draft` for `user_id`'s church without writing anything.
    ///
    /// # Errors
    ///
    /// Returns `Core(NotFound)` for an unknown user or catalog entry,
    /// `MissingTenantContext` if the profile has no church, or
    /// `Core(ModuleNotSubscribed)` if the draft picks an agent whose module
    /// is not part of the plan.
    pub async fn plan_onboarding(
        &self,
        user_id: &str,
        draft: &SelectionDraft,
    ) -> Result<OnboardingReport, DatabaseError> {
        let church_id = self.resolve_church_for_user(user_id).await?;
        let catalog = self.load_catalog().await?;
        let plan = draft.resolve(&catalog)?;
        tracing::debug!(user_id, %church_id, ?plan, "resolved onboarding plan");

        Ok(OnboardingReport {
            user_id: user_id.to_string(),
            church_id,
            plan,
            modules_added: Vec::new(),
            agents_added: Vec::new(),
            bundles_added: Vec::new(),
            dry_run: true,
        })
    }

    /// Write `draft` for `user_id`'s church and mark the user onboarded.
    ///
    /// Rows the church already holds are left alone. The whole write is one
    /// transaction.
    ///
    /// # Errors
    ///
    /// Same as [`Self::plan_onboarding`], plus `DatabaseError` if a write
    /// fails (nothing is written in that case).
    pub async fn complete_onboarding(
        &self,
        user_id: &str,
        draft: &SelectionDraft,
    ) -> Result<OnboardingReport, DatabaseError> {
        let profile = fetch_profile(self.db().conn(), user_id).await?;
        let church_id = profile.church_id.ok_or_else(|| {
            DatabaseError::MissingTenantContext(format!("user '{user_id}' has no church"))
        })?;
        let catalog = fetch_catalog(self.db().conn()).await?;
        let plan = draft.resolve(&catalog)?;
        tracing::debug!(user_id, %church_id, ?plan, "resolved onboarding plan");

        let tx = self.db().conn().transaction().await?;
        let outcome = write_plan(&tx, &church_id, user_id, &plan, &catalog).await;
        let written = tx::finish(tx, outcome, "onboarding").await?;

        tracing::info!(
            user_id,
            %church_id,
            bundles = written.bundles_added.len(),
            modules = written.modules_added.len(),
            agents = written.agents_added.len(),
            "onboarding completed"
        );
        Ok(OnboardingReport {
            user_id: user_id.to_string(),
            church_id,
            plan,
            modules_added: written.modules_added,
            agents_added: written.agents_added,
            bundles_added: written.bundles_added,
            dry_run: false,
        })
    }
}
