//! Agent subscriptions.
//!
//! An agent row may only exist while its module row does. Required agents
//! are written by the module cascade and cannot be removed on their own.

use std::collections::HashSet;

use chrono::Utc;

use vestry_core::audit_detail::CascadeDetail;
use vestry_core::entities::AgentSubscription;
use vestry_core::enums::{AuditAction, EntitlementKind, SubscriptionState};
use vestry_core::errors::CoreError;
use vestry_core::ids::{AgentKey, PREFIX_AGENT_SUB};
use vestry_core::reconcile::{check_agent_removable, missing_agents};
use vestry_core::responses::{AgentUnsubscribeReport, SubscribeReport};

use super::audit::append_audit;
use super::{classify_insert, inserted};
use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{get_opt_price, parse_datetime, parse_enum};
use crate::service::EntitlementService;
use crate::tx;

const SELECT_COLS: &str =
    "id, church_id, module_name, agent_name, agent_price, status, created_at, updated_at";

fn row_to_agent_sub(row: &libsql::Row) -> Result<AgentSubscription, DatabaseError> {
    Ok(AgentSubscription {
        id: row.get(0)?,
        church_id: row.get(1)?,
        module_name: row.get(2)?,
        agent_name: row.get(3)?,
        agent_price: get_opt_price(row, 4)?,
        status: parse_enum(&row.get::<String>(5)?)?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
        updated_at: parse_datetime(&row.get::<String>(7)?)?,
    })
}

pub(crate) async fn fetch_agent_subs(
    conn: &libsql::Connection,
    church_id: &str,
) -> Result<Vec<AgentSubscription>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM church_agents WHERE church_id = ?1 ORDER BY rowid"),
            [church_id],
        )
        .await?;
    let mut subs = Vec::new();
    while let Some(row) = rows.next().await? {
        subs.push(row_to_agent_sub(&row)?);
    }
    Ok(subs)
}

pub(crate) async fn fetch_agent_keys_for_module(
    conn: &libsql::Connection,
    church_id: &str,
    module_name: &str,
) -> Result<Vec<AgentKey>, DatabaseError> {
    let mut rows = conn
        .query(
            "SELECT agent_name FROM church_agents
             WHERE church_id = ?1 AND module_name = ?2 ORDER BY rowid",
            [church_id, module_name],
        )
        .await?;
    let mut keys = Vec::new();
    while let Some(row) = rows.next().await? {
        keys.push(AgentKey::new(module_name, row.get::<String>(0)?));
    }
    Ok(keys)
}

/// Insert one agent row plus its audit entry.
///
/// Returns `DuplicateSubscription` if the church already holds the agent.
pub(crate) async fn insert_agent_sub(
    conn: &libsql::Connection,
    church_id: &str,
    key: &AgentKey,
    price: Option<f64>,
    cause: Option<&CascadeDetail>,
) -> Result<(), DatabaseError> {
    let id = generate_id(conn, PREFIX_AGENT_SUB).await?;
    let now = Utc::now().to_rfc3339();
    let result = conn
        .execute(
            &format!(
                "INSERT INTO church_agents ({SELECT_COLS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"
            ),
            libsql::params![
                id.as_str(),
                church_id,
                key.module_name.as_str(),
                key.agent_name.as_str(),
                price,
                SubscriptionState::Subscribed.as_str(),
                now.as_str(),
                now.as_str()
            ],
        )
        .await;
    let key_str = key.to_string();
    classify_insert(result, EntitlementKind::Agent, &key_str)?;

    append_audit(
        conn,
        church_id,
        EntitlementKind::Agent,
        &key_str,
        AuditAction::Subscribed,
        cause,
    )
    .await
}

/// Delete one agent row. Returns whether a row existed.
pub(crate) async fn delete_agent_sub(
    conn: &libsql::Connection,
    church_id: &str,
    key: &AgentKey,
    cause: Option<&CascadeDetail>,
) -> Result<bool, DatabaseError> {
    let deleted = conn
        .execute(
            "DELETE FROM church_agents
             WHERE church_id = ?1 AND module_name = ?2 AND agent_name = ?3",
            [church_id, key.module_name.as_str(), key.agent_name.as_str()],
        )
        .await?;
    if deleted > 0 {
        append_audit(
            conn,
            church_id,
            EntitlementKind::Agent,
            &key.to_string(),
            AuditAction::Unsubscribed,
            cause,
        )
        .await?;
    }
    Ok(deleted > 0)
}

impl EntitlementService {
    /// The current church's agent subscriptions, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if the query fails.
    pub async fn list_agent_subscriptions(&self) -> Result<Vec<AgentSubscription>, DatabaseError> {
        let church_id = self.require_tenant()?;
        fetch_agent_subs(self.db().conn(), church_id).await
    }

    /// Subscribe the given agents. Each agent's module must already be
    /// subscribed.
    ///
    /// # Errors
    ///
    /// Returns `Core(NotFound)` for an agent missing from the catalog, or
    /// `Core(ModuleNotSubscribed)` if its module is not held. Both are
    /// checked before anything is written.
    pub async fn subscribe_agents(&self, keys: &[AgentKey]) -> Result<SubscribeReport, DatabaseError> {
        let church_id = self.require_tenant()?;
        let catalog = self.load_catalog().await?;
        let held_modules = self.load_entitlements().await?.module_names();

        let mut prices = Vec::with_capacity(keys.len());
        for key in keys {
            let agent = catalog
                .agent(key)
                .ok_or_else(|| CoreError::not_found("agent", key.to_string()))?;
            if !held_modules.contains(&key.module_name) {
                return Err(CoreError::ModuleNotSubscribed {
                    module_name: key.module_name.clone(),
                    agent_name: key.agent_name.clone(),
                }
                .into());
            }
            prices.push(agent.price);
        }

        let tx = self.db().conn().transaction().await?;
        let outcome = async {
            let mut report = SubscribeReport::new(EntitlementKind::Agent);
            let mut seen = HashSet::new();
            for (key, price) in keys.iter().zip(prices) {
                if !seen.insert(key) {
                    continue;
                }
                if inserted(insert_agent_sub(&tx, church_id, key, price, None).await)? {
                    report.created.push(key.to_string());
                } else {
                    report.skipped.push(key.to_string());
                }
            }
            Ok::<_, DatabaseError>(report)
        }
        .await;
        let report = tx::finish(tx, outcome, "agent subscribe").await?;

        tracing::info!(
            church_id,
            created = report.created.len(),
            skipped = report.skipped.len(),
            "agents subscribed"
        );
        Ok(report)
    }

    /// Subscribe every catalog agent of every held module that the church
    /// does not hold yet. Agents of unsubscribed modules are never added.
    ///
    /// # Errors
    ///
    /// Returns `MissingTenantContext` without a church, or `DatabaseError`
    /// if a write fails.
    pub async fn subscribe_missing_agents(&self) -> Result<SubscribeReport, DatabaseError> {
        let church_id = self.require_tenant()?;
        let catalog = self.load_catalog().await?;
        let held = self.load_entitlements().await?;

        let missing = missing_agents(&catalog.agents, &held.module_names(), &held.agent_keys());
        tracing::debug!(church_id, missing = missing.len(), "computed missing agents");
        if missing.is_empty() {
            tracing::info!(church_id, "all available agents already subscribed");
            return Ok(SubscribeReport::new(EntitlementKind::Agent));
        }
        self.subscribe_agents(&missing).await
    }

    /// Unsubscribe one optional agent. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `Core(RequiredAgent)` if the catalog marks the agent
    /// required; nothing is removed in that case.
    pub async fn unsubscribe_agent(
        &self,
        key: &AgentKey,
    ) -> Result<AgentUnsubscribeReport, DatabaseError> {
        let church_id = self.require_tenant()?;
        let catalog = self.load_catalog().await?;
        if let Some(agent) = catalog.agent(key) {
            check_agent_removable(agent)?;
        }

        let was_subscribed = delete_agent_sub(self.db().conn(), church_id, key, None).await?;
        if was_subscribed {
            tracing::info!(church_id, agent = %key, "agent unsubscribed");
        } else {
            tracing::warn!(church_id, agent = %key, "agent was not subscribed");
        }
        Ok(AgentUnsubscribeReport {
            key: key.clone(),
            was_subscribed,
        })
    }
}
