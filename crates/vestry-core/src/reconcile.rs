//! Entitlement reconciliation.
//!
//! Pure set arithmetic between a catalog snapshot and one church's
//! subscriptions. Nothing here touches the store; `vestry-db` feeds these
//! functions snapshots and writes back what they return.
//!
//! The one rule that is easy to get wrong: agents are gated behind their
//! module. An agent is never offered, or cascaded in, for a module the church
//! does not hold.

use std::collections::{HashMap, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Agent, Bundle, Module};
use crate::errors::CoreError;
use crate::ids::AgentKey;

/// Catalog modules the church is not subscribed to, in catalog order.
///
/// An empty result means "fully subscribed" and callers should treat it as a
/// no-op.
#[must_use]
pub fn missing_modules(catalog_modules: &[Module], subscribed: &HashSet<String>) -> Vec<String> {
    catalog_modules
        .iter()
        .filter(|m| !subscribed.contains(&m.module_name))
        .map(|m| m.module_name.clone())
        .collect()
}

/// Catalog agents available to add: those whose module is subscribed and
/// which are not themselves subscribed yet.
#[must_use]
pub fn missing_agents(
    catalog_agents: &[Agent],
    subscribed_modules: &HashSet<String>,
    subscribed_agents: &HashSet<AgentKey>,
) -> Vec<AgentKey> {
    catalog_agents
        .iter()
        .filter(|a| subscribed_modules.contains(&a.module_name))
        .map(Agent::key)
        .filter(|key| !subscribed_agents.contains(key))
        .collect()
}

/// Catalog bundles the church is not subscribed to, in catalog order.
#[must_use]
pub fn missing_bundles(catalog_bundles: &[Bundle], subscribed: &HashSet<String>) -> Vec<String> {
    catalog_bundles
        .iter()
        .filter(|b| !subscribed.contains(&b.bundle_id))
        .map(|b| b.bundle_id.clone())
        .collect()
}

/// Rows to insert so that a bundle subscription is complete.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BundleSubscribePlan {
    pub modules_to_insert: Vec<String>,
    pub agents_to_insert: Vec<AgentKey>,
}

impl BundleSubscribePlan {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules_to_insert.is_empty() && self.agents_to_insert.is_empty()
    }
}

/// Plan the cascade for subscribing `bundle`.
///
/// Afterwards the church holds every member module and every catalog agent of
/// those modules. Modules already held are not re-inserted, but their missing
/// agents are still backfilled.
#[must_use]
pub fn plan_bundle_subscribe(
    bundle: &Bundle,
    current_modules: &HashSet<String>,
    current_agents: &HashSet<AgentKey>,
    catalog_agents: &[Agent],
) -> BundleSubscribePlan {
    let mut seen = HashSet::new();
    let members: Vec<&String> = bundle
        .modules
        .iter()
        .filter(|m| seen.insert(m.as_str()))
        .collect();

    let modules_to_insert = members
        .iter()
        .filter(|m| !current_modules.contains(m.as_str()))
        .map(|m| (*m).clone())
        .collect();

    let member_set: HashSet<&str> = members.iter().map(|m| m.as_str()).collect();
    let agents_to_insert = catalog_agents
        .iter()
        .filter(|a| member_set.contains(a.module_name.as_str()))
        .map(Agent::key)
        .filter(|key| !current_agents.contains(key))
        .collect();

    BundleSubscribePlan {
        modules_to_insert,
        agents_to_insert,
    }
}

/// Modules to remove when `bundle_id` is unsubscribed.
///
/// A member module is removed only if no other subscribed bundle also
/// contains it. The caller must also remove every agent subscription of each
/// returned module.
#[must_use]
pub fn plan_bundle_unsubscribe(
    bundle_id: &str,
    subscribed_bundles: &HashSet<String>,
    bundle_modules: &HashMap<String, Vec<String>>,
) -> Vec<String> {
    let Some(members) = bundle_modules.get(bundle_id) else {
        return Vec::new();
    };

    let retained: HashSet<&str> = subscribed_bundles
        .iter()
        .filter(|other| other.as_str() != bundle_id)
        .filter_map(|other| bundle_modules.get(other))
        .flatten()
        .map(String::as_str)
        .collect();

    let mut seen = HashSet::new();
    members
        .iter()
        .filter(|m| !retained.contains(m.as_str()))
        .filter(|m| seen.insert(m.as_str()))
        .cloned()
        .collect()
}

/// Reject removal of a required agent.
///
/// # Errors
///
/// Returns `CoreError::RequiredAgent` if `agent.required` is set.
pub fn check_agent_removable(agent: &Agent) -> Result<(), CoreError> {
    if agent.required {
        return Err(CoreError::RequiredAgent {
            module_name: agent.module_name.clone(),
            agent_name: agent.agent_name.clone(),
        });
    }
    Ok(())
}
