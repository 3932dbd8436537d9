//! Per-church entitlement snapshot.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{AgentSubscription, BundleSubscription, ModuleSubscription};
use crate::ids::AgentKey;

/// Everything one church is currently subscribed to.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Entitlements {
    pub church_id: String,
    pub modules: Vec<ModuleSubscription>,
    pub agents: Vec<AgentSubscription>,
    pub bundles: Vec<BundleSubscription>,
}

impl Entitlements {
    #[must_use]
    pub fn empty(church_id: impl Into<String>) -> Self {
        Self {
            church_id: church_id.into(),
            modules: Vec::new(),
            agents: Vec::new(),
            bundles: Vec::new(),
        }
    }

    #[must_use]
    pub fn module_names(&self) -> HashSet<String> {
        self.modules.iter().map(|m| m.module_name.clone()).collect()
    }

    #[must_use]
    pub fn agent_keys(&self) -> HashSet<AgentKey> {
        self.agents.iter().map(AgentSubscription::key).collect()
    }

    #[must_use]
    pub fn bundle_ids(&self) -> HashSet<String> {
        self.bundles.iter().map(|b| b.bundle_id.clone()).collect()
    }

    #[must_use]
    pub fn has_module(&self, module_name: &str) -> bool {
        self.modules.iter().any(|m| m.module_name == module_name)
    }

    #[must_use]
    pub fn has_bundle(&self, bundle_id: &str) -> bool {
        self.bundles.iter().any(|b| b.bundle_id == bundle_id)
    }

    /// Agent subscriptions whose module is no longer subscribed.
    ///
    /// Should always be empty; a non-empty result means a cascade was
    /// interrupted outside a transaction.
    #[must_use]
    pub fn orphaned_agents(&self) -> Vec<&AgentSubscription> {
        let modules = self.module_names();
        self.agents
            .iter()
            .filter(|a| !modules.contains(&a.module_name))
            .collect()
    }
}
