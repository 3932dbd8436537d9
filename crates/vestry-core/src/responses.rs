//! CLI response types returned as JSON by `vestry` commands.
//!
//! These structs define the shape of JSON output for commands like
//! `vestry module subscribe`, `vestry bundle unsubscribe`, `vestry onboard`,
//! `vestry catalog import`, and `vestry status`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::draft::OnboardingPlan;
use crate::enums::EntitlementKind;
use crate::ids::AgentKey;

/// Response from `vestry module|agent subscribe` and `subscribe-missing`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SubscribeReport {
    pub kind: EntitlementKind,
    /// Keys newly subscribed.
    pub created: Vec<String>,
    /// Keys that were already subscribed.
    pub skipped: Vec<String>,
    /// Required agents subscribed alongside new modules.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agents_added: Vec<AgentKey>,
}

impl SubscribeReport {
    #[must_use]
    pub const fn new(kind: EntitlementKind) -> Self {
        Self {
            kind,
            created: Vec::new(),
            skipped: Vec::new(),
            agents_added: Vec::new(),
        }
    }

    /// Nothing was written.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.created.is_empty() && self.agents_added.is_empty()
    }
}

/// Response from `vestry bundle subscribe` (one entry per bundle).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BundleSubscribeReport {
    pub bundle_id: String,
    pub already_subscribed: bool,
    pub modules_added: Vec<String>,
    pub agents_added: Vec<AgentKey>,
}

/// Response from `vestry bundle unsubscribe`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BundleUnsubscribeReport {
    pub bundle_id: String,
    pub was_subscribed: bool,
    pub modules_removed: Vec<String>,
    /// Member modules kept because another subscribed bundle contains them.
    pub modules_retained: Vec<String>,
    pub agents_removed: Vec<AgentKey>,
}

/// Response from `vestry module unsubscribe`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct ModuleUnsubscribeReport {
    pub module_name: String,
    pub was_subscribed: bool,
    pub agents_removed: Vec<AgentKey>,
    /// Held bundles that list this module. Their rows are left in place.
    pub held_by_bundles: Vec<String>,
}

/// Response from `vestry agent unsubscribe`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct AgentUnsubscribeReport {
    pub key: AgentKey,
    pub was_subscribed: bool,
}

/// Response from `vestry onboard`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OnboardingReport {
    pub user_id: String,
    pub church_id: String,
    pub plan: OnboardingPlan,
    pub modules_added: Vec<String>,
    pub agents_added: Vec<AgentKey>,
    pub bundles_added: Vec<String>,
    /// The plan was computed but nothing was written.
    pub dry_run: bool,
}

/// Response from `vestry catalog import`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CatalogImportReport {
    pub modules: u32,
    pub agents: u32,
    pub bundles: u32,
    pub bundle_links: u32,
}

/// Response from `vestry status`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct EntitlementStatus {
    pub church_id: String,
    pub modules: Vec<String>,
    pub agents: Vec<AgentKey>,
    pub bundles: Vec<String>,
    pub missing_modules: Vec<String>,
    pub missing_agents: Vec<AgentKey>,
    pub missing_bundles: Vec<String>,
    /// Agent rows whose module is not subscribed. Always empty unless a
    /// cascade was interrupted.
    pub orphaned_agents: Vec<AgentKey>,
}
