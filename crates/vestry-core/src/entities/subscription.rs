use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::SubscriptionState;
use crate::ids::AgentKey;

/// A church's subscription to one module.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ModuleSubscription {
    pub id: String,
    pub church_id: String,
    pub module_name: String,
    /// Price captured at subscribe time, if any.
    pub module_price: Option<f64>,
    pub status: SubscriptionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A church's subscription to one agent of one module.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AgentSubscription {
    pub id: String,
    pub church_id: String,
    pub module_name: String,
    pub agent_name: String,
    pub agent_price: Option<f64>,
    pub status: SubscriptionState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AgentSubscription {
    #[must_use]
    pub fn key(&self) -> AgentKey {
        AgentKey::new(&self.module_name, &self.agent_name)
    }
}

/// A church's subscription to one bundle.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct BundleSubscription {
    pub id: String,
    pub church_id: String,
    pub bundle_id: String,
    pub status: SubscriptionState,
    pub created_at: DateTime<Utc>,
}
