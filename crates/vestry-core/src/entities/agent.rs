use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ids::AgentKey;

/// A catalog agent, defined per module.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Agent {
    pub module_name: String,
    pub agent_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    /// Required agents accompany every subscription of their module and
    /// cannot be removed individually.
    #[serde(default)]
    pub required: bool,
}

impl Agent {
    #[must_use]
    pub fn key(&self) -> AgentKey {
        AgentKey::new(&self.module_name, &self.agent_name)
    }

    #[must_use]
    pub fn matches(&self, key: &AgentKey) -> bool {
        self.module_name == key.module_name && self.agent_name == key.agent_name
    }
}
