use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A catalog bundle grouping several modules under one price.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Bundle {
    pub bundle_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    /// Member module names, in catalog join order.
    #[serde(default)]
    pub modules: Vec<String>,
}

impl Bundle {
    #[must_use]
    pub fn contains_module(&self, module_name: &str) -> bool {
        self.modules.iter().any(|m| m == module_name)
    }
}
