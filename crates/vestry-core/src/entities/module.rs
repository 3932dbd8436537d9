use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A catalog module. Identified by its unique `module_name`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Module {
    pub module_name: String,
    /// Human-readable name, when the catalog carries one.
    #[serde(default)]
    pub name: Option<String>,
    /// Monthly price.
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub purpose: Option<String>,
    /// Catalog category, used to derive the display group.
    #[serde(default)]
    pub category: Option<String>,
}

impl Module {
    /// The name to show users: `name` if present, otherwise `module_name`.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.module_name)
    }
}
