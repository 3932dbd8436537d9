//! Catalog snapshot and seed format.
//!
//! The catalog (modules, their agents, bundles and bundle membership) is
//! read-only from a church's point of view. [`Catalog`] is the in-memory
//! snapshot the reconciliation functions work against; [`CatalogSeed`] is the
//! TOML shape catalog administrators import.

use std::collections::HashMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::{Agent, Bundle, Module};
use crate::ids::AgentKey;

/// Snapshot of the full catalog, in catalog order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Catalog {
    pub modules: Vec<Module>,
    pub agents: Vec<Agent>,
    pub bundles: Vec<Bundle>,
}

impl Catalog {
    #[must_use]
    pub fn module(&self, module_name: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.module_name == module_name)
    }

    #[must_use]
    pub fn agent(&self, key: &AgentKey) -> Option<&Agent> {
        self.agents.iter().find(|a| a.matches(key))
    }

    #[must_use]
    pub fn bundle(&self, bundle_id: &str) -> Option<&Bundle> {
        self.bundles.iter().find(|b| b.bundle_id == bundle_id)
    }

    /// All agents defined for `module_name`, in catalog order.
    pub fn agents_for<'a>(&'a self, module_name: &'a str) -> impl Iterator<Item = &'a Agent> {
        self.agents
            .iter()
            .filter(move |a| a.module_name == module_name)
    }

    /// Agents flagged `required` for `module_name`.
    pub fn required_agents_for<'a>(
        &'a self,
        module_name: &'a str,
    ) -> impl Iterator<Item = &'a Agent> {
        self.agents_for(module_name).filter(|a| a.required)
    }

    /// Bundle ID → member module names.
    #[must_use]
    pub fn bundle_module_map(&self) -> HashMap<String, Vec<String>> {
        self.bundles
            .iter()
            .map(|b| (b.bundle_id.clone(), b.modules.clone()))
            .collect()
    }
}

/// One agent inside a module entry of a [`CatalogSeed`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct AgentSeed {
    pub agent_name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub required: bool,
}

/// One module entry of a [`CatalogSeed`], with its agents nested.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct ModuleSeed {
    pub module_name: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub agents: Vec<AgentSeed>,
}

/// Importable catalog definition.
///
/// ```toml
/// [[modules]]
/// module_name = "mod_email_mgmt"
/// name = "Email Management"
/// price = 19.0
/// category = "Communication"
///
/// [[modules.agents]]
/// agent_name = "Routing & Assignment"
/// required = true
///
/// [[bundles]]
/// bundle_id = "care"
/// name = "Care Bundle"
/// price = 39.0
/// modules = ["mod_email_mgmt"]
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct CatalogSeed {
    #[serde(default)]
    pub modules: Vec<ModuleSeed>,
    #[serde(default)]
    pub bundles: Vec<Bundle>,
}

impl CatalogSeed {
    /// Flatten the seed into the snapshot shape.
    #[must_use]
    pub fn into_catalog(self) -> Catalog {
        let mut modules = Vec::with_capacity(self.modules.len());
        let mut agents = Vec::new();
        for seed in self.modules {
            for agent in seed.agents {
                agents.push(Agent {
                    module_name: seed.module_name.clone(),
                    agent_name: agent.agent_name,
                    description: agent.description,
                    price: agent.price,
                    required: agent.required,
                });
            }
            modules.push(Module {
                module_name: seed.module_name,
                name: seed.name,
                price: seed.price,
                purpose: seed.purpose,
                category: seed.category,
            });
        }
        Catalog {
            modules,
            agents,
            bundles: self.bundles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SEED: &str = r#"
[[modules]]
module_name = "A"
price = 10.0
category = "Care"

[[modules.agents]]
agent_name = "a1"
required = true

[[modules.agents]]
agent_name = "a2"
price = 2.5

[[modules]]
module_name = "B"

[[bundles]]
bundle_id = "bundle1"
name = "Bundle One"
price = 8.0
modules = ["A", "B"]
"#;

    #[test]
    fn seed_parses_from_toml_and_flattens() {
        let seed: CatalogSeed = toml::from_str(SEED).unwrap();
        let catalog = seed.into_catalog();

        assert_eq!(catalog.modules.len(), 2);
        assert_eq!(catalog.modules[0].module_name, "A");
        assert_eq!(catalog.modules[0].category.as_deref(), Some("Care"));
        assert_eq!(catalog.agents.len(), 2);
        assert!(catalog.agents.iter().all(|a| a.module_name == "A"));
        assert_eq!(catalog.bundles[0].modules, vec!["A", "B"]);
    }

    #[test]
    fn lookups() {
        let catalog = toml::from_str::<CatalogSeed>(SEED).unwrap().into_catalog();

        assert!(catalog.module("B").is_some());
        assert!(catalog.module("Z").is_none());
        assert!(catalog.agent(&AgentKey::new("A", "a2")).is_some());
        assert!(catalog.agent(&AgentKey::new("B", "a2")).is_none());
        assert_eq!(catalog.agents_for("A").count(), 2);
        assert_eq!(catalog.agents_for("B").count(), 0);
        let required: Vec<_> = catalog
            .required_agents_for("A")
            .map(|a| a.agent_name.as_str())
            .collect();
        assert_eq!(required, vec!["a1"]);
        assert_eq!(
            catalog.bundle_module_map().get("bundle1"),
            Some(&vec!["A".to_string(), "B".to_string()])
        );
    }
}
