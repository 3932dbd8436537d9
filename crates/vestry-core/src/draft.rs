//! In-progress selection of modules, agents, and bundles.
//!
//! A [`SelectionDraft`] is what a user has ticked so far during onboarding or
//! a bulk subscribe. It holds intent only. Required agents are never stored
//! here; [`SelectionDraft::resolve`] derives them against the catalog when the
//! draft is about to be written.

use std::collections::{BTreeSet, HashSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::entities::Agent;
use crate::errors::CoreError;
use crate::ids::AgentKey;

/// Explicit selection state.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SelectionDraft {
    #[serde(default)]
    pub modules: BTreeSet<String>,
    #[serde(default)]
    pub agents: BTreeSet<AgentKey>,
    #[serde(default)]
    pub bundles: BTreeSet<String>,
}

/// What a draft expands to once the catalog is applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OnboardingPlan {
    /// Final module set, in catalog order.
    pub modules: Vec<String>,
    /// Final agent set, in catalog order.
    pub agents: Vec<AgentKey>,
    /// Selected bundles, in catalog order.
    pub bundles: Vec<String>,
    /// Modules that are in the plan only because a selected bundle contains
    /// them.
    pub bundle_added_modules: Vec<String>,
}

impl SelectionDraft {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty() && self.agents.is_empty() && self.bundles.is_empty()
    }

    /// Flip a module in or out. Returns whether it is selected afterwards.
    ///
    /// Deselecting a module also drops any selected agents of that module.
    pub fn toggle_module(&mut self, module_name: &str) -> bool {
        if self.modules.remove(module_name) {
            self.agents.retain(|k| k.module_name != module_name);
            false
        } else {
            self.modules.insert(module_name.to_string());
            true
        }
    }

    /// Flip a bundle in or out. Returns whether it is selected afterwards.
    pub fn toggle_bundle(&mut self, bundle_id: &str) -> bool {
        if self.bundles.remove(bundle_id) {
            false
        } else {
            self.bundles.insert(bundle_id.to_string());
            true
        }
    }

    /// Flip an optional agent in or out. Returns whether it is selected
    /// afterwards.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::RequiredAgent` for a required agent; the draft is
    /// left unchanged.
    pub fn toggle_agent(&mut self, agent: &Agent) -> Result<bool, CoreError> {
        if agent.required {
            return Err(CoreError::RequiredAgent {
                module_name: agent.module_name.clone(),
                agent_name: agent.agent_name.clone(),
            });
        }
        let key = agent.key();
        if self.agents.remove(&key) {
            Ok(false)
        } else {
            self.agents.insert(key);
            Ok(true)
        }
    }

    pub fn select_module(&mut self, module_name: impl Into<String>) {
        self.modules.insert(module_name.into());
    }

    pub fn select_agent(&mut self, key: AgentKey) {
        self.agents.insert(key);
    }

    pub fn select_bundle(&mut self, bundle_id: impl Into<String>) {
        self.bundles.insert(bundle_id.into());
    }

    /// Expand the draft against `catalog`.
    ///
    /// Final modules are the selected modules plus every member of every
    /// selected bundle. Final agents are the selected agents, plus the
    /// required agents of every final module, plus every agent of every
    /// bundle member module.
    ///
    /// # Errors
    ///
    /// - `CoreError::NotFound` if a selected module, agent, or bundle, or a
    ///   bundle member, is not in the catalog.
    /// - `CoreError::ModuleNotSubscribed` if a selected agent's module is not
    ///   part of the final module set.
    pub fn resolve(&self, catalog: &Catalog) -> Result<OnboardingPlan, CoreError> {
        if let Some(unknown) = self.bundles.iter().find(|id| catalog.bundle(id).is_none()) {
            return Err(CoreError::not_found("bundle", unknown.as_str()));
        }
        let mut bundle_members: HashSet<&str> = HashSet::new();
        let mut bundles = Vec::with_capacity(self.bundles.len());
        for bundle in catalog.bundles.iter().filter(|b| self.bundles.contains(&b.bundle_id)) {
            bundle_members.extend(bundle.modules.iter().map(String::as_str));
            bundles.push(bundle.bundle_id.clone());
        }

        let requested = self.modules.iter().map(String::as_str);
        for module_name in requested.chain(bundle_members.iter().copied()) {
            if catalog.module(module_name).is_none() {
                return Err(CoreError::not_found("module", module_name));
            }
        }

        let mut modules = Vec::new();
        let mut bundle_added_modules = Vec::new();
        for module in &catalog.modules {
            let name = module.module_name.as_str();
            let selected = self.modules.contains(name);
            let from_bundle = bundle_members.contains(name);
            if selected || from_bundle {
                modules.push(module.module_name.clone());
            }
            if from_bundle && !selected {
                bundle_added_modules.push(module.module_name.clone());
            }
        }
        let final_modules: HashSet<&str> = modules.iter().map(String::as_str).collect();

        for key in &self.agents {
            if catalog.agent(key).is_none() {
                return Err(CoreError::not_found("agent", key.to_string()));
            }
            if !final_modules.contains(key.module_name.as_str()) {
                return Err(CoreError::ModuleNotSubscribed {
                    module_name: key.module_name.clone(),
                    agent_name: key.agent_name.clone(),
                });
            }
        }

        let agents = catalog
            .agents
            .iter()
            .filter(|a| final_modules.contains(a.module_name.as_str()))
            .filter(|a| {
                a.required
                    || bundle_members.contains(a.module_name.as_str())
                    || self.agents.contains(&a.key())
            })
            .map(Agent::key)
            .collect();

        Ok(OnboardingPlan {
            modules,
            agents,
            bundles,
            bundle_added_modules,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Bundle, Module};
    use pretty_assertions::assert_eq;

    fn catalog() -> Catalog {
        let module = |name: &str, price: f64| Module {
            module_name: name.to_string(),
            name: None,
            price: Some(price),
            purpose: None,
            category: None,
        };
        let agent = |module: &str, name: &str, required: bool| Agent {
            module_name: module.to_string(),
            agent_name: name.to_string(),
            description: None,
            price: None,
            required,
        };
        Catalog {
            modules: vec![module("A", 10.0), module("B", 5.0), module("C", 3.0)],
            agents: vec![
                agent("A", "a1", true),
                agent("A", "a2", false),
                agent("B", "b1", false),
                agent("C", "c1", true),
                agent("C", "c2", false),
            ],
            bundles: vec![Bundle {
                bundle_id: "bundle1".to_string(),
                name: "Bundle One".to_string(),
                description: None,
                price: 12.0,
                modules: vec!["A".to_string(), "B".to_string()],
            }],
        }
    }

    #[test]
    fn toggles_flip_membership() {
        let mut draft = SelectionDraft::new();
        assert!(draft.is_empty());
        assert!(draft.toggle_module("A"));
        assert!(draft.toggle_bundle("bundle1"));
        assert!(!draft.toggle_bundle("bundle1"));
        assert!(!draft.is_empty());
        assert!(!draft.toggle_module("A"));
        assert!(draft.is_empty());
    }

    #[test]
    fn deselecting_module_drops_its_agents() {
        let cat = catalog();
        let mut draft = SelectionDraft::new();
        draft.toggle_module("A");
        draft.toggle_agent(&cat.agents[1]).unwrap();
        assert_eq!(draft.agents.len(), 1);

        draft.toggle_module("A");
        assert!(draft.agents.is_empty());
    }

    #[test]
    fn toggling_required_agent_is_rejected_and_draft_unchanged() {
        let cat = catalog();
        let mut draft = SelectionDraft::new();
        draft.toggle_module("A");
        let before = draft.clone();

        let err = draft.toggle_agent(&cat.agents[0]).unwrap_err();
        assert!(matches!(err, CoreError::RequiredAgent { .. }));
        assert_eq!(draft, before);
    }

    #[test]
    fn resolve_adds_required_agents_of_selected_modules() {
        let mut draft = SelectionDraft::new();
        draft.select_module("C");

        let plan = draft.resolve(&catalog()).unwrap();
        assert_eq!(plan.modules, vec!["C"]);
        assert_eq!(plan.agents, vec![AgentKey::new("C", "c1")]);
        assert!(plan.bundle_added_modules.is_empty());
    }

    #[test]
    fn resolve_bundle_brings_all_member_agents() {
        let mut draft = SelectionDraft::new();
        draft.select_bundle("bundle1");
        draft.select_module("C");
        draft.select_agent(AgentKey::new("C", "c2"));

        let plan = draft.resolve(&catalog()).unwrap();
        assert_eq!(plan.modules, vec!["A", "B", "C"]);
        assert_eq!(plan.bundle_added_modules, vec!["A", "B"]);
        assert_eq!(plan.bundles, vec!["bundle1"]);
        assert_eq!(
            plan.agents,
            vec![
                AgentKey::new("A", "a1"),
                AgentKey::new("A", "a2"),
                AgentKey::new("B", "b1"),
                AgentKey::new("C", "c1"),
                AgentKey::new("C", "c2"),
            ]
        );
    }

    #[test]
    fn resolve_lists_bundles_in_catalog_order() {
        let mut catalog = catalog();
        catalog.bundles.insert(
            0,
            Bundle {
                bundle_id: "zeta".to_string(),
                name: "Zeta".to_string(),
                description: None,
                price: 4.0,
                modules: vec!["C".to_string()],
            },
        );
        let mut draft = SelectionDraft::new();
        draft.select_bundle("bundle1");
        draft.select_bundle("zeta");

        let plan = draft.resolve(&catalog).unwrap();
        assert_eq!(plan.bundles, vec!["zeta", "bundle1"]);
        assert_eq!(plan.modules, vec!["A", "B", "C"]);
    }

    #[test]
    fn resolve_rejects_agent_without_module() {
        let mut draft = SelectionDraft::new();
        draft.select_agent(AgentKey::new("B", "b1"));

        let err = draft.resolve(&catalog()).unwrap_err();
        assert!(matches!(err, CoreError::ModuleNotSubscribed { .. }));
    }

    #[test]
    fn resolve_rejects_unknown_entries() {
        let mut draft = SelectionDraft::new();
        draft.select_bundle("nope");
        assert!(matches!(
            draft.resolve(&catalog()),
            Err(CoreError::NotFound { .. })
        ));

        let mut draft = SelectionDraft::new();
        draft.select_module("A");
        draft.select_agent(AgentKey::new("A", "ghost"));
        assert!(matches!(
            draft.resolve(&catalog()),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn draft_deserializes_from_partial_json() {
        let draft: SelectionDraft =
            serde_json::from_value(serde_json::json!({ "modules": ["A"] })).unwrap();
        assert_eq!(draft.modules.len(), 1);
        assert!(draft.agents.is_empty());
    }
}
