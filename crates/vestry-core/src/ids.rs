//! ID prefixes and composite keys.
//!
//! Row IDs are generated by the store as `{prefix}-{8 hex chars}`. Agents have
//! no row ID in the catalog; they are identified by the `(module, agent)` pair
//! carried in [`AgentKey`].

use std::fmt;
use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

pub const PREFIX_CHURCH: &str = "chr";
pub const PREFIX_MODULE_SUB: &str = "msb";
pub const PREFIX_AGENT_SUB: &str = "asb";
pub const PREFIX_BUNDLE_SUB: &str = "bsb";
pub const PREFIX_AUDIT: &str = "aud";

pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_CHURCH,
    PREFIX_MODULE_SUB,
    PREFIX_AGENT_SUB,
    PREFIX_BUNDLE_SUB,
    PREFIX_AUDIT,
];

/// Separator used in the textual form of an [`AgentKey`].
pub const AGENT_KEY_SEPARATOR: &str = "::";

/// Composite identity of an agent: the module it belongs to plus its name.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct AgentKey {
    pub module_name: String,
    pub agent_name: String,
}

impl AgentKey {
    #[must_use]
    pub fn new(module_name: impl Into<String>, agent_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            agent_name: agent_name.into(),
        }
    }
}

impl fmt::Display for AgentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{AGENT_KEY_SEPARATOR}{}",
            self.module_name, self.agent_name
        )
    }
}

impl FromStr for AgentKey {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (module, agent) = s.split_once(AGENT_KEY_SEPARATOR).ok_or_else(|| {
            CoreError::Validation(format!(
                "agent key '{s}' must look like 'module{AGENT_KEY_SEPARATOR}agent'"
            ))
        })?;
        let module = module.trim();
        let agent = agent.trim();
        if module.is_empty() || agent.is_empty() {
            return Err(CoreError::Validation(format!(
                "agent key '{s}' has an empty module or agent name"
            )));
        }
        Ok(Self::new(module, agent))
    }
}
