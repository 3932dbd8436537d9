//! Default tenant context for CLI invocations.
//!
//! Either field may be overridden per command with `--church` / `--user`.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct TenantConfig {
    /// Church to act for when no flag is given.
    #[serde(default)]
    pub church_id: String,

    /// User whose profile resolves the church when no church is set.
    #[serde(default)]
    pub user_id: String,
}

impl TenantConfig {
    #[must_use]
    pub fn has_church(&self) -> bool {
        !self.church_id.trim().is_empty()
    }

    #[must_use]
    pub fn has_user(&self) -> bool {
        !self.user_id.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_has_no_tenant() {
        let config = TenantConfig::default();
        assert!(!config.has_church());
        assert!(!config.has_user());
    }

    #[test]
    fn whitespace_does_not_count() {
        let config = TenantConfig {
            church_id: "   ".into(),
            user_id: "user-1".into(),
        };
        assert!(!config.has_church());
        assert!(config.has_user());
    }
}
