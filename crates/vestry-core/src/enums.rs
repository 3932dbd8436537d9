//! Status enums, entitlement kinds, audit actions, and display groups for Vestry.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `SubscriptionState` provides `allowed_next_states()` to enforce the
//! subscribe/unsubscribe toggle at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// SubscriptionState
// ---------------------------------------------------------------------------

/// State of a module, agent, or bundle subscription for one church.
///
/// ```text
/// unsubscribed → subscribed → unsubscribed
/// ```
///
/// There are no intermediate states. A subscription row exists exactly while
/// the state is `subscribed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionState {
    Unsubscribed,
    Subscribed,
}

impl SubscriptionState {
    /// Valid next states from the current state.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Unsubscribed => &[Self::Subscribed],
            Self::Subscribed => &[Self::Unsubscribed],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unsubscribed => "unsubscribed",
            Self::Subscribed => "subscribed",
        }
    }
}

impl fmt::Display for SubscriptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntitlementKind
// ---------------------------------------------------------------------------

/// The three kinds of subscription line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntitlementKind {
    Module,
    Agent,
    Bundle,
}

impl EntitlementKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Module => "module",
            Self::Agent => "agent",
            Self::Bundle => "bundle",
        }
    }
}

impl fmt::Display for EntitlementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the entitlement audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Subscribed,
    Unsubscribed,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Subscribed => "subscribed",
            Self::Unsubscribed => "unsubscribed",
        }
    }

    /// The subscription state this action leaves behind.
    #[must_use]
    pub const fn resulting_state(self) -> SubscriptionState {
        match self {
            Self::Subscribed => SubscriptionState::Subscribed,
            Self::Unsubscribed => SubscriptionState::Unsubscribed,
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ModuleGroup
// ---------------------------------------------------------------------------

/// Display group a module is bucketed into.
///
/// Variant order is the canonical display order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ModuleGroup {
    Accounting,
    Membership,
    Innovation,
    Discipleship,
    Planning,
    Stewardship,
    Community,
    Ministry,
}

impl ModuleGroup {
    pub const ALL: [Self; 8] = [
        Self::Accounting,
        Self::Membership,
        Self::Innovation,
        Self::Discipleship,
        Self::Planning,
        Self::Stewardship,
        Self::Community,
        Self::Ministry,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accounting => "accounting",
            Self::Membership => "membership",
            Self::Innovation => "innovation",
            Self::Discipleship => "discipleship",
            Self::Planning => "planning",
            Self::Stewardship => "stewardship",
            Self::Community => "community",
            Self::Ministry => "ministry",
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Accounting => "Accounting",
            Self::Membership => "Membership",
            Self::Innovation => "Innovation",
            Self::Discipleship => "Discipleship",
            Self::Planning => "Planning",
            Self::Stewardship => "Stewardship",
            Self::Community => "Community",
            Self::Ministry => "Ministry",
        }
    }
}

impl fmt::Display for ModuleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// UserRole
// ---------------------------------------------------------------------------

/// Role a user holds within a church.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Clergy,
    Parish,
}

impl UserRole {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Clergy => "clergy",
            Self::Parish => "parish",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_toggle_is_two_state() {
        assert!(SubscriptionState::Unsubscribed.can_transition_to(SubscriptionState::Subscribed));
        assert!(SubscriptionState::Subscribed.can_transition_to(SubscriptionState::Unsubscribed));
        assert!(!SubscriptionState::Subscribed.can_transition_to(SubscriptionState::Subscribed));
        assert!(
            !SubscriptionState::Unsubscribed.can_transition_to(SubscriptionState::Unsubscribed)
        );
    }

    #[test]
    fn as_str_matches_serde() {
        for group in ModuleGroup::ALL {
            let json = serde_json::to_value(group).unwrap();
            assert_eq!(json, serde_json::Value::String(group.as_str().to_string()));
        }
        let kind = serde_json::to_value(EntitlementKind::Agent).unwrap();
        assert_eq!(kind, "agent");
        let action = serde_json::to_value(AuditAction::Unsubscribed).unwrap();
        assert_eq!(action, "unsubscribed");
    }

    #[test]
    fn audit_action_maps_to_state() {
        assert_eq!(
            AuditAction::Subscribed.resulting_state(),
            SubscriptionState::Subscribed
        );
        assert_eq!(
            AuditAction::Unsubscribed.resulting_state(),
            SubscriptionState::Unsubscribed
        );
    }

    #[test]
    fn module_group_order_is_canonical() {
        let mut sorted = ModuleGroup::ALL;
        sorted.sort();
        assert_eq!(sorted, ModuleGroup::ALL);
    }
}
