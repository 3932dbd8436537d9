//! Typed audit detail payloads.
//!
//! Audit entries may carry a structured `detail` JSON blob. These types
//! describe the shapes Vestry writes.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EntitlementKind;

/// Detail for a row written or removed as a side effect of another change,
/// e.g. a module subscribed because its bundle was.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct CascadeDetail {
    pub source_kind: EntitlementKind,
    pub source_key: String,
}

impl CascadeDetail {
    #[must_use]
    pub fn new(source_kind: EntitlementKind, source_key: impl Into<String>) -> Self {
        Self {
            source_kind,
            source_key: source_key.into(),
        }
    }
}
