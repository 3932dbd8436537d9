use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A tenant. Every subscription row is scoped by a church ID.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Church {
    pub id: String,
    pub name: String,
    pub denomination: Option<String>,
    pub created_at: DateTime<Utc>,
}
