use serde::de::DeserializeOwned;
use vestry_core::ids::AgentKey;

/// Parse a snake_case enum value using serde-deserialization.
pub fn parse_enum<T>(raw: &str, field: &str) -> anyhow::Result<T>
where
    T: DeserializeOwned,
{
    let normalized = raw.trim().to_ascii_lowercase().replace('-', "_");
    let json = format!("\"{normalized}\"");
    serde_json::from_str(&json).map_err(|error| anyhow::anyhow!("invalid {field} '{raw}': {error}"))
}

/// Parse every `module::agent` argument, failing on the first bad one.
pub fn parse_agent_keys(raw: &[String]) -> anyhow::Result<Vec<AgentKey>> {
    raw.iter()
        .map(|value| value.parse::<AgentKey>().map_err(anyhow::Error::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use vestry_core::enums::{AuditAction, EntitlementKind};
    use vestry_core::ids::AgentKey;

    use super::{parse_agent_keys, parse_enum};

    #[test]
    fn parses_snake_case_enum() {
        let kind: EntitlementKind = parse_enum("bundle", "kind").expect("kind should parse");
        assert_eq!(kind, EntitlementKind::Bundle);
    }

    #[test]
    fn parses_mixed_case() {
        let action: AuditAction =
            parse_enum("Unsubscribed", "action").expect("action should parse");
        assert_eq!(action, AuditAction::Unsubscribed);
    }

    #[test]
    fn errors_on_invalid_enum() {
        let err = parse_enum::<EntitlementKind>("plan", "kind").expect_err("should fail");
        assert!(err.to_string().contains("invalid kind 'plan'"));
    }

    #[test]
    fn parses_agent_keys() {
        let keys = parse_agent_keys(&["A::a1".to_string(), "B::b2".to_string()])
            .expect("keys should parse");
        assert_eq!(keys, vec![AgentKey::new("A", "a1"), AgentKey::new("B", "b2")]);
    }

    #[test]
    fn rejects_key_without_separator() {
        assert!(parse_agent_keys(&["A-a1".to_string()]).is_err());
    }
}
