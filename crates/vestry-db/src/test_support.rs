//! Shared test utilities for vestry-db unit tests.

#[cfg(test)]
pub(crate) mod helpers {
    use vestry_core::catalog::CatalogSeed;

    use crate::service::EntitlementService;

    /// Modules A, B, C; `bundle1` = {A, B}, `bundle2` = {B}.
    /// Required agents: `A::a1`, `C::c1`.
    pub const TEST_CATALOG: &str = r#"
[[modules]]
module_name = "A"
name = "Email Management"
price = 10.0
category = "Communication"

[[modules.agents]]
agent_name = "a1"
required = true

[[modules.agents]]
agent_name = "a2"
price = 2.0

[[modules]]
module_name = "B"
price = 5.0
category = "Care"

[[modules.agents]]
agent_name = "b1"

[[modules.agents]]
agent_name = "b2"

[[modules]]
module_name = "C"
price = 3.0

[[modules.agents]]
agent_name = "c1"
required = true

[[modules.agents]]
agent_name = "c2"

[[bundles]]
bundle_id = "bundle1"
name = "Bundle One"
price = 12.0
modules = ["A", "B"]

[[bundles]]
bundle_id = "bundle2"
name = "Bundle Two"
price = 4.0
modules = ["B"]
"#;

    /// In-memory service with an empty store and no tenant.
    pub async fn test_service() -> EntitlementService {
        EntitlementService::new_local(":memory:").await.unwrap()
    }

    /// In-memory service with `TEST_CATALOG` imported and a freshly
    /// registered church selected as tenant.
    pub async fn tenant_service() -> EntitlementService {
        let svc = test_service().await;
        let seed: CatalogSeed = toml::from_str(TEST_CATALOG).unwrap();
        svc.import_catalog(&seed).await.unwrap();
        let church = svc.register_church("Grace Chapel", None).await.unwrap();
        svc.with_tenant(church.id)
    }

    pub fn names(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }
}
