//! Entitlement cascade integration tests
//!
//! End-to-end runs through `EntitlementService` on an in-memory store:
//! - Bundle subscribe over an existing individual module
//! - Bundle unsubscribe with a module shared by another bundle
//! - Cascade completeness and required-agent protection
//! - Audit trail of a full subscribe/unsubscribe cycle
//! - Rollback of a cascade that fails partway through
//! - File-backed store with tenant isolation

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use rstest::rstest;

use vestry_core::catalog::CatalogSeed;
use vestry_core::draft::SelectionDraft;
use vestry_core::enums::{AuditAction, EntitlementKind};
use vestry_core::errors::CoreError;
use vestry_core::ids::AgentKey;
use vestry_core::reconcile::{missing_agents, missing_modules};
use vestry_db::error::DatabaseError;
use vestry_db::repos::audit::AuditFilter;
use vestry_db::service::EntitlementService;

const CATALOG: &str = r#"
[[modules]]
module_name = "A"
price = 10.0
category = "Communication"

[[modules.agents]]
agent_name = "a1"
required = true

[[modules.agents]]
agent_name = "a2"

[[modules]]
module_name = "B"
price = 5.0

[[modules.agents]]
agent_name = "b1"

[[modules.agents]]
agent_name = "b2"
required = true

[[modules]]
module_name = "C"
price = 3.0

[[modules.agents]]
agent_name = "c1"

[[bundles]]
bundle_id = "Bundle1"
name = "Bundle One"
price = 12.0
modules = ["A", "B"]

[[bundles]]
bundle_id = "Bundle2"
name = "Bundle Two"
price = 4.0
modules = ["B"]
"#;

async fn seeded_store(path: &str) -> EntitlementService {
    let svc = EntitlementService::new_local(path).await.unwrap();
    let seed: CatalogSeed = toml::from_str(CATALOG).unwrap();
    svc.import_catalog(&seed).await.unwrap();
    svc
}

async fn church_service() -> EntitlementService {
    let svc = seeded_store(":memory:").await;
    let church = svc.register_church("St. Brigid", None).await.unwrap();
    svc.with_tenant(church.id)
}

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(ToString::to_string).collect()
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

// ---------------------------------------------------------------------------
// Bundle subscribe
// ---------------------------------------------------------------------------

#[tokio::test]
async fn bundle_over_individual_module_adds_no_duplicate() {
    let svc = church_service().await;
    svc.subscribe_modules(&strings(&["C"])).await.unwrap();

    svc.subscribe_bundle("Bundle1").await.unwrap();

    let ent = svc.load_entitlements().await.unwrap();
    assert_eq!(ent.modules.len(), 3);
    assert_eq!(ent.module_names(), set(&["A", "B", "C"]));

    let expected: HashSet<AgentKey> = ["A::a1", "A::a2", "B::b1", "B::b2"]
        .iter()
        .map(|k| k.parse().unwrap())
        .collect();
    let held = ent.agent_keys();
    assert!(expected.is_subset(&held), "held: {held:?}");
    assert!(!held.contains(&AgentKey::new("C", "c1")));
}

#[rstest]
#[case::bundle_one("Bundle1")]
#[case::bundle_two("Bundle2")]
#[tokio::test]
async fn subscribed_bundle_leaves_nothing_missing(#[case] bundle_id: &str) {
    let svc = church_service().await;
    svc.subscribe_bundle(bundle_id).await.unwrap();

    let catalog = svc.load_catalog().await.unwrap();
    let bundle = catalog.bundle(bundle_id).unwrap();
    let members: Vec<_> = catalog
        .modules
        .iter()
        .filter(|m| bundle.contains_module(&m.module_name))
        .cloned()
        .collect();
    let member_agents: Vec<_> = catalog
        .agents
        .iter()
        .filter(|a| bundle.contains_module(&a.module_name))
        .cloned()
        .collect();

    let ent = svc.load_entitlements().await.unwrap();
    assert!(missing_modules(&members, &ent.module_names()).is_empty());
    assert!(missing_agents(&member_agents, &ent.module_names(), &ent.agent_keys()).is_empty());
}

// ---------------------------------------------------------------------------
// Bundle unsubscribe
// ---------------------------------------------------------------------------

#[tokio::test]
async fn shared_module_survives_bundle_unsubscribe() {
    let svc = church_service().await;
    svc.subscribe_bundles(&strings(&["Bundle1", "Bundle2"]))
        .await
        .unwrap();

    svc.unsubscribe_bundle("Bundle1").await.unwrap();

    let ent = svc.load_entitlements().await.unwrap();
    assert_eq!(ent.module_names(), set(&["B"]));
    assert!(ent.agents.iter().all(|a| a.module_name != "A"));
    assert_eq!(ent.bundle_ids(), set(&["Bundle2"]));
}

#[tokio::test]
async fn exclusive_module_goes_with_all_its_agents() {
    let svc = church_service().await;
    svc.subscribe_bundle("Bundle1").await.unwrap();

    let report = svc.unsubscribe_bundle("Bundle1").await.unwrap();
    assert_eq!(report.modules_removed, strings(&["A", "B"]));
    assert_eq!(report.agents_removed.len(), 4);

    let ent = svc.load_entitlements().await.unwrap();
    assert!(ent.modules.is_empty());
    assert!(ent.agents.is_empty());
    assert!(ent.bundles.is_empty());
}

// ---------------------------------------------------------------------------
// Agents
// ---------------------------------------------------------------------------

#[tokio::test]
async fn required_agent_toggle_leaves_agent_set_unchanged() {
    let svc = church_service().await;
    svc.subscribe_bundle("Bundle2").await.unwrap();
    let before = svc.load_entitlements().await.unwrap().agent_keys();

    let err = svc
        .unsubscribe_agent(&AgentKey::new("B", "b2"))
        .await
        .unwrap_err();
    assert!(matches!(err, DatabaseError::Core(CoreError::RequiredAgent { .. })));

    let after = svc.load_entitlements().await.unwrap().agent_keys();
    assert_eq!(before, after);
}

#[tokio::test]
async fn status_never_offers_agents_of_unheld_modules() {
    let svc = church_service().await;
    svc.subscribe_modules(&strings(&["A"])).await.unwrap();

    let status = svc.entitlement_status().await.unwrap();
    assert_eq!(status.missing_agents, vec![AgentKey::new("A", "a2")]);
    assert_eq!(status.missing_modules, strings(&["B", "C"]));
}

// ---------------------------------------------------------------------------
// Audit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn audit_records_every_row_change() {
    let svc = church_service().await;
    svc.subscribe_bundle("Bundle2").await.unwrap();
    svc.unsubscribe_bundle("Bundle2").await.unwrap();

    let subscribed = svc
        .query_audit(&AuditFilter {
            action: Some(AuditAction::Subscribed),
            ..Default::default()
        })
        .await
        .unwrap();
    let unsubscribed = svc
        .query_audit(&AuditFilter {
            action: Some(AuditAction::Unsubscribed),
            ..Default::default()
        })
        .await
        .unwrap();
    // bundle + module B + agents b1, b2
    assert_eq!(subscribed.len(), 4);
    assert_eq!(unsubscribed.len(), 4);

    let bundle_rows = svc
        .query_audit(&AuditFilter {
            kind: Some(EntitlementKind::Bundle),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(bundle_rows.len(), 2);
    assert!(bundle_rows.iter().all(|e| e.detail.is_none()));
}

// ---------------------------------------------------------------------------
// Atomicity
// ---------------------------------------------------------------------------

/// Make every agent insert fail, so a cascade breaks after its first writes.
async fn refuse_agent_inserts(svc: &EntitlementService) {
    svc.db()
        .conn()
        .execute(
            "CREATE TRIGGER refuse_agent_insert BEFORE INSERT ON church_agents
             BEGIN SELECT RAISE(ABORT, 'agent insert refused'); END",
            (),
        )
        .await
        .unwrap();
}

async fn assert_nothing_held(svc: &EntitlementService) {
    let ent = svc.load_entitlements().await.unwrap();
    assert!(ent.modules.is_empty(), "modules: {:?}", ent.modules);
    assert!(ent.agents.is_empty());
    assert!(ent.bundles.is_empty(), "bundles: {:?}", ent.bundles);
    let audit = svc.query_audit(&AuditFilter::default()).await.unwrap();
    assert!(audit.is_empty(), "audit: {audit:?}");
}

#[tokio::test]
async fn failed_bundle_cascade_leaves_no_rows() {
    let svc = church_service().await;
    refuse_agent_inserts(&svc).await;

    let err = svc.subscribe_bundle("Bundle1").await.unwrap_err();
    assert!(matches!(err, DatabaseError::LibSql(_)), "got: {err}");
    assert_nothing_held(&svc).await;
}

#[tokio::test]
async fn failed_module_cascade_leaves_no_rows() {
    let svc = church_service().await;
    refuse_agent_inserts(&svc).await;

    let err = svc.subscribe_modules(&strings(&["A"])).await.unwrap_err();
    assert!(matches!(err, DatabaseError::LibSql(_)), "got: {err}");
    assert_nothing_held(&svc).await;
}

#[tokio::test]
async fn failed_onboarding_leaves_no_rows() {
    let svc = church_service().await;
    let church_id = svc.tenant().unwrap().to_string();
    svc.create_profile("user-1", None, None, Some(&church_id))
        .await
        .unwrap();
    refuse_agent_inserts(&svc).await;

    let mut draft = SelectionDraft::new();
    draft.select_bundle("Bundle2");
    draft.select_module("C");
    let err = svc.complete_onboarding("user-1", &draft).await.unwrap_err();
    assert!(matches!(err, DatabaseError::LibSql(_)), "got: {err}");

    assert_nothing_held(&svc).await;
    assert!(!svc.get_profile("user-1").await.unwrap().onboarding_completed);
}

// ---------------------------------------------------------------------------
// Persistence and isolation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn churches_are_isolated_in_a_file_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vestry.db");
    let path = path.to_str().unwrap();

    let first_id;
    {
        let svc = seeded_store(path).await;
        let first = svc.register_church("First", None).await.unwrap();
        let second = svc.register_church("Second", None).await.unwrap();
        first_id = first.id.clone();

        let svc = svc.with_tenant(first.id);
        svc.subscribe_bundle("Bundle1").await.unwrap();

        let svc = svc.with_tenant(second.id);
        assert!(svc.load_entitlements().await.unwrap().modules.is_empty());
    }

    let svc = EntitlementService::new_local(path)
        .await
        .unwrap()
        .with_tenant(first_id);
    let ent = svc.load_entitlements().await.unwrap();
    assert_eq!(ent.module_names(), set(&["A", "B"]));
}
