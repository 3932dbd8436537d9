//! Monthly billing totals and bundle savings.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::entities::Bundle;
use crate::entitlements::Entitlements;
use crate::enums::EntitlementKind;

/// One priced line of a [`BillingSummary`].
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BillingLine {
    pub kind: EntitlementKind,
    pub key: String,
    pub price: f64,
}

/// Monthly totals for one church.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BillingSummary {
    pub church_id: String,
    pub lines: Vec<BillingLine>,
    pub modules_total: f64,
    pub agents_total: f64,
    pub bundles_total: f64,
    pub total: f64,
}

/// Member modules of every held bundle.
fn bundle_covered_modules<'a>(
    catalog: &'a Catalog,
    entitlements: &Entitlements,
) -> HashSet<&'a str> {
    entitlements
        .bundles
        .iter()
        .filter_map(|sub| catalog.bundle(&sub.bundle_id))
        .flat_map(|bundle| bundle.modules.iter().map(String::as_str))
        .collect()
}

/// Price every subscription row.
///
/// A module covered by a held bundle, and every agent of such a module, is
/// billed through the bundle and priced at 0. Other rows use their captured
/// price, then the current catalog price, then 0.
#[must_use]
pub fn billing_summary(catalog: &Catalog, entitlements: &Entitlements) -> BillingSummary {
    let covered = bundle_covered_modules(catalog, entitlements);
    let mut lines = Vec::new();

    let mut modules_total = 0.0;
    for sub in &entitlements.modules {
        let price = if covered.contains(sub.module_name.as_str()) {
            0.0
        } else {
            sub.module_price
                .or_else(|| catalog.module(&sub.module_name).and_then(|m| m.price))
                .unwrap_or(0.0)
        };
        modules_total += price;
        lines.push(BillingLine {
            kind: EntitlementKind::Module,
            key: sub.module_name.clone(),
            price,
        });
    }

    let mut agents_total = 0.0;
    for sub in &entitlements.agents {
        let key = sub.key();
        let price = if covered.contains(sub.module_name.as_str()) {
            0.0
        } else {
            sub.agent_price
                .or_else(|| catalog.agent(&key).and_then(|a| a.price))
                .unwrap_or(0.0)
        };
        agents_total += price;
        lines.push(BillingLine {
            kind: EntitlementKind::Agent,
            key: key.to_string(),
            price,
        });
    }

    let mut bundles_total = 0.0;
    for sub in &entitlements.bundles {
        let price = catalog.bundle(&sub.bundle_id).map_or(0.0, |b| b.price);
        bundles_total += price;
        lines.push(BillingLine {
            kind: EntitlementKind::Bundle,
            key: sub.bundle_id.clone(),
            price,
        });
    }

    BillingSummary {
        church_id: entitlements.church_id.clone(),
        lines,
        modules_total,
        agents_total,
        bundles_total,
        total: modules_total + agents_total + bundles_total,
    }
}

/// How much a bundle saves over buying its modules one by one.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct BundleSavings {
    pub bundle_id: String,
    pub bundle_price: f64,
    pub individual_total: f64,
    pub savings: f64,
    /// Member modules already in `selected_modules`.
    pub included_modules: usize,
    pub total_modules: usize,
}

/// Compare a bundle's price with the sum of its member module prices.
///
/// When no member carries a price, `individual_total` falls back to the
/// bundle price, so savings is zero rather than negative.
#[must_use]
pub fn bundle_savings(
    bundle: &Bundle,
    catalog: &Catalog,
    selected_modules: &HashSet<String>,
) -> BundleSavings {
    let summed: f64 = bundle
        .modules
        .iter()
        .filter_map(|name| catalog.module(name).and_then(|m| m.price))
        .sum();
    let individual_total = if summed > 0.0 { summed } else { bundle.price };

    BundleSavings {
        bundle_id: bundle.bundle_id.clone(),
        bundle_price: bundle.price,
        individual_total,
        savings: (individual_total - bundle.price).max(0.0),
        included_modules: bundle
            .modules
            .iter()
            .filter(|m| selected_modules.contains(*m))
            .count(),
        total_modules: bundle.modules.len(),
    }
}
