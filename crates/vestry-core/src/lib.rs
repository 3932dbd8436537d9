//! # vestry-core
//!
//! Core types, reconciliation rules, and error types for Vestry.
//!
//! This crate provides the foundational types shared across all Vestry crates:
//! - Entity structs for the catalog (modules, agents, bundles) and for
//!   per-church subscriptions
//! - Status and kind enums, including the two-state subscription toggle
//! - Composite keys and ID prefix constants
//! - Cross-cutting error types
//! - Pure reconciliation functions over catalog and entitlement snapshots
//! - The selection draft used by onboarding and bulk subscribe flows
//! - Display grouping and pricing helpers
//! - CLI response types

pub mod audit_detail;
pub mod catalog;
pub mod draft;
pub mod entities;
pub mod entitlements;
pub mod enums;
pub mod errors;
pub mod grouping;
pub mod ids;
pub mod pricing;
pub mod reconcile;
pub mod responses;
