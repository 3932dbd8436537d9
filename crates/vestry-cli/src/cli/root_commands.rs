use clap::{Args, Subcommand};

use crate::cli::subcommands::{
    AgentCommands, BundleCommands, CatalogCommands, ModuleCommands, TenantCommands,
};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Catalog of modules, agents and bundles.
    Catalog {
        #[command(subcommand)]
        action: CatalogCommands,
    },
    /// Churches and user profiles.
    Tenant {
        #[command(subcommand)]
        action: TenantCommands,
    },
    /// Module subscriptions.
    Module {
        #[command(subcommand)]
        action: ModuleCommands,
    },
    /// Agent subscriptions.
    Agent {
        #[command(subcommand)]
        action: AgentCommands,
    },
    /// Bundle subscriptions.
    Bundle {
        #[command(subcommand)]
        action: BundleCommands,
    },
    /// Write a user's initial selection for their church.
    Onboard(OnboardArgs),
    /// Held and missing entitlements for the current church.
    Status,
    /// Monthly totals for the current church.
    Billing,
    /// View the entitlement audit trail.
    Audit(AuditArgs),
}

/// Arguments for `vestry onboard`. The user comes from the global `--user`.
#[derive(Clone, Debug, Args)]
pub struct OnboardArgs {
    /// Module to select (repeatable).
    #[arg(long = "module")]
    pub modules: Vec<String>,
    /// Agent to select as `module::agent` (repeatable).
    #[arg(long = "agent")]
    pub agents: Vec<String>,
    /// Bundle to select (repeatable).
    #[arg(long = "bundle")]
    pub bundles: Vec<String>,
    /// Resolve and print the plan without writing.
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for `vestry audit`.
#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    /// Filter by kind: module, agent, bundle.
    #[arg(long)]
    pub kind: Option<String>,
    /// Filter by key (module name, `module::agent`, or bundle ID).
    #[arg(long)]
    pub key: Option<String>,
    /// Filter by action: subscribed, unsubscribed.
    #[arg(long)]
    pub action: Option<String>,
}
