use clap::Subcommand;

/// Module subscription commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ModuleCommands {
    /// List subscribed modules.
    List,
    /// Catalog modules not yet subscribed.
    Missing,
    /// Subscribe modules (and their required agents).
    Subscribe {
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// Subscribe every missing module.
    SubscribeMissing,
    /// Unsubscribe a module and all of its agents.
    Unsubscribe { name: String },
}
