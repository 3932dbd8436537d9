use clap::Subcommand;

/// Bundle subscription commands.
#[derive(Clone, Debug, Subcommand)]
pub enum BundleCommands {
    /// List subscribed bundles.
    List,
    /// Catalog bundles not yet subscribed.
    Missing,
    /// Subscribe bundles with their modules and agents.
    Subscribe {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    /// Subscribe every missing bundle.
    SubscribeMissing,
    /// Unsubscribe a bundle; modules shared with other held bundles stay.
    Unsubscribe { id: String },
    /// Price of each bundle against buying its modules separately.
    Savings,
}
