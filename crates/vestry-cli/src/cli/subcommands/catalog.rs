use clap::Subcommand;

/// Catalog commands. The catalog is global, not church-scoped.
#[derive(Clone, Debug, Subcommand)]
pub enum CatalogCommands {
    /// Import (upsert) a catalog TOML file.
    Import { file: String },
    /// List catalog modules.
    Modules,
    /// List catalog agents.
    Agents {
        #[arg(long)]
        module: Option<String>,
    },
    /// List catalog bundles.
    Bundles,
    /// Modules grouped by display group.
    Groups,
}
