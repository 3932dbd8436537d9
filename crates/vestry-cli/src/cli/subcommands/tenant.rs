use clap::Subcommand;

/// Church and profile commands.
#[derive(Clone, Debug, Subcommand)]
pub enum TenantCommands {
    /// Register a church. With the global `--user`, also create that user's
    /// profile linked to the new church.
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        denomination: Option<String>,
        #[arg(long)]
        full_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Show the resolved church.
    Show,
}
