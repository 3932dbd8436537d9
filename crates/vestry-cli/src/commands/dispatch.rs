use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Catalog { action } => commands::catalog::handle(&action, ctx, flags).await,
        Commands::Tenant { action } => commands::tenant::handle(&action, ctx, flags).await,
        Commands::Module { action } => commands::module::handle(&action, ctx, flags).await,
        Commands::Agent { action } => commands::agent::handle(&action, ctx, flags).await,
        Commands::Bundle { action } => commands::bundle::handle(&action, ctx, flags).await,
        Commands::Onboard(args) => commands::onboard::handle(&args, ctx, flags).await,
        Commands::Status => commands::status::handle(ctx, flags).await,
        Commands::Billing => commands::billing::handle(ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
    }
}
