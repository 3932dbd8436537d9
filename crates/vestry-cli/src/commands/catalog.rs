#[path = "catalog/groups.rs"]
mod groups;
#[path = "catalog/import.rs"]
mod import;
#[path = "catalog/list.rs"]
mod list;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::CatalogCommands;
use crate::context::AppContext;

/// Handle `vestry catalog`.
pub async fn handle(
    action: &CatalogCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        CatalogCommands::Import { file } => import::run(file, ctx, flags).await,
        CatalogCommands::Modules => list::modules(ctx, flags).await,
        CatalogCommands::Agents { module } => list::agents(module.as_deref(), ctx, flags).await,
        CatalogCommands::Bundles => list::bundles(ctx, flags).await,
        CatalogCommands::Groups => groups::run(ctx, flags).await,
    }
}
