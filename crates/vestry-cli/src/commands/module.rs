#[path = "module/list.rs"]
mod list;
#[path = "module/subscribe.rs"]
mod subscribe;
#[path = "module/unsubscribe.rs"]
mod unsubscribe;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ModuleCommands;
use crate::context::AppContext;

/// Handle `vestry module`.
pub async fn handle(
    action: &ModuleCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ModuleCommands::List => list::held(ctx, flags).await,
        ModuleCommands::Missing => list::missing(ctx, flags).await,
        ModuleCommands::Subscribe { names } => subscribe::run(names, ctx, flags).await,
        ModuleCommands::SubscribeMissing => subscribe::run_missing(ctx, flags).await,
        ModuleCommands::Unsubscribe { name } => unsubscribe::run(name, ctx, flags).await,
    }
}
