#[path = "bundle/list.rs"]
mod list;
#[path = "bundle/savings.rs"]
mod savings;
#[path = "bundle/subscribe.rs"]
mod subscribe;
#[path = "bundle/unsubscribe.rs"]
mod unsubscribe;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::BundleCommands;
use crate::context::AppContext;

/// Handle `vestry bundle`.
pub async fn handle(
    action: &BundleCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        BundleCommands::List => list::held(ctx, flags).await,
        BundleCommands::Missing => list::missing(ctx, flags).await,
        BundleCommands::Subscribe { ids } => subscribe::run(ids, ctx, flags).await,
        BundleCommands::SubscribeMissing => subscribe::run_missing(ctx, flags).await,
        BundleCommands::Unsubscribe { id } => unsubscribe::run(id, ctx, flags).await,
        BundleCommands::Savings => savings::run(ctx, flags).await,
    }
}
