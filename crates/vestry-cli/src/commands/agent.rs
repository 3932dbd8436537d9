#[path = "agent/list.rs"]
mod list;
#[path = "agent/subscribe.rs"]
mod subscribe;
#[path = "agent/unsubscribe.rs"]
mod unsubscribe;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AgentCommands;
use crate::context::AppContext;

/// Handle `vestry agent`.
pub async fn handle(
    action: &AgentCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AgentCommands::List => list::held(ctx, flags).await,
        AgentCommands::Missing => list::missing(ctx, flags).await,
        AgentCommands::Subscribe { keys } => subscribe::run(keys, ctx, flags).await,
        AgentCommands::SubscribeMissing => subscribe::run_missing(ctx, flags).await,
        AgentCommands::Unsubscribe { key } => unsubscribe::run(key, ctx, flags).await,
    }
}
