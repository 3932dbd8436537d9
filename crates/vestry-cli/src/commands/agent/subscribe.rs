use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_agent_keys;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(keys: &[String], ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let keys = parse_agent_keys(keys)?;
    let report = ctx.service.subscribe_agents(&keys).await?;
    output(&report, flags.format)
}

pub async fn run_missing(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = ctx.service.subscribe_missing_agents().await?;
    output(&report, flags.format)
}
