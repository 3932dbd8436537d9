use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(names: &[String], ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = ctx.service.subscribe_modules(names).await?;
    output(&report, flags.format)
}

pub async fn run_missing(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let report = ctx.service.subscribe_missing_modules().await?;
    output(&report, flags.format)
}
