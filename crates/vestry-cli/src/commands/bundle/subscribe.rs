use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(ids: &[String], ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let reports = ctx.service.subscribe_bundles(ids).await?;
    output(&reports, flags.format)
}

pub async fn run_missing(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let reports = ctx.service.subscribe_missing_bundles().await?;
    output(&reports, flags.format)
}
