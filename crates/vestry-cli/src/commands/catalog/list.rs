use crate::cli::GlobalFlags;
use crate::commands::shared::limit::apply_limit;
use crate::context::AppContext;
use crate::output::output;

pub async fn modules(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut modules = ctx.service.list_catalog_modules().await?;
    apply_limit(&mut modules, flags, u32::MAX);
    output(&modules, flags.format)
}

pub async fn agents(
    module: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut agents = ctx.service.list_catalog_agents(module).await?;
    apply_limit(&mut agents, flags, u32::MAX);
    output(&agents, flags.format)
}

pub async fn bundles(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut bundles = ctx.service.list_catalog_bundles().await?;
    apply_limit(&mut bundles, flags, u32::MAX);
    output(&bundles, flags.format)
}
