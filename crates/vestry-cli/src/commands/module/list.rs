use crate::cli::GlobalFlags;
use crate::commands::shared::limit::apply_limit;
use crate::context::AppContext;
use crate::output::output;

pub async fn held(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut subs = ctx.service.list_module_subscriptions().await?;
    apply_limit(&mut subs, flags, ctx.default_limit());
    output(&subs, flags.format)
}

pub async fn missing(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let mut missing = ctx.service.entitlement_status().await?.missing_modules;
    apply_limit(&mut missing, flags, ctx.default_limit());
    output(&missing, flags.format)
}
