use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vestry billing`.
pub async fn handle(ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let summary = ctx.service.billing_summary().await?;
    output(&summary, flags.format)
}
