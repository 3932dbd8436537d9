use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vestry status`.
pub async fn handle(ctx: &mut AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let status = ctx.service.entitlement_status().await?;
    output(&status, flags.format)
}
