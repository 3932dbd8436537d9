use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let church_id = ctx.service.require_tenant()?;
    let church = ctx.service.get_church(church_id).await?;
    output(&church, flags.format)
}
