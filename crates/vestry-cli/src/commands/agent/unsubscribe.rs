use vestry_core::ids::AgentKey;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(key: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let key: AgentKey = key.parse()?;
    let report = ctx.service.unsubscribe_agent(&key).await?;
    output(&report, flags.format)
}
