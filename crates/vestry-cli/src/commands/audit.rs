use vestry_core::enums::{AuditAction, EntitlementKind};
use vestry_db::repos::audit::AuditFilter;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::limit::row_limit;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vestry audit`.
pub async fn handle(
    args: &AuditArgs,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = build_filter(args, row_limit(flags, ctx.default_limit()))?;
    let entries = ctx.service.query_audit(&filter).await?;
    output(&entries, flags.format)
}

fn build_filter(args: &AuditArgs, limit: u32) -> anyhow::Result<AuditFilter> {
    Ok(AuditFilter {
        kind: args
            .kind
            .as_deref()
            .map(|value| parse_enum::<EntitlementKind>(value, "kind"))
            .transpose()?,
        entity_key: args.key.clone(),
        action: args
            .action
            .as_deref()
            .map(|value| parse_enum::<AuditAction>(value, "action"))
            .transpose()?,
        limit: Some(limit),
    })
}
