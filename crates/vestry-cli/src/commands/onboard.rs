use vestry_core::draft::SelectionDraft;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::OnboardArgs;
use crate::commands::shared::parse::parse_agent_keys;
use crate::context::AppContext;
use crate::output::output;

/// Handle `vestry onboard`.
pub async fn handle(
    args: &OnboardArgs,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let Some(user_id) = flags.user.as_deref() else {
        anyhow::bail!("onboard requires --user");
    };
    let draft = build_draft(args)?;

    let report = if args.dry_run {
        ctx.service.plan_onboarding(user_id, &draft).await?
    } else {
        ctx.service.complete_onboarding(user_id, &draft).await?
    };
    output(&report, flags.format)
}

fn build_draft(args: &OnboardArgs) -> anyhow::Result<SelectionDraft> {
    let mut draft = SelectionDraft::new();
    for module in &args.modules {
        draft.select_module(module.as_str());
    }
    for key in parse_agent_keys(&args.agents)? {
        draft.select_agent(key);
    }
    for bundle in &args.bundles {
        draft.select_bundle(bundle.as_str());
    }
    Ok(draft)
}
