#[path = "tenant/register.rs"]
mod register;
#[path = "tenant/show.rs"]
mod show;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::TenantCommands;
use crate::context::AppContext;

/// Handle `vestry tenant`.
pub async fn handle(
    action: &TenantCommands,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        TenantCommands::Register {
            name,
            denomination,
            full_name,
            email,
        } => {
            let params = register::RegisterParams {
                name,
                denomination: denomination.as_deref(),
                full_name: full_name.as_deref(),
                email: email.as_deref(),
            };
            register::run(&params, ctx, flags).await
        }
        TenantCommands::Show => show::run(ctx, flags).await,
    }
}
