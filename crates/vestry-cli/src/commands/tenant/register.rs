use serde::Serialize;
use vestry_core::entities::{Church, Profile};

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub struct RegisterParams<'a> {
    pub name: &'a str,
    pub denomination: Option<&'a str>,
    pub full_name: Option<&'a str>,
    pub email: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    church: Church,
    profile: Option<Profile>,
}

pub async fn run(
    params: &RegisterParams<'_>,
    ctx: &mut AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let church = ctx
        .service
        .register_church(params.name, params.denomination)
        .await?;

    let profile = match flags.user.as_deref() {
        Some(user_id) => Some(
            ctx.service
                .create_profile(user_id, params.full_name, params.email, Some(&church.id))
                .await?,
        ),
        None => None,
    };

    ctx.service.set_tenant(Some(church.id.clone()));
    output(&RegisterResponse { church, profile }, flags.format)
}
