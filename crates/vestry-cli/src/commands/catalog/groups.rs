use serde::Serialize;
use vestry_core::enums::ModuleGroup;
use vestry_core::grouping::group_modules;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct GroupRow {
    group: ModuleGroup,
    label: &'static str,
    modules: Vec<String>,
}

pub async fn run(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let modules = ctx.service.list_catalog_modules().await?;
    let rows: Vec<GroupRow> = group_modules(&modules)
        .into_iter()
        .map(|(group, members)| GroupRow {
            group,
            label: group.label(),
            modules: members.iter().map(|m| m.module_name.clone()).collect(),
        })
        .collect();
    output(&rows, flags.format)
}
