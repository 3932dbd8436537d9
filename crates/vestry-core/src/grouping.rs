//! Display grouping of catalog modules.
//!
//! Every module lands in exactly one [`ModuleGroup`], derived from its
//! catalog `category`. A category that already names a group maps to it;
//! older category labels go through one normalization table; anything else
//! falls into `community`.

use crate::entities::Module;
use crate::enums::ModuleGroup;

/// Legacy category labels and the group each one belongs to.
const CATEGORY_TO_GROUP: &[(&str, ModuleGroup)] = &[
    ("engagement", ModuleGroup::Community),
    ("volunteering", ModuleGroup::Community),
    ("communication", ModuleGroup::Community),
    ("monitoring", ModuleGroup::Community),
    ("care", ModuleGroup::Ministry),
    ("reporting", ModuleGroup::Innovation),
    ("task management", ModuleGroup::Planning),
    ("finance", ModuleGroup::Stewardship),
    ("giving", ModuleGroup::Stewardship),
    ("education", ModuleGroup::Discipleship),
    ("accounting", ModuleGroup::Accounting),
];

pub const DEFAULT_GROUP: ModuleGroup = ModuleGroup::Community;

/// Group for a raw category string. Matching is case-insensitive and ignores
/// surrounding whitespace.
#[must_use]
pub fn group_for_category(category: Option<&str>) -> ModuleGroup {
    let Some(category) = category.map(str::trim).filter(|c| !c.is_empty()) else {
        return DEFAULT_GROUP;
    };
    let normalized = category.to_lowercase();

    if let Some(group) = ModuleGroup::ALL
        .into_iter()
        .find(|g| g.as_str() == normalized)
    {
        return group;
    }

    CATEGORY_TO_GROUP
        .iter()
        .find(|(label, _)| *label == normalized)
        .map_or(DEFAULT_GROUP, |(_, group)| *group)
}

#[must_use]
pub fn group_for(module: &Module) -> ModuleGroup {
    group_for_category(module.category.as_deref())
}

/// Bucket modules by group, in canonical group order. Empty groups are
/// omitted; module order within a group follows the input.
#[must_use]
pub fn group_modules(modules: &[Module]) -> Vec<(ModuleGroup, Vec<&Module>)> {
    ModuleGroup::ALL
        .into_iter()
        .filter_map(|group| {
            let members: Vec<&Module> = modules.iter().filter(|m| group_for(m) == group).collect();
            (!members.is_empty()).then_some((group, members))
        })
        .collect()
}
