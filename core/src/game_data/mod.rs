//! Reference data: skill/buff catalog, job keywords, skill name resolution.

mod catalog;
mod jobs;
mod skill_names;

pub use catalog::{
    BUFFS_FILE, BuffEffect, BuffEntry, BuffInfo, Catalog, CatalogHandle, SKILLS_FILE, SkillEntry,
};
pub use jobs::job_from_action;
pub use skill_names::{SkillNameResolver, synthesized_name};
