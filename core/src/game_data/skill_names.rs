//! Skill name resolution and per-user job mapping.
//!
//! Attacks only carry a numeric skill key. Names come from the catalog
//! first, then from keys learned off Action messages, and finally the key
//! itself. Keyless hits get a synthesized `(dot)` / `(special)` label built
//! from their element flags.

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;

use super::catalog::CatalogHandle;
use super::jobs::job_from_action;
use crate::combat_log::DamageFlags;

const DOT_PREFIX: &str = "(dot)";
const SPECIAL_PREFIX: &str = "(special)";
const NO_ELEMENT: &str = "no-element";

/// Label for a hit with no skill key, e.g. `"(dot) bleed, fire"`.
pub fn synthesized_name(flags: DamageFlags) -> String {
    let mut name = String::from(if flags.is_dot() { DOT_PREFIX } else { SPECIAL_PREFIX });
    let mut any = false;
    for element in flags.elements() {
        if any {
            name.push(',');
        }
        name.push(' ');
        name.push_str(element);
        any = true;
    }
    if !any {
        name.push(' ');
        name.push_str(NO_ELEMENT);
    }
    name
}

pub struct SkillNameResolver {
    catalog: Arc<CatalogHandle>,
    /// skill key → name, learned from Action messages
    learned: DashMap<i64, String>,
    /// user id → job, set once per user
    jobs: DashMap<i64, &'static str>,
}

impl SkillNameResolver {
    pub fn new(catalog: Arc<CatalogHandle>) -> Self {
        Self {
            catalog,
            learned: DashMap::new(),
            jobs: DashMap::new(),
        }
    }

    pub fn resolve_skill_name(&self, skill_key: i64, flags: DamageFlags) -> String {
        if skill_key == 0 {
            return synthesized_name(flags);
        }
        if let Some(name) = self.catalog.current().skill_name(skill_key) {
            return name.to_string();
        }
        if let Some(name) = self.learned.get(&skill_key) {
            return name.value().clone();
        }
        skill_key.to_string()
    }

    /// Learn from one Action message.
    pub fn process_action(&self, user_id: i64, action_name: &str, skill_key: i64) {
        if skill_key != 0 && !self.learned.contains_key(&skill_key) {
            let catalog = self.catalog.current();
            if !catalog.is_skill_excluded(action_name) {
                let name = catalog
                    .skill_name_for_action(action_name)
                    .unwrap_or(action_name)
                    .to_string();
                tracing::debug!("[SKILL] Learned key {} -> {}", skill_key, name);
                self.learned.insert(skill_key, name);
            }
        }

        if let Some(job) = job_from_action(action_name) {
            self.jobs.entry(user_id).or_insert_with(|| {
                tracing::debug!("[SKILL] User {} mapped to job {}", user_id, job);
                job
            });
        }
    }

    pub fn job_for(&self, user_id: i64) -> Option<&'static str> {
        self.jobs.get(&user_id).map(|j| *j)
    }

    pub fn party_jobs(&self) -> BTreeMap<i64, String> {
        self.jobs
            .iter()
            .map(|e| (*e.key(), e.value().to_string()))
            .collect()
    }

    pub fn clear_jobs(&self) {
        self.jobs.clear();
    }

    /// Forget learned keys and jobs.
    pub fn clear_all(&self) {
        self.learned.clear();
        self.jobs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat_log::DamageFlag;
    use crate::game_data::Catalog;

    fn make_resolver() -> SkillNameResolver {
        let mut catalog = Catalog::new();
        catalog.insert_skill("100", "Catalog Strike", false);
        catalog.insert_skill("HighMage_Fireball", "Fireball", false);
        catalog.insert_skill("Common_Roll", "Roll", true);
        SkillNameResolver::new(Arc::new(CatalogHandle::new(catalog)))
    }

    #[test]
    fn test_catalog_then_learned_then_numeric() {
        let resolver = make_resolver();
        let none = DamageFlags::default();

        assert_eq!(resolver.resolve_skill_name(100, none), "Catalog Strike");
        assert_eq!(resolver.resolve_skill_name(200, none), "200");

        resolver.process_action(1, "HighMage_Fireball", 200);
        assert_eq!(resolver.resolve_skill_name(200, none), "Fireball");

        // Catalog wins over a learned name for the same key.
        resolver.process_action(1, "Something_Else", 100);
        assert_eq!(resolver.resolve_skill_name(100, none), "Catalog Strike");
    }

    #[test]
    fn test_first_learned_name_sticks() {
        let resolver = make_resolver();
        resolver.process_action(1, "Raw_Action_A", 300);
        resolver.process_action(1, "Raw_Action_B", 300);
        assert_eq!(resolver.resolve_skill_name(300, DamageFlags::default()), "Raw_Action_A");
    }

    #[test]
    fn test_excluded_action_not_learned() {
        let resolver = make_resolver();
        resolver.process_action(1, "Common_Roll", 400);
        assert_eq!(resolver.resolve_skill_name(400, DamageFlags::default()), "400");
    }

    #[test]
    fn test_synthesized_names() {
        let dot = DamageFlags::from_flags(&[
            DamageFlag::Dot,
            DamageFlag::Dot2,
            DamageFlag::Dot3,
            DamageFlag::Bleed,
            DamageFlag::Fire,
        ]);
        assert_eq!(synthesized_name(dot), "(dot) bleed, fire");

        let dot4 = DamageFlags::from_flags(&[DamageFlag::Dot4]);
        assert_eq!(synthesized_name(dot4), "(dot) no-element");

        let special = DamageFlags::from_flags(&[DamageFlag::Ice]);
        assert_eq!(synthesized_name(special), "(special) ice");

        let resolver = make_resolver();
        assert_eq!(resolver.resolve_skill_name(0, special), "(special) ice");
    }

    #[test]
    fn test_job_set_once() {
        let resolver = make_resolver();
        resolver.process_action(7, "HighMage_Fireball", 0);
        resolver.process_action(7, "Bard_Song", 0);
        assert_eq!(resolver.job_for(7), Some("Mage"));
        assert_eq!(resolver.party_jobs().get(&7).map(String::as_str), Some("Mage"));

        resolver.clear_jobs();
        assert_eq!(resolver.job_for(7), None);
    }
}
