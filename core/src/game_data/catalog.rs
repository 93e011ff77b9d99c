//! Skill and buff reference data.
//!
//! The catalog is read-only while the engine runs. A refresh builds a whole
//! new [`Catalog`] and swaps it in through [`CatalogHandle::replace`]; readers
//! holding the old `Arc` finish with the old data.

use std::fs;
use std::io::ErrorKind;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

pub const SKILLS_FILE: &str = "skills.json";
pub const BUFFS_FILE: &str = "buffs.json";

/// One entry of `skills.json`. Keys are either numeric skill keys or raw
/// action names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillEntry {
    pub skill_name: String,
    #[serde(default)]
    pub is_exclude: bool,
}

/// One entry of `buffs.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffEntry {
    pub buff_id: i64,
    pub buff_name: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub is_exclude: bool,
    #[serde(default)]
    pub atk: Option<f64>,
    #[serde(default)]
    pub dmg: Option<f64>,
    #[serde(default)]
    pub def: Option<f64>,
    #[serde(default)]
    pub spd: Option<f64>,
}

/// Stat bonuses granted by one stack of a buff, or a sum over several.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuffEffect {
    pub atk_bonus: f64,
    pub dmg_bonus: f64,
    pub def_bonus: f64,
    pub spd_bonus: f64,
}

impl BuffEffect {
    pub fn scaled(self, stack: i32) -> Self {
        let k = stack as f64;
        Self {
            atk_bonus: self.atk_bonus * k,
            dmg_bonus: self.dmg_bonus * k,
            def_bonus: self.def_bonus * k,
            spd_bonus: self.spd_bonus * k,
        }
    }
}

impl AddAssign for BuffEffect {
    fn add_assign(&mut self, rhs: Self) {
        self.atk_bonus += rhs.atk_bonus;
        self.dmg_bonus += rhs.dmg_bonus;
        self.def_bonus += rhs.def_bonus;
        self.spd_bonus += rhs.spd_bonus;
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuffInfo {
    pub name: String,
    pub kind: Option<String>,
    pub category: Option<String>,
    pub is_exclude: bool,
    pub effect: BuffEffect,
}

impl From<BuffEntry> for BuffInfo {
    fn from(entry: BuffEntry) -> Self {
        Self {
            name: entry.buff_name,
            kind: entry.kind,
            category: entry.category,
            is_exclude: entry.is_exclude,
            effect: BuffEffect {
                atk_bonus: entry.atk.unwrap_or(0.0),
                dmg_bonus: entry.dmg.unwrap_or(0.0),
                def_bonus: entry.def.unwrap_or(0.0),
                spd_bonus: entry.spd.unwrap_or(0.0),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    skills: HashMap<String, SkillEntry>,
    buffs: HashMap<i64, BuffInfo>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load `skills.json` and `buffs.json` from `dir`. A missing file counts
    /// as empty; a missing directory is an error.
    pub fn load_dir(dir: &Path) -> Result<Self, CatalogError> {
        if !dir.is_dir() {
            return Err(CatalogError::MissingDir(dir.to_path_buf()));
        }

        let skills: HashMap<String, SkillEntry> =
            read_json(&dir.join(SKILLS_FILE))?.unwrap_or_default();
        let buffs: Vec<BuffEntry> = read_json(&dir.join(BUFFS_FILE))?.unwrap_or_default();

        let mut catalog = Self {
            skills,
            ..Default::default()
        };
        for entry in buffs {
            catalog.insert_buff(entry);
        }

        tracing::info!(
            "[CATALOG] Loaded {} skills and {} buffs from {:?}",
            catalog.skills.len(),
            catalog.buffs.len(),
            dir
        );
        Ok(catalog)
    }

    pub fn insert_skill(&mut self, key: impl Into<String>, name: impl Into<String>, exclude: bool) {
        self.skills.insert(
            key.into(),
            SkillEntry {
                skill_name: name.into(),
                is_exclude: exclude,
            },
        );
    }

    pub fn insert_buff(&mut self, entry: BuffEntry) {
        let id = entry.buff_id;
        self.buffs.insert(id, BuffInfo::from(entry));
    }

    // ─── Skills ──────────────────────────────────────────────────────────────

    /// Display name for a numeric skill key.
    pub fn skill_name(&self, key: i64) -> Option<&str> {
        self.skills
            .get(key.to_string().as_str())
            .map(|s| s.skill_name.as_str())
    }

    /// Display name for a raw action name.
    pub fn skill_name_for_action(&self, action: &str) -> Option<&str> {
        self.skills.get(action).map(|s| s.skill_name.as_str())
    }

    pub fn is_skill_excluded(&self, action: &str) -> bool {
        self.skills.get(action).is_some_and(|s| s.is_exclude)
    }

    // ─── Buffs ───────────────────────────────────────────────────────────────

    pub fn buff(&self, id: i64) -> Option<&BuffInfo> {
        self.buffs.get(&id)
    }

    pub fn has_buff(&self, id: i64) -> bool {
        self.buffs.contains_key(&id)
    }

    /// Catalog name, or the numeric id when the buff is unknown.
    pub fn buff_name(&self, id: i64) -> String {
        self.buffs
            .get(&id)
            .map(|b| b.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn is_buff_excluded(&self, id: i64) -> bool {
        self.buffs.get(&id).is_some_and(|b| b.is_exclude)
    }

    pub fn buff_effect(&self, id: i64) -> BuffEffect {
        self.buffs.get(&id).map(|b| b.effect).unwrap_or_default()
    }

    pub fn skill_count(&self) -> usize {
        self.skills.len()
    }

    pub fn buff_count(&self) -> usize {
        self.buffs.len()
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<Option<T>, CatalogError> {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("[CATALOG] {:?} not present, using empty table", path);
            return Ok(None);
        }
        Err(e) => {
            return Err(CatalogError::Io {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|e| CatalogError::Json {
            path: path.to_path_buf(),
            source: e,
        })
}

/// Shared, swappable catalog.
#[derive(Debug, Default)]
pub struct CatalogHandle {
    current: RwLock<Arc<Catalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    /// Load from `dir`, degrading to an empty catalog on any failure.
    pub fn load_or_empty(dir: Option<PathBuf>) -> Self {
        let Some(dir) = dir else {
            tracing::warn!("[CATALOG] No catalog directory configured, names fall back to ids");
            return Self::default();
        };
        match Catalog::load_dir(&dir) {
            Ok(catalog) => Self::new(catalog),
            Err(e) => {
                tracing::warn!(error = %e, "[CATALOG] Failed to load catalog, names fall back to ids");
                Self::default()
            }
        }
    }

    pub fn current(&self) -> Arc<Catalog> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, catalog: Catalog) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(catalog);
        tracing::info!(
            "[CATALOG] Replaced catalog ({} skills, {} buffs)",
            guard.skill_count(),
            guard.buff_count()
        );
    }

    /// Reload from `dir`. On failure the current catalog stays in place.
    pub fn reload(&self, dir: &Path) -> Result<(), CatalogError> {
        let catalog = Catalog::load_dir(dir)?;
        self.replace(catalog);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_buff(id: i64, name: &str, dmg: Option<f64>, exclude: bool) -> BuffEntry {
        BuffEntry {
            buff_id: id,
            buff_name: name.to_string(),
            is_exclude: exclude,
            dmg,
            ..Default::default()
        }
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("raidlens-catalog-{}-{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("create temp dir");
        dir
    }

    #[test]
    fn test_unknown_ids_fall_back_to_numbers() {
        let catalog = Catalog::new();
        assert_eq!(catalog.skill_name(123), None);
        assert_eq!(catalog.buff_name(55), "55");
        assert_eq!(catalog.buff_effect(55), BuffEffect::default());
        assert!(!catalog.is_buff_excluded(55));
    }

    #[test]
    fn test_skill_lookup_by_key_and_action() {
        let mut catalog = Catalog::new();
        catalog.insert_skill("3001", "Fireball", false);
        catalog.insert_skill("HighMage_Fireball", "Fireball", false);
        catalog.insert_skill("Common_Roll", "Roll", true);

        assert_eq!(catalog.skill_name(3001), Some("Fireball"));
        assert_eq!(catalog.skill_name_for_action("HighMage_Fireball"), Some("Fireball"));
        assert!(catalog.is_skill_excluded("Common_Roll"));
        assert!(!catalog.is_skill_excluded("HighMage_Fireball"));
    }

    #[test]
    fn test_effect_scaling_and_sum() {
        let mut total = BuffEffect::default();
        total += BuffEffect {
            dmg_bonus: 0.1,
            ..Default::default()
        }
        .scaled(3);
        total += BuffEffect {
            atk_bonus: 0.5,
            ..Default::default()
        }
        .scaled(1);
        assert!((total.dmg_bonus - 0.3).abs() < 1e-9);
        assert!((total.atk_bonus - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_load_dir_parses_both_files() {
        let dir = temp_dir("load");
        fs::write(
            dir.join(SKILLS_FILE),
            r#"{"3001": {"skillName": "Fireball", "isExclude": false}}"#,
        )
        .unwrap();
        fs::write(
            dir.join(BUFFS_FILE),
            r#"[{"buffId": 900, "buffName": "Blessing", "type": "buff", "category": "party", "isExclude": false, "dmg": 0.05}]"#,
        )
        .unwrap();

        let catalog = Catalog::load_dir(&dir).expect("load");
        assert_eq!(catalog.skill_name(3001), Some("Fireball"));
        let buff = catalog.buff(900).expect("buff");
        assert_eq!(buff.name, "Blessing");
        assert_eq!(buff.kind.as_deref(), Some("buff"));
        assert!((buff.effect.dmg_bonus - 0.05).abs() < 1e-9);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_files_are_empty_and_missing_dir_errors() {
        let dir = temp_dir("empty");
        let catalog = Catalog::load_dir(&dir).expect("load");
        assert_eq!(catalog.skill_count(), 0);
        assert_eq!(catalog.buff_count(), 0);
        let _ = fs::remove_dir_all(&dir);

        let missing = dir.join("nope");
        assert!(matches!(
            Catalog::load_dir(&missing),
            Err(CatalogError::MissingDir(_))
        ));
    }

    #[test]
    fn test_bad_json_keeps_previous_catalog() {
        let dir = temp_dir("bad");
        fs::write(dir.join(BUFFS_FILE), "not json").unwrap();

        let mut initial = Catalog::new();
        initial.insert_buff(make_buff(1, "Kept", Some(0.2), false));
        let handle = CatalogHandle::new(initial);

        assert!(matches!(handle.reload(&dir), Err(CatalogError::Json { .. })));
        assert_eq!(handle.current().buff_name(1), "Kept");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_replace_swaps_for_new_readers_only() {
        let handle = CatalogHandle::default();
        let before = handle.current();

        let mut next = Catalog::new();
        next.insert_buff(make_buff(7, "Haste", None, true));
        handle.replace(next);

        assert!(!before.has_buff(7));
        assert!(handle.current().is_buff_excluded(7));
    }
}
