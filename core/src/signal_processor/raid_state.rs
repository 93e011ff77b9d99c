//! Raid state machine.
//!
//! ```text
//! NoBoss ──BossIdentified(id)──▶ BossActive(id) ──BossIdentified(new)──▶ BossActive(new)
//! ```
//!
//! The buff rebase that accompanies a boss change belongs to the caller;
//! this type only tracks the boss and its skill use counts.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;

/// Boss id 0 means no boss.
const NO_BOSS: i64 = 0;

/// Outcome of [`RaidState::set_boss`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossTransition {
    Unchanged,
    First,
    Changed { previous: i64 },
}

impl BossTransition {
    pub fn previous(self) -> Option<i64> {
        match self {
            BossTransition::Changed { previous } => Some(previous),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RaidState {
    boss_id: AtomicI64,
    skill_counts: DashMap<String, u64>,
}

impl RaidState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn boss_id(&self) -> Option<i64> {
        match self.boss_id.load(Ordering::Acquire) {
            NO_BOSS => None,
            id => Some(id),
        }
    }

    pub fn is_boss(&self, id: i64) -> bool {
        id != NO_BOSS && self.boss_id.load(Ordering::Acquire) == id
    }

    /// Adopt `boss_id`, resetting the skill counts unless it is already current.
    pub fn set_boss(&self, boss_id: i64) -> BossTransition {
        let previous = self.boss_id.swap(boss_id, Ordering::AcqRel);
        if previous == boss_id {
            return BossTransition::Unchanged;
        }
        self.skill_counts.clear();
        tracing::info!("[RAID] Boss changed {} -> {}", previous, boss_id);
        if previous == NO_BOSS {
            BossTransition::First
        } else {
            BossTransition::Changed { previous }
        }
    }

    /// Count one use of `skill_name` when `actor_id` is the boss. Returns the
    /// new count, or `None` when the actor is not the boss.
    pub fn on_boss_skill_used(&self, actor_id: i64, skill_name: &str) -> Option<u64> {
        if !self.is_boss(actor_id) {
            return None;
        }
        let mut count = self.skill_counts.entry(skill_name.to_string()).or_insert(0);
        *count += 1;
        tracing::debug!("[RAID] Boss skill {} used ({})", skill_name, *count);
        Some(*count)
    }

    pub fn skill_counts(&self) -> BTreeMap<String, u64> {
        self.skill_counts
            .iter()
            .map(|e| (e.key().clone(), *e.value()))
            .collect()
    }

    pub fn clear(&self) {
        self.boss_id.store(NO_BOSS, Ordering::Release);
        self.skill_counts.clear();
    }
}
