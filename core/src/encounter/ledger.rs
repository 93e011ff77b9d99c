//! Damage aggregates for the current combat session.
//!
//! ```text
//! record_damage(amount, user, target, flags, skill)
//!     │
//!     ├─ empty window?    → begin session, on_session_start(First)
//!     ├─ idle > timeout?  → clear everything, begin session, on_session_start(TimedOut)
//!     ├─ any aggregate would overflow? → drop the hit
//!     ├─ timing.extend(target)
//!     └─ by_user / by_target[user] / by_user_skill[skill][target] / dps
//! ```
//!
//! The capture thread is the only writer. Snapshot readers go through the
//! same `DashMap`s and atomics without blocking it.

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use hashbrown::HashMap;
use raidlens_types::CombatSettings;

use super::metrics::{DamageCounters, DpsTotals, SkillDetail, TargetDamage};
use super::timing::{SessionTiming, TimeWindow};
use crate::combat_log::DamageFlags;
use crate::context::{IStr, SharedClock, intern};

/// Why a hit opened a new combat session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStart {
    /// First hit on an empty window.
    First,
    /// The previous session idled past the combat timeout; aggregates were
    /// cleared before the hit.
    TimedOut,
}

pub struct DamageLedger {
    clock: SharedClock,
    timeout_ms: i64,
    self_damage_ceiling: i64,

    by_user: DashMap<i64, DamageCounters>,
    by_target: DashMap<i64, TargetDamage>,
    by_user_skill: DashMap<i64, HashMap<IStr, SkillDetail>>,
    dps: DashMap<i64, DpsTotals>,
    timing: SessionTiming,

    // ─── Self damage ─────────────────────────────────────────────────────────
    self_damage: DashMap<i64, i64>,
    /// User with the highest self damage; that user is "self".
    top_self_id: AtomicI64,
    top_self_total: AtomicI64,
}

impl DamageLedger {
    pub fn new(clock: SharedClock, settings: CombatSettings) -> Self {
        Self {
            clock,
            timeout_ms: settings.timeout_ms,
            self_damage_ceiling: settings.self_damage_ceiling,
            by_user: DashMap::new(),
            by_target: DashMap::new(),
            by_user_skill: DashMap::new(),
            dps: DashMap::new(),
            timing: SessionTiming::new(),
            self_damage: DashMap::new(),
            top_self_id: AtomicI64::new(0),
            top_self_total: AtomicI64::new(0),
        }
    }

    /// Record one attributed hit. Returns whether it was applied.
    ///
    /// `on_session_start` runs when the hit opens a new session, before the
    /// hit is applied.
    pub fn record_damage(
        &self,
        amount: i64,
        user_id: i64,
        target_id: i64,
        flags: DamageFlags,
        skill_name: &str,
        on_session_start: impl FnOnce(SessionStart),
    ) -> bool {
        if amount <= 0 || user_id <= 0 || target_id <= 0 {
            tracing::debug!(
                "[COMBAT-STATE] Rejected hit amount={} user={} target={}",
                amount,
                user_id,
                target_id
            );
            return false;
        }

        let now = self.clock.now_millis();
        let last = self.timing.last_activity();
        if last == 0 {
            self.timing.begin(now);
            on_session_start(SessionStart::First);
        } else if now - last > self.timeout_ms {
            tracing::info!(
                "[COMBAT-STATE] Combat timeout after {}ms idle, resetting damage statistics",
                now - last
            );
            self.clear_aggregates();
            self.timing.begin(now);
            on_session_start(SessionStart::TimedOut);
        }

        let skill = intern(skill_name);
        if !self.can_absorb(amount, user_id, target_id, skill) {
            tracing::warn!(
                "[COMBAT-STATE] Dropped hit of {} from user {}: aggregate would overflow",
                amount,
                user_id
            );
            return false;
        }

        self.timing.extend(target_id, now);
        self.by_user.entry(user_id).or_default().apply(amount, flags);
        self.by_target
            .entry(target_id)
            .or_default()
            .apply(user_id, amount, flags);
        self.by_user_skill
            .entry(user_id)
            .or_default()
            .entry(skill)
            .or_default()
            .apply(target_id, amount, flags);
        self.dps.entry(user_id).or_default().apply(target_id, amount);
        true
    }

    fn can_absorb(&self, amount: i64, user_id: i64, target_id: i64, skill: IStr) -> bool {
        let user_ok = self
            .by_user
            .get(&user_id)
            .is_none_or(|c| c.can_absorb(amount));
        let target_ok = self
            .by_target
            .get(&target_id)
            .is_none_or(|t| t.can_absorb(user_id, amount));
        let skill_ok = self.by_user_skill.get(&user_id).is_none_or(|skills| {
            skills
                .get(&skill)
                .is_none_or(|d| d.can_absorb(target_id, amount))
        });
        let dps_ok = self
            .dps
            .get(&user_id)
            .is_none_or(|d| d.can_absorb(target_id, amount));
        user_ok && target_ok && skill_ok && dps_ok
    }

    /// Record damage the game reported against the player's own output.
    /// Does not touch session timing.
    pub fn record_self_damage(&self, amount: i64, user_id: i64, target_id: i64) -> bool {
        if amount <= 0 || amount > self.self_damage_ceiling || user_id <= 0 {
            tracing::debug!(
                "[COMBAT-STATE] Rejected self damage amount={} user={} target={}",
                amount,
                user_id,
                target_id
            );
            return false;
        }

        let total = {
            let mut entry = self.self_damage.entry(user_id).or_insert(0);
            let Some(next) = entry.checked_add(amount) else {
                return false;
            };
            *entry = next;
            next
        };

        if self.top_self_total.load(Ordering::Acquire) < total {
            self.top_self_id.store(user_id, Ordering::Release);
            self.top_self_total.store(total, Ordering::Release);
        }
        true
    }

    fn clear_aggregates(&self) {
        self.by_user.clear();
        self.by_target.clear();
        self.by_user_skill.clear();
        self.dps.clear();
        self.self_damage.clear();
        self.top_self_id.store(0, Ordering::Release);
        self.top_self_total.store(0, Ordering::Release);
    }

    /// Drop every aggregate and the session window.
    pub fn clear_all(&self) {
        self.clear_aggregates();
        self.timing.clear();
    }

    // ─── Reads ───────────────────────────────────────────────────────────────

    /// The local player: whoever has taken the most self damage. 0 if unknown.
    pub fn self_user_id(&self) -> i64 {
        self.top_self_id.load(Ordering::Acquire)
    }

    pub fn self_damage_total(&self, user_id: i64) -> i64 {
        self.self_damage.get(&user_id).map(|v| *v).unwrap_or(0)
    }

    pub fn user_counters(&self, user_id: i64) -> Option<DamageCounters> {
        self.by_user.get(&user_id).map(|c| *c)
    }

    /// Total damage dealt to `target_id` by everyone.
    pub fn target_total(&self, target_id: i64) -> i64 {
        self.by_target.get(&target_id).map(|t| t.total).unwrap_or(0)
    }

    /// Per-target counters for one user.
    pub fn user_targets(&self, user_id: i64) -> Vec<(i64, DamageCounters)> {
        self.by_target
            .iter()
            .filter_map(|t| t.by_user.get(&user_id).map(|c| (*t.key(), *c)))
            .collect()
    }

    pub fn user_skills(&self, user_id: i64) -> Vec<(IStr, SkillDetail)> {
        self.by_user_skill
            .get(&user_id)
            .map(|skills| skills.iter().map(|(k, v)| (*k, v.clone())).collect())
            .unwrap_or_default()
    }

    pub fn dps_total(&self, user_id: i64) -> i64 {
        self.dps.get(&user_id).map(|d| d.total).unwrap_or(0)
    }

    pub fn window(&self) -> TimeWindow {
        self.timing.window()
    }

    pub fn target_window(&self, target_id: i64) -> Option<TimeWindow> {
        self.timing.target_window(target_id)
    }
}
