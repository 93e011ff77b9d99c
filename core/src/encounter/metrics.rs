use hashbrown::HashMap;

use crate::combat_log::DamageFlags;

/// Hit counters shared by the per-user and per-(target, user) aggregates.
///
/// DOT hits add to `total` only; every other counter tracks direct hits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageCounters {
    pub total: i64,
    pub hit_count: u32,
    pub crit: u32,
    pub add_hit: u32,
    pub power: u32,
    pub fast: u32,
}

impl DamageCounters {
    pub fn can_absorb(&self, amount: i64) -> bool {
        self.total.checked_add(amount).is_some()
    }

    pub fn apply(&mut self, amount: i64, flags: DamageFlags) {
        self.total += amount;
        if flags.is_dot() {
            return;
        }
        self.hit_count = self.hit_count.saturating_add(1);
        if flags.is_crit() {
            self.crit = self.crit.saturating_add(1);
        }
        if flags.is_add_hit() {
            self.add_hit = self.add_hit.saturating_add(1);
        }
        if flags.is_power() {
            self.power = self.power.saturating_add(1);
        }
        if flags.is_fast() {
            self.fast = self.fast.saturating_add(1);
        }
    }
}

/// Per-skill totals, split into direct and DOT damage.
///
/// `min_damage`/`min_dot` start at `i64::MAX` until a hit of that kind lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillTotals {
    pub total: i64,
    pub hit_count: u32,
    pub crit: u32,
    pub add_hit: u32,
    pub power: u32,
    pub fast: u32,
    pub max_damage: i64,
    pub min_damage: i64,

    // ─── DOT ─────────────────────────────────────────────────────────────────
    pub dot: i64,
    pub dot_count: u32,
    pub max_dot: i64,
    pub min_dot: i64,
}

impl Default for SkillTotals {
    fn default() -> Self {
        Self {
            total: 0,
            hit_count: 0,
            crit: 0,
            add_hit: 0,
            power: 0,
            fast: 0,
            max_damage: 0,
            min_damage: i64::MAX,
            dot: 0,
            dot_count: 0,
            max_dot: 0,
            min_dot: i64::MAX,
        }
    }
}

impl SkillTotals {
    pub fn can_absorb(&self, amount: i64) -> bool {
        self.total.checked_add(amount).is_some() && self.dot.checked_add(amount).is_some()
    }

    pub fn apply(&mut self, amount: i64, flags: DamageFlags) {
        self.total += amount;

        if flags.is_dot() {
            self.dot += amount;
            self.dot_count = self.dot_count.saturating_add(1);
            self.max_dot = self.max_dot.max(amount);
            self.min_dot = self.min_dot.min(amount);
            return;
        }

        self.hit_count = self.hit_count.saturating_add(1);
        self.max_damage = self.max_damage.max(amount);
        self.min_damage = self.min_damage.min(amount);
        if flags.is_crit() {
            self.crit = self.crit.saturating_add(1);
        }
        if flags.is_add_hit() {
            self.add_hit = self.add_hit.saturating_add(1);
        }
        if flags.is_power() {
            self.power = self.power.saturating_add(1);
        }
        if flags.is_fast() {
            self.fast = self.fast.saturating_add(1);
        }
    }

    /// Largest hit of either kind.
    pub fn combined_max(&self) -> i64 {
        self.max_damage.max(self.max_dot)
    }

    /// Smallest hit of either kind, 0 if nothing landed.
    pub fn combined_min(&self) -> i64 {
        let min = self.min_damage.min(self.min_dot);
        if min == i64::MAX { 0 } else { min }
    }

    pub fn dot_min(&self) -> i64 {
        if self.min_dot == i64::MAX { 0 } else { self.min_dot }
    }
}

/// One user's totals for one skill, overall and per target.
#[derive(Debug, Clone, Default)]
pub struct SkillDetail {
    pub totals: SkillTotals,
    pub by_target: HashMap<i64, SkillTotals>,
}

impl SkillDetail {
    pub fn can_absorb(&self, target_id: i64, amount: i64) -> bool {
        self.totals.can_absorb(amount)
            && self
                .by_target
                .get(&target_id)
                .is_none_or(|t| t.can_absorb(amount))
    }

    pub fn apply(&mut self, target_id: i64, amount: i64, flags: DamageFlags) {
        self.totals.apply(amount, flags);
        self.by_target.entry(target_id).or_default().apply(amount, flags);
    }
}

/// Everything dealt to one target, with the per-user split.
#[derive(Debug, Clone, Default)]
pub struct TargetDamage {
    pub total: i64,
    pub by_user: HashMap<i64, DamageCounters>,
}

impl TargetDamage {
    pub fn can_absorb(&self, user_id: i64, amount: i64) -> bool {
        self.total.checked_add(amount).is_some()
            && self
                .by_user
                .get(&user_id)
                .is_none_or(|c| c.can_absorb(amount))
    }

    pub fn apply(&mut self, user_id: i64, amount: i64, flags: DamageFlags) {
        self.total += amount;
        self.by_user.entry(user_id).or_default().apply(amount, flags);
    }
}

/// Damage feeding the DPS figures for one user.
#[derive(Debug, Clone, Default)]
pub struct DpsTotals {
    pub total: i64,
    pub by_target: HashMap<i64, i64>,
}

impl DpsTotals {
    pub fn can_absorb(&self, target_id: i64, amount: i64) -> bool {
        self.total.checked_add(amount).is_some()
            && self
                .by_target
                .get(&target_id)
                .is_none_or(|t| t.checked_add(amount).is_some())
    }

    pub fn apply(&mut self, target_id: i64, amount: i64) {
        self.total += amount;
        *self.by_target.entry(target_id).or_default() += amount;
    }
}
