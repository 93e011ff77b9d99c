//! Buff tracking
//!
//! Follows buff instances through start/update/end and keeps per-user
//! statistics for the buffs each user cast and received. Two reset
//! policies exist side by side:
//!
//! - [`BuffTracker::clear_buff_stats`] rebases: statistics are wiped, live
//!   instances survive and restart their sessions at "now".
//! - [`BuffTracker::clear_all`] drops instances and statistics alike.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use dashmap::DashMap;
use raidlens_types::{BuffStats, BuffSummaryInfo, UserBuffStats, UserBuffSummary};

use super::active::{BuffInstance, BuffRole};
use crate::combat_log::{BuffEndEvent, BuffEvent};
use crate::context::SharedClock;
use crate::game_data::{BuffEffect, CatalogHandle};

/// Share of the combat window covered by `stats.total_duration`, capped at
/// 100. Zero when the window is unset or empty.
pub fn calculate_uptime(stats: &BuffStats, combat_start: i64, combat_end: i64) -> f64 {
    if combat_start <= 0 || combat_end <= combat_start {
        return 0.0;
    }
    let window = (combat_end - combat_start) as f64;
    (stats.total_duration as f64 / window * 100.0).min(100.0)
}

fn close_session(stats: &mut BuffStats, now: i64) {
    if stats.has_open_session() {
        stats.total_duration += now - stats.current_session_start;
        stats.current_session_start = 0;
        stats.current_stack = 0;
    }
}

fn push_stack(stats: &mut BuffStats, stack: i32) {
    stats.current_stack = stack;
    stats.max_stack = stats.max_stack.max(stack);
    stats.total_stack_sum += i64::from(stack);
    if stats.total_count > 0 {
        stats.avg_stack = stats.total_stack_sum as f64 / stats.total_count as f64;
    }
}

pub struct BuffTracker {
    catalog: Arc<CatalogHandle>,
    clock: SharedClock,

    /// Live instances by instance key
    active: DashMap<String, BuffInstance>,

    // ─── Indexes ─────────────────────────────────────────────────────────────
    /// Caster id -> instance keys
    by_caster: DashMap<i64, HashSet<String>>,
    /// Target id -> instance keys
    by_target: DashMap<i64, HashSet<String>>,

    user_stats: DashMap<i64, UserBuffStats>,
}

impl BuffTracker {
    pub fn new(catalog: Arc<CatalogHandle>, clock: SharedClock) -> Self {
        Self {
            catalog,
            clock,
            active: DashMap::new(),
            by_caster: DashMap::new(),
            by_target: DashMap::new(),
            user_stats: DashMap::new(),
        }
    }

    // ─── Event Handling ──────────────────────────────────────────────────────

    pub fn on_buff_start(&self, event: &BuffEvent) {
        if self.catalog.current().is_buff_excluded(event.buff_id) {
            tracing::debug!("[BUFF] Ignoring excluded buff {}", event.buff_id);
            return;
        }

        let now = self.clock.now_millis();
        if let Some((_, previous)) = self.active.remove(&event.instance_key) {
            self.close_instance_sessions(&previous, now);
            self.unindex(&previous);
        }

        let instance = BuffInstance::from_event(event, now);
        self.index(&instance);
        self.record_start(&instance, now);

        tracing::debug!(
            "[BUFF] Started {} (stack {}) from {} on {}",
            instance.buff_id,
            instance.stack,
            instance.caster_id,
            instance.target_id
        );
        self.active.insert(instance.instance_key.clone(), instance);
    }

    pub fn on_buff_update(&self, event: &BuffEvent) {
        let now = self.clock.now_millis();
        let snapshot = {
            let Some(mut instance) = self.active.get_mut(&event.instance_key) else {
                return;
            };
            instance.stack = event.stack;
            instance.last_updated_at = now;
            if instance.target_id != event.target_id {
                let key = instance.instance_key.clone();
                if let Some(mut keys) = self.by_target.get_mut(&instance.target_id) {
                    keys.remove(&key);
                }
                self.by_target.entry(event.target_id).or_default().insert(key);
                instance.target_id = event.target_id;
            }
            instance.clone()
        };

        for (subject, role) in snapshot.subjects() {
            let Some(mut user) = self.user_stats.get_mut(&subject) else {
                continue;
            };
            let Some(stats) = Self::role_map(&mut user, role).get_mut(&snapshot.buff_id) else {
                continue;
            };
            stats.total_count += 1;
            stats.update_count += 1;
            push_stack(stats, snapshot.stack);
            stats.last_applied_time = now;
        }
    }

    pub fn on_buff_end(&self, event: &BuffEndEvent) {
        let Some((_, instance)) = self.active.remove(&event.instance_key) else {
            return;
        };
        let now = self.clock.now_millis();
        self.close_instance_sessions(&instance, now);
        self.unindex(&instance);
        tracing::debug!(
            "[BUFF] Ended {} after {}ms",
            instance.buff_id,
            now - instance.started_at
        );
    }

    // ─── Effects ─────────────────────────────────────────────────────────────

    /// Summed `effect × stack` over every live instance on `target_id`.
    pub fn calculate_current_effect(&self, target_id: i64) -> BuffEffect {
        let mut total = BuffEffect::default();
        let Some(keys) = self.by_target.get(&target_id) else {
            return total;
        };
        let catalog = self.catalog.current();
        for key in keys.iter() {
            if let Some(instance) = self.active.get(key) {
                total += catalog.buff_effect(instance.buff_id).scaled(instance.stack);
            }
        }
        total
    }

    // ─── Resets ──────────────────────────────────────────────────────────────

    /// Wipe statistics but keep live instances, restarting their sessions now.
    pub fn clear_buff_stats(&self) {
        let now = self.clock.now_millis();
        self.user_stats.clear();

        let mut rebased = 0usize;
        for mut instance in self.active.iter_mut() {
            instance.started_at = now;
            instance.last_updated_at = now;
            self.record_start(&instance, now);
            rebased += 1;
        }
        tracing::info!("[BUFF] Cleared buff statistics, rebased {} active buffs", rebased);
    }

    /// Close every open session without removing instances.
    pub fn finalize_all_sessions(&self) {
        let now = self.clock.now_millis();
        for mut entry in self.user_stats.iter_mut() {
            let user = &mut *entry;
            for stats in user
                .cast_buff_stats
                .values_mut()
                .chain(user.received_buff_stats.values_mut())
            {
                close_session(stats, now);
            }
            user.last_update_time = now;
        }
        tracing::info!("[BUFF] Finalized all open buff sessions");
    }

    pub fn clear_all(&self) {
        self.active.clear();
        self.by_caster.clear();
        self.by_target.clear();
        self.user_stats.clear();
        tracing::info!("[BUFF] Cleared all buff data");
    }

    // ─── Views ───────────────────────────────────────────────────────────────

    /// Copy of `user_id`'s statistics with open sessions counted up to now
    /// and uptime filled in. The stored statistics are not changed.
    pub fn user_buff_stats_with_uptime(
        &self,
        user_id: i64,
        combat_start: i64,
        combat_end: i64,
    ) -> Option<UserBuffStats> {
        let mut view = self.user_stats.get(&user_id)?.clone();
        let now = self.clock.now_millis();
        for stats in view
            .cast_buff_stats
            .values_mut()
            .chain(view.received_buff_stats.values_mut())
        {
            if stats.has_open_session() {
                stats.total_duration += now - stats.current_session_start;
            }
            stats.uptime_percent = calculate_uptime(stats, combat_start, combat_end);
        }
        Some(view)
    }

    /// Copy of `user_id`'s statistics restricted to catalogued buffs.
    pub fn user_buff_stats_filtered(&self, user_id: i64) -> Option<UserBuffStats> {
        let mut view = self.user_stats.get(&user_id)?.clone();
        let catalog = self.catalog.current();
        view.cast_buff_stats.retain(|id, _| catalog.has_buff(*id));
        view.received_buff_stats.retain(|id, _| catalog.has_buff(*id));
        Some(view)
    }

    pub fn user_buff_summary(&self, user_id: i64) -> UserBuffSummary {
        let Some(user) = self.user_stats.get(&user_id) else {
            return UserBuffSummary::empty(user_id);
        };
        UserBuffSummary {
            user_id,
            last_update_time: user.last_update_time,
            cast_buffs_summary: user.cast_buff_stats.values().map(BuffSummaryInfo::from).collect(),
            received_buffs_summary: user
                .received_buff_stats
                .values()
                .map(BuffSummaryInfo::from)
                .collect(),
        }
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn active_instance(&self, instance_key: &str) -> Option<BuffInstance> {
        self.active.get(instance_key).map(|i| i.clone())
    }

    /// Instance keys cast by `caster_id`.
    pub fn cast_by(&self, caster_id: i64) -> Vec<String> {
        self.by_caster
            .get(&caster_id)
            .map(|keys| keys.iter().cloned().collect())
            .unwrap_or_default()
    }

    // ─── Internals ───────────────────────────────────────────────────────────

    fn role_map(user: &mut UserBuffStats, role: BuffRole) -> &mut BTreeMap<i64, BuffStats> {
        match role {
            BuffRole::Cast => &mut user.cast_buff_stats,
            BuffRole::Received => &mut user.received_buff_stats,
        }
    }

    /// Start bookkeeping for both subjects of `instance`.
    fn record_start(&self, instance: &BuffInstance, now: i64) {
        let catalog = self.catalog.current();
        for (subject, role) in instance.subjects() {
            let mut user = self
                .user_stats
                .entry(subject)
                .or_insert_with(|| UserBuffStats::empty(subject));
            let stats = Self::role_map(&mut user, role)
                .entry(instance.buff_id)
                .or_insert_with(|| BuffStats::new(instance.buff_id, catalog.buff_name(instance.buff_id)));

            stats.total_count += 1;
            stats.start_count += 1;
            push_stack(stats, instance.stack);
            if stats.first_applied_time <= 0 {
                stats.first_applied_time = now;
            }
            stats.last_applied_time = now;
            stats.current_session_start = instance.started_at;
            user.last_update_time = now;
        }
    }

    fn close_instance_sessions(&self, instance: &BuffInstance, now: i64) {
        for (subject, role) in instance.subjects() {
            if let Some(mut user) = self.user_stats.get_mut(&subject)
                && let Some(stats) = Self::role_map(&mut user, role).get_mut(&instance.buff_id)
            {
                close_session(stats, now);
            }
        }
    }

    fn index(&self, instance: &BuffInstance) {
        self.by_caster
            .entry(instance.caster_id)
            .or_default()
            .insert(instance.instance_key.clone());
        self.by_target
            .entry(instance.target_id)
            .or_default()
            .insert(instance.instance_key.clone());
    }

    fn unindex(&self, instance: &BuffInstance) {
        for (index, id) in [
            (&self.by_caster, instance.caster_id),
            (&self.by_target, instance.target_id),
        ] {
            index.remove_if_mut(&id, |_, keys| {
                keys.remove(&instance.instance_key);
                keys.is_empty()
            });
        }
    }
}
