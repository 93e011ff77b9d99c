//! Routes decoded events into the session ledgers.
//!
//! Damage numbers never arrive on the Attack message itself. The game first
//! reports an HP change (or the player's own damage), and the next Attack
//! against the same target claims it:
//!
//! ```text
//! HpChanged(t, 100 → 40) ──▶ pending {t, 100, 40}
//! Attack(caster → t)     ──▶ record 60 × (1 + dmg bonus), pending = None
//! Attack(caster → t)     ──▶ nothing pending, ignored
//! ```

use hashbrown::HashMap;

use super::GameSignal;
use crate::combat_log::{AttackEvent, CombatEvent, SelfDamageEvent};
use crate::encounter::SessionStart;
use crate::state::SessionCache;

/// HP drop waiting for the Attack that caused it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingDelta {
    target_id: i64,
    previous_hp: i64,
    current_hp: i64,
}

impl PendingDelta {
    fn damage(&self) -> i64 {
        self.previous_hp.saturating_sub(self.current_hp)
    }
}

/// Writer-side routing state. Only the capture thread owns one.
#[derive(Debug)]
pub struct EventProcessor {
    pending: Option<PendingDelta>,
    /// Last CurrentHp sample per target
    hp_by_target: HashMap<i64, i64>,
    self_damage_ceiling: i64,
}

impl EventProcessor {
    pub fn new(self_damage_ceiling: i64) -> Self {
        Self {
            pending: None,
            hp_by_target: HashMap::new(),
            self_damage_ceiling,
        }
    }

    /// Apply one event to the session and return the signals it raised.
    pub fn process_event(&mut self, event: CombatEvent, cache: &SessionCache) -> Vec<GameSignal> {
        let mut signals = Vec::new();

        match event {
            CombatEvent::HpChanged {
                target_id,
                previous_hp,
                current_hp,
            } => self.on_hp_sample(target_id, previous_hp, current_hp),
            CombatEvent::CurrentHp {
                target_id,
                current_hp,
            } => {
                if let Some(previous_hp) = self.hp_by_target.insert(target_id, current_hp) {
                    self.on_hp_sample(target_id, previous_hp, current_hp);
                }
            }
            CombatEvent::SelfDamage(hit) => self.on_self_damage(&hit, cache),
            CombatEvent::Attack(attack) => self.on_attack(&attack, cache, &mut signals),
            CombatEvent::Action(action) => {
                cache
                    .resolver
                    .process_action(action.user_id, &action.skill_name, action.key1);
                if let Some(count) = cache
                    .raid
                    .on_boss_skill_used(action.user_id, &action.skill_name)
                {
                    signals.push(GameSignal::BossSkillUsed {
                        boss_id: action.user_id,
                        skill_name: action.skill_name,
                        count,
                    });
                }
            }
            CombatEvent::ItemUse(item) => {
                tracing::debug!("[RAID] User {} used {}", item.user_id, item.item_name);
                signals.push(GameSignal::ItemUsed {
                    user_id: item.user_id,
                    item_name: item.item_name,
                });
            }
            CombatEvent::DieBlow(blow) => {
                if cache.raid.is_boss(blow.user_id) {
                    tracing::info!("[RAID] Boss {} finished, raid ended", blow.user_id);
                    cache.buffs.finalize_all_sessions();
                    signals.push(GameSignal::RaidEnded {
                        boss_id: blow.user_id,
                    });
                    signals.push(GameSignal::RaidRecordReady {
                        boss_id: blow.user_id,
                    });
                }
            }
            CombatEvent::BuffStart(buff) => cache.buffs.on_buff_start(&buff),
            CombatEvent::BuffUpdate(buff) => cache.buffs.on_buff_update(&buff),
            CombatEvent::BuffEnd(end) => cache.buffs.on_buff_end(&end),
            CombatEvent::BossIdentified { boss_id } => {
                if let Some(signal) = set_boss(cache, boss_id) {
                    signals.push(signal);
                }
            }
        }

        signals
    }

    /// A decrease becomes the pending delta. Any other sample for the pending
    /// target cancels it; samples for other targets leave it alone.
    fn on_hp_sample(&mut self, target_id: i64, previous_hp: i64, current_hp: i64) {
        if current_hp < previous_hp {
            self.pending = Some(PendingDelta {
                target_id,
                previous_hp,
                current_hp,
            });
        } else if self.pending.is_some_and(|p| p.target_id == target_id) {
            self.pending = None;
        }
    }

    fn on_self_damage(&mut self, hit: &SelfDamageEvent, cache: &SessionCache) {
        if hit.damage > self.self_damage_ceiling {
            tracing::warn!(
                "[COMBAT-STATE] Filtered self damage {} from user {} above ceiling",
                hit.damage,
                hit.user_id
            );
            return;
        }
        cache
            .damage
            .record_self_damage(hit.damage, hit.user_id, hit.target_id);
        self.pending = Some(PendingDelta {
            target_id: hit.target_id,
            previous_hp: hit.damage,
            current_hp: 0,
        });
    }

    fn on_attack(&mut self, attack: &AttackEvent, cache: &SessionCache, signals: &mut Vec<GameSignal>) {
        let Some(pending) = self.pending else {
            return;
        };
        if pending.target_id != attack.target_id {
            return;
        }
        let damage = pending.damage();
        if damage <= 0 {
            return;
        }

        let skill_name = cache
            .resolver
            .resolve_skill_name(attack.skill_key, attack.flags);
        let bonus = cache.buffs.calculate_current_effect(attack.caster_id).dmg_bonus;
        let amount = (damage as f64 * (1.0 + bonus)) as i64;

        let mut timed_out = false;
        cache.damage.record_damage(
            amount,
            attack.caster_id,
            attack.target_id,
            attack.flags,
            &skill_name,
            |start| match start {
                SessionStart::First => cache.on_combat_start(),
                SessionStart::TimedOut => {
                    cache.on_combat_timeout();
                    timed_out = true;
                }
            },
        );
        if timed_out {
            signals.push(GameSignal::CombatTimedOut);
        }
        self.pending = None;
    }

    /// Forget the pending delta and HP samples.
    pub fn clear(&mut self) {
        self.pending = None;
        self.hp_by_target.clear();
    }
}

/// Adopt a boss id, rebasing buff statistics when a previous boss is replaced.
pub fn set_boss(cache: &SessionCache, boss_id: i64) -> Option<GameSignal> {
    if boss_id == 0 || cache.raid.boss_id() == Some(boss_id) {
        return None;
    }
    // Rebase before the new boss is adopted.
    if cache.raid.boss_id().is_some() {
        cache.buffs.clear_buff_stats();
    }
    let transition = cache.raid.set_boss(boss_id);
    Some(GameSignal::BossChanged {
        previous: transition.previous(),
        boss_id,
    })
}
