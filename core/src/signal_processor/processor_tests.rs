//! Tests for event routing
//!
//! Drives the processor with decoded events and checks the session ledgers
//! and emitted signals.

use std::sync::Arc;

use raidlens_types::CombatSettings;

use super::{EventProcessor, GameSignal};
use crate::combat_log::{
    ActionEvent, AttackEvent, BuffEndEvent, BuffEvent, CombatEvent, DamageFlag, DamageFlags, DieBlowEvent,
    ItemUseEvent, SelfDamageEvent,
};
use crate::context::ManualClock;
use crate::game_data::{BuffEntry, Catalog, CatalogHandle};
use crate::state::SessionCache;

const T0: i64 = 1_700_000_000_000;
const PLAYER: i64 = 1;
const BOSS: i64 = 900;
const FURY: i64 = 77;

struct Fixture {
    processor: EventProcessor,
    cache: SessionCache,
    clock: Arc<ManualClock>,
}

impl Fixture {
    fn send(&mut self, event: CombatEvent) -> Vec<GameSignal> {
        self.processor.process_event(event, &self.cache)
    }

    fn total(&self) -> i64 {
        self.cache
            .damage
            .user_counters(PLAYER)
            .map(|c| c.total)
            .unwrap_or(0)
    }
}

fn make_fixture() -> Fixture {
    let mut catalog = Catalog::new();
    catalog.insert_skill("5001", "Cleave", false);
    catalog.insert_buff(BuffEntry {
        buff_id: FURY,
        buff_name: "Fury".into(),
        dmg: Some(0.5),
        ..Default::default()
    });
    let clock = ManualClock::new(T0);
    let settings = CombatSettings::default();
    Fixture {
        processor: EventProcessor::new(settings.self_damage_ceiling),
        cache: SessionCache::new(Arc::new(CatalogHandle::new(catalog)), clock.clone(), settings),
        clock,
    }
}

fn hp_changed(target_id: i64, previous_hp: i64, current_hp: i64) -> CombatEvent {
    CombatEvent::HpChanged {
        target_id,
        previous_hp,
        current_hp,
    }
}

fn attack(target_id: i64, skill_key: i64, flags: DamageFlags) -> CombatEvent {
    CombatEvent::Attack(AttackEvent {
        caster_id: PLAYER,
        target_id,
        skill_key,
        skill_key2: 0,
        flags,
    })
}

fn action(user_id: i64, skill_name: &str) -> CombatEvent {
    CombatEvent::Action(ActionEvent {
        user_id,
        skill_name: skill_name.to_string(),
        skill_id: 1,
        key1: 0,
    })
}

fn fury_on(target_id: i64, key: &str) -> CombatEvent {
    CombatEvent::BuffStart(BuffEvent {
        caster_id: 2,
        instance_key: key.to_string(),
        buff_id: FURY,
        flags: 0,
        stack: 1,
        target_id,
    })
}

fn fury_off(key: &str) -> CombatEvent {
    CombatEvent::BuffEnd(BuffEndEvent {
        caster_id: 2,
        instance_key: key.to_string(),
        flags: 0,
    })
}

fn fury_uptime(f: &Fixture) -> f64 {
    let window = f.cache.damage.window();
    let stats = f
        .cache
        .buffs
        .user_buff_stats_with_uptime(PLAYER, window.start, window.end)
        .expect("buff stats");
    stats.received_buff_stats[&FURY].uptime_percent
}

// ─── Attribution ─────────────────────────────────────────────────────────────

#[test]
fn test_pending_delta_attributed_once() {
    let mut f = make_fixture();
    f.send(hp_changed(10, 100, 40));
    f.send(attack(10, 5001, DamageFlags::default()));
    f.send(attack(10, 5001, DamageFlags::default()));

    let counters = f.cache.damage.user_counters(PLAYER).expect("counters");
    assert_eq!(counters.total, 60);
    assert_eq!(counters.hit_count, 1);
    let skills = f.cache.damage.user_skills(PLAYER);
    assert_eq!(skills.len(), 1);
    assert_eq!(crate::context::resolve(skills[0].0), "Cleave");
}

#[test]
fn test_attack_on_other_target_leaves_delta_pending() {
    let mut f = make_fixture();
    f.send(hp_changed(10, 100, 40));
    f.send(attack(11, 5001, DamageFlags::default()));
    assert_eq!(f.total(), 0);
    f.send(attack(10, 5001, DamageFlags::default()));
    assert_eq!(f.total(), 60);
}

#[test]
fn test_hp_increase_cancels_pending() {
    let mut f = make_fixture();
    f.send(hp_changed(10, 100, 40));
    f.send(hp_changed(10, 40, 90));
    f.send(attack(10, 5001, DamageFlags::default()));
    assert_eq!(f.total(), 0);
}

#[test]
fn test_hp_sample_for_other_target_keeps_pending() {
    let mut f = make_fixture();
    f.send(hp_changed(10, 100, 40));
    f.send(hp_changed(11, 50, 80));
    f.send(hp_changed(11, 80, 80));
    f.send(attack(10, 5001, DamageFlags::default()));
    assert_eq!(f.total(), 60);
}

#[test]
fn test_equal_hp_on_pending_target_cancels() {
    let mut f = make_fixture();
    f.send(hp_changed(10, 100, 40));
    f.send(hp_changed(10, 40, 40));
    f.send(attack(10, 5001, DamageFlags::default()));
    assert_eq!(f.total(), 0);
}

#[test]
fn test_current_hp_first_sample_only_seeds() {
    let mut f = make_fixture();
    f.send(CombatEvent::CurrentHp {
        target_id: 10,
        current_hp: 500,
    });
    f.send(attack(10, 5001, DamageFlags::default()));
    assert_eq!(f.total(), 0);

    f.send(CombatEvent::CurrentHp {
        target_id: 10,
        current_hp: 350,
    });
    f.send(attack(10, 5001, DamageFlags::default()));
    assert_eq!(f.total(), 150);
}

#[test]
fn test_dot_hit_counts_as_dot() {
    let mut f = make_fixture();
    let dot = DamageFlags::from_flags(&[DamageFlag::Dot4, DamageFlag::Fire]);
    f.send(hp_changed(10, 100, 90));
    f.send(attack(10, 0, dot));

    let counters = f.cache.damage.user_counters(PLAYER).expect("counters");
    assert_eq!(counters.total, 10);
    assert_eq!(counters.hit_count, 0);

    let skills = f.cache.damage.user_skills(PLAYER);
    assert_eq!(crate::context::resolve(skills[0].0), "(dot) fire");
    assert_eq!(skills[0].1.totals.dot_count, 1);
}

#[test]
fn test_damage_bonus_from_caster_buffs() {
    let mut f = make_fixture();
    f.send(fury_on(PLAYER, "01"));
    f.send(hp_changed(10, 100, 40));
    f.send(attack(10, 5001, DamageFlags::default()));
    assert_eq!(f.total(), 90);
}

// ─── Self damage ─────────────────────────────────────────────────────────────

#[test]
fn test_self_damage_sets_pending_and_self_user() {
    let mut f = make_fixture();
    f.send(CombatEvent::SelfDamage(SelfDamageEvent {
        user_id: PLAYER,
        target_id: 10,
        damage: 250,
        flags: DamageFlags::default(),
    }));
    f.send(attack(10, 5001, DamageFlags::default()));

    assert_eq!(f.total(), 250);
    assert_eq!(f.cache.damage.self_user_id(), PLAYER);
    assert_eq!(f.cache.snapshot().user_id, PLAYER);
}

#[test]
fn test_self_damage_above_ceiling_is_filtered() {
    let mut f = make_fixture();
    f.send(CombatEvent::SelfDamage(SelfDamageEvent {
        user_id: PLAYER,
        target_id: 10,
        damage: 2_095_071_573,
        flags: DamageFlags::default(),
    }));
    f.send(attack(10, 5001, DamageFlags::default()));

    assert_eq!(f.total(), 0);
    assert_eq!(f.cache.damage.self_damage_total(PLAYER), 0);
}

// ─── Combat timeout ──────────────────────────────────────────────────────────

#[test]
fn test_timeout_resets_and_signals() {
    let mut f = make_fixture();
    f.send(action(PLAYER, "Bard_Song"));
    f.send(CombatEvent::BossIdentified { boss_id: BOSS });
    f.send(hp_changed(10, 100, 40));
    assert!(f.send(attack(10, 5001, DamageFlags::default())).is_empty());

    f.clock.advance(61_000);
    f.send(hp_changed(10, 40, 30));
    let signals = f.send(attack(10, 5001, DamageFlags::default()));

    assert_eq!(signals, vec![GameSignal::CombatTimedOut]);
    assert_eq!(f.total(), 10);
    assert_eq!(f.cache.raid.boss_id(), None);
    assert_eq!(f.cache.resolver.job_for(PLAYER), None);
}

// ─── Buff uptime against the combat window ─────────────────────────────────

#[test]
fn test_buff_open_before_combat_counts_from_first_hit() {
    let mut f = make_fixture();
    f.send(fury_on(PLAYER, "01"));

    f.clock.advance(100_000);
    f.send(hp_changed(10, 100, 40));
    f.send(attack(10, 5001, DamageFlags::default()));
    f.clock.advance(5_000);
    f.send(fury_off("01"));
    f.clock.advance(5_000);
    f.send(hp_changed(10, 40, 30));
    f.send(attack(10, 5001, DamageFlags::default()));

    assert_eq!(f.cache.damage.window().start, T0 + 100_000);
    assert_eq!(fury_uptime(&f), 50.0);
}

#[test]
fn test_timeout_rebases_open_buff_sessions() {
    let mut f = make_fixture();
    f.send(fury_on(PLAYER, "01"));
    f.send(hp_changed(10, 100, 90));
    f.send(attack(10, 5001, DamageFlags::default()));

    f.clock.advance(61_000);
    f.send(hp_changed(10, 90, 80));
    assert_eq!(
        f.send(attack(10, 5001, DamageFlags::default())),
        vec![GameSignal::CombatTimedOut]
    );
    f.clock.advance(2_000);
    f.send(fury_off("01"));
    f.clock.advance(2_000);
    f.send(hp_changed(10, 80, 70));
    f.send(attack(10, 5001, DamageFlags::default()));

    assert_eq!(f.cache.damage.window().start, T0 + 61_000);
    assert_eq!(fury_uptime(&f), 50.0);
}

// ─── Raid lifecycle ──────────────────────────────────────────────────────────

#[test]
fn test_boss_change_rebases_buff_stats() {
    let mut f = make_fixture();
    let first = f.send(CombatEvent::BossIdentified { boss_id: BOSS });
    assert_eq!(
        first,
        vec![GameSignal::BossChanged {
            previous: None,
            boss_id: BOSS
        }]
    );
    assert!(f.send(CombatEvent::BossIdentified { boss_id: BOSS }).is_empty());

    f.send(fury_on(PLAYER, "01"));
    f.clock.advance(8_000);
    let second = f.send(CombatEvent::BossIdentified { boss_id: BOSS + 1 });
    assert_eq!(
        second,
        vec![GameSignal::BossChanged {
            previous: Some(BOSS),
            boss_id: BOSS + 1
        }]
    );

    let stats = f.cache.buffs.user_buff_stats_filtered(PLAYER).expect("stats");
    let fury = &stats.received_buff_stats[&FURY];
    assert_eq!(fury.total_count, 1);
    assert_eq!(fury.current_session_start, T0 + 8_000);
    assert_eq!(f.cache.buffs.active_count(), 1);
}

#[test]
fn test_boss_skills_counted() {
    let mut f = make_fixture();
    assert!(f.send(action(BOSS, "Quake")).is_empty());
    f.send(CombatEvent::BossIdentified { boss_id: BOSS });
    f.send(action(BOSS, "Quake"));
    let signals = f.send(action(BOSS, "Quake"));

    assert_eq!(
        signals,
        vec![GameSignal::BossSkillUsed {
            boss_id: BOSS,
            skill_name: "Quake".into(),
            count: 2
        }]
    );
    assert_eq!(f.cache.snapshot().boss_skill_counts.get("Quake"), Some(&2));
}

#[test]
fn test_die_blow_from_boss_ends_raid() {
    let mut f = make_fixture();
    f.send(CombatEvent::BossIdentified { boss_id: BOSS });
    f.send(fury_on(PLAYER, "01"));
    f.clock.advance(3_000);

    let blow = |user_id| {
        CombatEvent::DieBlow(DieBlowEvent {
            user_id,
            skill_name: "Die_Blow".into(),
        })
    };
    assert!(f.send(blow(PLAYER)).is_empty());
    let signals = f.send(blow(BOSS));
    assert_eq!(
        signals,
        vec![
            GameSignal::RaidEnded { boss_id: BOSS },
            GameSignal::RaidRecordReady { boss_id: BOSS },
        ]
    );

    let stats = f.cache.buffs.user_buff_stats_filtered(PLAYER).expect("stats");
    assert_eq!(stats.received_buff_stats[&FURY].total_duration, 3_000);
    assert!(!stats.received_buff_stats[&FURY].has_open_session());
}

#[test]
fn test_item_use_signal() {
    let mut f = make_fixture();
    let signals = f.send(CombatEvent::ItemUse(ItemUseEvent {
        user_id: 0,
        item_name: "Elixir".into(),
    }));
    assert_eq!(
        signals,
        vec![GameSignal::ItemUsed {
            user_id: 0,
            item_name: "Elixir".into()
        }]
    );
}

#[test]
fn test_clear_forgets_pending() {
    let mut f = make_fixture();
    f.send(hp_changed(10, 100, 40));
    f.processor.clear();
    f.send(attack(10, 5001, DamageFlags::default()));
    assert_eq!(f.total(), 0);
}
