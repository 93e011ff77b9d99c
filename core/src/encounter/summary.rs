//! Personal snapshot assembly.
//!
//! Turns the raw ledger aggregates into the rounded, sorted
//! [`PersonalStats`] view that observers receive.

use std::collections::BTreeMap;

use raidlens_types::formatting::{add_hit_rate, capped_rate, per_second, share_percent};
use raidlens_types::{PersonalStats, SkillStats, TargetStats, UserBuffStats};

use super::ledger::DamageLedger;
use super::metrics::SkillTotals;
use crate::context::resolve;

/// Fields of the snapshot that come from outside the damage ledger.
#[derive(Debug, Clone, Default)]
pub struct SnapshotContext {
    pub party_players: BTreeMap<i64, String>,
    pub job_name: Option<String>,
    pub boss_id: Option<i64>,
    pub boss_skill_counts: BTreeMap<String, u64>,
    pub buffs: Option<UserBuffStats>,
}

/// Build the snapshot for `user_id`. A user with no recorded damage gets
/// the empty shape carrying only the context fields.
pub fn personal_stats(ledger: &DamageLedger, user_id: i64, ctx: SnapshotContext) -> PersonalStats {
    let Some(counters) = ledger.user_counters(user_id) else {
        return PersonalStats {
            party_players: ctx.party_players,
            job_name: ctx.job_name,
            boss_id: ctx.boss_id,
            boss_skill_counts: ctx.boss_skill_counts,
            buffs: ctx.buffs,
            ..PersonalStats::empty(user_id)
        };
    };

    let window = ledger.window();
    let duration = window.duration_secs().unwrap_or(0);

    PersonalStats {
        user_id,
        party_players: ctx.party_players,
        boss_id: ctx.boss_id,
        boss_skill_counts: ctx.boss_skill_counts,
        buffs: ctx.buffs,
        total_damage: counters.total,
        dps: per_second(ledger.dps_total(user_id), duration),
        duration_seconds: duration,
        combat_start_time: window.start,
        combat_end_time: window.end,
        hit_count: counters.hit_count,
        crit_count: counters.crit,
        crit_rate: capped_rate(counters.crit, counters.hit_count),
        add_hit_count: counters.add_hit,
        add_hit_rate: add_hit_rate(counters.add_hit, counters.hit_count),
        power_count: counters.power,
        power_rate: capped_rate(counters.power, counters.hit_count),
        fast_count: counters.fast,
        fast_rate: capped_rate(counters.fast, counters.hit_count),
        skills: skill_breakdown(ledger, user_id, counters.total),
        targets: target_breakdown(ledger, user_id, counters.total, duration),
        job_name: ctx.job_name,
        self_damage_total: ledger.self_damage_total(user_id),
    }
}

fn skill_breakdown(ledger: &DamageLedger, user_id: i64, user_total: i64) -> Vec<SkillStats> {
    let mut rows: Vec<SkillStats> = ledger
        .user_skills(user_id)
        .iter()
        .map(|(name, detail)| skill_row(resolve(*name), &detail.totals, user_total))
        .collect();
    rows.sort_by(|a, b| b.total_damage.cmp(&a.total_damage));
    rows
}

fn target_breakdown(
    ledger: &DamageLedger,
    user_id: i64,
    user_total: i64,
    session_duration: i64,
) -> Vec<TargetStats> {
    let skills = ledger.user_skills(user_id);

    let mut rows: Vec<TargetStats> = ledger
        .user_targets(user_id)
        .into_iter()
        .map(|(target_id, c)| {
            let window = ledger.target_window(target_id).unwrap_or_default();
            let duration = window.duration_secs().unwrap_or(session_duration);

            let mut target_skills: Vec<SkillStats> = skills
                .iter()
                .filter_map(|(name, detail)| {
                    detail
                        .by_target
                        .get(&target_id)
                        .map(|t| skill_row(resolve(*name), t, c.total))
                })
                .collect();
            target_skills.sort_by(|a, b| b.total_damage.cmp(&a.total_damage));

            TargetStats {
                target_id,
                total_damage: c.total,
                damage_percent: share_percent(c.total, user_total),
                dps: per_second(c.total, duration),
                duration_seconds: duration,
                target_start_time: window.start,
                target_end_time: window.end,
                hit_count: c.hit_count,
                crit_count: c.crit,
                crit_rate: capped_rate(c.crit, c.hit_count),
                add_hit_count: c.add_hit,
                add_hit_rate: add_hit_rate(c.add_hit, c.hit_count),
                power_count: c.power,
                power_rate: capped_rate(c.power, c.hit_count),
                fast_count: c.fast,
                fast_rate: capped_rate(c.fast, c.hit_count),
                skills: target_skills,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.total_damage.cmp(&a.total_damage));
    rows
}

fn skill_row(name: &str, t: &SkillTotals, whole: i64) -> SkillStats {
    SkillStats {
        skill_name: name.to_string(),
        total_damage: t.total,
        damage_percent: share_percent(t.total, whole),
        hit_count: t.hit_count,
        crit_count: t.crit,
        crit_rate: capped_rate(t.crit, t.hit_count),
        add_hit_count: t.add_hit,
        add_hit_rate: add_hit_rate(t.add_hit, t.hit_count),
        power_count: t.power,
        power_rate: capped_rate(t.power, t.hit_count),
        fast_count: t.fast,
        fast_rate: capped_rate(t.fast, t.hit_count),
        avg_damage: if t.hit_count > 0 { t.total / t.hit_count as i64 } else { 0 },
        max_damage: t.combined_max(),
        min_damage: t.combined_min(),
        dot_damage: t.dot,
        dot_count: t.dot_count,
        dot_avg_damage: if t.dot_count > 0 { t.dot / t.dot_count as i64 } else { 0 },
        dot_max_damage: t.max_dot,
        dot_min_damage: t.dot_min(),
    }
}
