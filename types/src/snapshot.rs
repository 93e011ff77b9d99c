//! Point-in-time views handed to the delivery layer.
//!
//! Field names serialize in camelCase; observers consume these as JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-buff counters for one (subject, buff, role) triple.
///
/// `current_session_start == 0` means no session is open. `total_duration`
/// only grows when a session closes; views add the open session on read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffStats {
    pub id: i64,
    pub name: String,
    pub total_count: u32,
    pub start_count: u32,
    pub update_count: u32,
    pub refresh_count: u32,
    pub total_duration: i64,
    pub max_stack: i32,
    pub avg_stack: f64,
    pub current_stack: i32,
    pub total_stack_sum: i64,
    pub first_applied_time: i64,
    pub last_applied_time: i64,
    pub current_session_start: i64,
    pub uptime_percent: f64,
}

impl BuffStats {
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn has_open_session(&self) -> bool {
        self.current_session_start > 0
    }
}

/// Buff statistics for one user, split by role.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBuffStats {
    pub user_id: i64,
    pub cast_buff_stats: BTreeMap<i64, BuffStats>,
    pub received_buff_stats: BTreeMap<i64, BuffStats>,
    pub last_update_time: i64,
}

impl UserBuffStats {
    pub fn empty(user_id: i64) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }
}

/// Flat counters view of a [`BuffStats`] without the derived uptime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuffSummaryInfo {
    pub buff_key: i64,
    pub total_count: u32,
    pub start_count: u32,
    pub update_count: u32,
    pub refresh_count: u32,
    pub total_duration: i64,
    pub avg_stack: f64,
    pub max_stack: i32,
    pub first_applied_time: i64,
    pub last_applied_time: i64,
    pub current_session_start: i64,
}

impl From<&BuffStats> for BuffSummaryInfo {
    fn from(stats: &BuffStats) -> Self {
        Self {
            buff_key: stats.id,
            total_count: stats.total_count,
            start_count: stats.start_count,
            update_count: stats.update_count,
            refresh_count: stats.refresh_count,
            total_duration: stats.total_duration,
            avg_stack: stats.avg_stack,
            max_stack: stats.max_stack,
            first_applied_time: stats.first_applied_time,
            last_applied_time: stats.last_applied_time,
            current_session_start: stats.current_session_start,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserBuffSummary {
    pub user_id: i64,
    pub last_update_time: i64,
    pub cast_buffs_summary: Vec<BuffSummaryInfo>,
    pub received_buffs_summary: Vec<BuffSummaryInfo>,
}

impl UserBuffSummary {
    pub fn empty(user_id: i64) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }
}

/// One row of a skill breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillStats {
    pub skill_name: String,
    pub total_damage: i64,
    pub damage_percent: f64,
    pub hit_count: u32,
    pub crit_count: u32,
    pub crit_rate: f64,
    pub add_hit_count: u32,
    pub add_hit_rate: f64,
    pub power_count: u32,
    pub power_rate: f64,
    pub fast_count: u32,
    pub fast_rate: f64,
    pub avg_damage: i64,
    /// Largest single hit, normal or DOT.
    pub max_damage: i64,
    /// Smallest single hit, normal or DOT; 0 when nothing landed.
    pub min_damage: i64,
    pub dot_damage: i64,
    pub dot_count: u32,
    pub dot_avg_damage: i64,
    pub dot_max_damage: i64,
    pub dot_min_damage: i64,
}

/// Damage one user dealt to one target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStats {
    pub target_id: i64,
    pub total_damage: i64,
    pub damage_percent: f64,
    pub dps: f64,
    pub duration_seconds: i64,
    pub target_start_time: i64,
    pub target_end_time: i64,
    pub hit_count: u32,
    pub crit_count: u32,
    pub crit_rate: f64,
    pub add_hit_count: u32,
    pub add_hit_rate: f64,
    pub power_count: u32,
    pub power_rate: f64,
    pub fast_count: u32,
    pub fast_rate: f64,
    pub skills: Vec<SkillStats>,
}

/// Everything observers see about the local player.
///
/// With no combat data yet this is [`PersonalStats::empty`]: keyed by the
/// self user id, every aggregate zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalStats {
    pub user_id: i64,
    pub party_players: BTreeMap<i64, String>,
    pub boss_id: Option<i64>,
    pub boss_skill_counts: BTreeMap<String, u64>,
    pub buffs: Option<UserBuffStats>,
    pub total_damage: i64,
    pub dps: f64,
    pub duration_seconds: i64,
    pub combat_start_time: i64,
    pub combat_end_time: i64,
    pub hit_count: u32,
    pub crit_count: u32,
    pub crit_rate: f64,
    pub add_hit_count: u32,
    pub add_hit_rate: f64,
    pub power_count: u32,
    pub power_rate: f64,
    pub fast_count: u32,
    pub fast_rate: f64,
    pub skills: Vec<SkillStats>,
    pub targets: Vec<TargetStats>,
    pub job_name: Option<String>,
    pub self_damage_total: i64,
}

impl PersonalStats {
    pub fn empty(user_id: i64) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }
}
