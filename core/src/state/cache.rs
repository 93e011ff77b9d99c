use std::sync::Arc;

use raidlens_types::{CombatSettings, PersonalStats};

use crate::context::SharedClock;
use crate::effects::BuffTracker;
use crate::encounter::{DamageLedger, SnapshotContext, personal_stats};
use crate::game_data::{CatalogHandle, SkillNameResolver};
use crate::signal_processor::RaidState;

/// Pure storage for session state.
/// Routing logic lives in EventProcessor.
///
/// Shared behind an `Arc` between the capture thread, which is the only
/// writer, and any number of snapshot readers.
pub struct SessionCache {
    pub catalog: Arc<CatalogHandle>,
    pub damage: DamageLedger,
    pub resolver: SkillNameResolver,
    pub buffs: BuffTracker,
    pub raid: RaidState,
}

impl SessionCache {
    pub fn new(catalog: Arc<CatalogHandle>, clock: SharedClock, settings: CombatSettings) -> Self {
        Self {
            damage: DamageLedger::new(clock.clone(), settings),
            resolver: SkillNameResolver::new(catalog.clone()),
            buffs: BuffTracker::new(catalog.clone(), clock),
            raid: RaidState::new(),
            catalog,
        }
    }

    // --- Snapshots ---

    /// Personal snapshot for the current self user. Safe to call with no
    /// data; the result is then the empty shape.
    pub fn snapshot(&self) -> PersonalStats {
        self.snapshot_for(self.damage.self_user_id())
    }

    pub fn snapshot_for(&self, user_id: i64) -> PersonalStats {
        let window = self.damage.window();
        let ctx = SnapshotContext {
            party_players: self.resolver.party_jobs(),
            job_name: self.resolver.job_for(user_id).map(str::to_string),
            boss_id: self.raid.boss_id(),
            boss_skill_counts: self.raid.skill_counts(),
            buffs: self
                .buffs
                .user_buff_stats_with_uptime(user_id, window.start, window.end),
        };
        personal_stats(&self.damage, user_id, ctx)
    }

    // --- Resets ---

    /// Combat began on an empty window. Buff statistics restart at the first
    /// hit; jobs and the boss id stay.
    pub fn on_combat_start(&self) {
        self.buffs.clear_buff_stats();
    }

    /// Combat-timeout reset of everything outside the damage ledger, which
    /// has already cleared itself.
    pub fn on_combat_timeout(&self) {
        self.resolver.clear_jobs();
        self.raid.clear();
        self.buffs.clear_buff_stats();
    }

    /// Clear all ledgers. With `preserve_recent_buffs` live buffs survive and
    /// only their statistics are rebased.
    pub fn clear_all(&self, preserve_recent_buffs: bool) {
        self.resolver.clear_all();
        self.damage.clear_all();
        self.raid.clear();
        if preserve_recent_buffs {
            self.buffs.clear_buff_stats();
        } else {
            self.buffs.clear_all();
        }
    }
}
