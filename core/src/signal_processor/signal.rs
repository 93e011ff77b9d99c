/// Signals emitted by the [`EventProcessor`](super::EventProcessor) for
/// cross-cutting concerns. These describe "interesting things that happened"
/// at a higher level than raw protocol messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameSignal {
    // Raid lifecycle
    BossChanged {
        previous: Option<i64>,
        boss_id: i64,
    },
    BossSkillUsed {
        boss_id: i64,
        skill_name: String,
        count: u64,
    },
    RaidEnded {
        boss_id: i64,
    },
    /// The finished raid should be persisted by whoever keeps records.
    RaidRecordReady {
        boss_id: i64,
    },

    // Player activity
    ItemUsed {
        user_id: i64,
        item_name: String,
    },

    // Combat session
    CombatTimedOut,
}

impl GameSignal {
    /// Short label for logging and forwarding.
    pub fn name(&self) -> &'static str {
        match self {
            GameSignal::BossChanged { .. } => "boss_changed",
            GameSignal::BossSkillUsed { .. } => "boss_skill",
            GameSignal::RaidEnded { .. } => "raid_end",
            GameSignal::RaidRecordReady { .. } => "raid_record",
            GameSignal::ItemUsed { .. } => "item_use",
            GameSignal::CombatTimedOut => "combat_timeout",
        }
    }
}
