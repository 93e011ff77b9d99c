use super::flags::DamageFlags;

/// One decoded protocol message. Variants carry only wire fields.
#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    Attack(AttackEvent),
    Action(ActionEvent),
    SelfDamage(SelfDamageEvent),
    DieBlow(DieBlowEvent),
    BuffStart(BuffEvent),
    BuffUpdate(BuffEvent),
    BuffEnd(BuffEndEvent),
    BossIdentified { boss_id: i64 },
    CurrentHp { target_id: i64, current_hp: i64 },
    HpChanged { target_id: i64, previous_hp: i64, current_hp: i64 },
    ItemUse(ItemUseEvent),
}

impl CombatEvent {
    /// Short label for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            CombatEvent::Attack(_) => "attack",
            CombatEvent::Action(_) => "action",
            CombatEvent::SelfDamage(_) => "self_damage",
            CombatEvent::DieBlow(_) => "die_blow",
            CombatEvent::BuffStart(_) => "buff_start",
            CombatEvent::BuffUpdate(_) => "buff_update",
            CombatEvent::BuffEnd(_) => "buff_end",
            CombatEvent::BossIdentified { .. } => "boss",
            CombatEvent::CurrentHp { .. } => "current_hp",
            CombatEvent::HpChanged { .. } => "hp_changed",
            CombatEvent::ItemUse(_) => "item_use",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AttackEvent {
    pub caster_id: i64,
    pub target_id: i64,
    /// Primary skill key; 0 for DOT ticks and special hits.
    pub skill_key: i64,
    pub skill_key2: i64,
    pub flags: DamageFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ActionEvent {
    pub user_id: i64,
    pub skill_name: String,
    pub skill_id: i32,
    /// Skill key that later attacks will reference.
    pub key1: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelfDamageEvent {
    pub user_id: i64,
    pub target_id: i64,
    pub damage: i64,
    pub flags: DamageFlags,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DieBlowEvent {
    pub user_id: i64,
    pub skill_name: String,
}

/// Payload shared by buff start and buff update messages.
#[derive(Debug, Clone, PartialEq)]
pub struct BuffEvent {
    pub caster_id: i64,
    /// Lowercase hex of the 8-byte wire instance key.
    pub instance_key: String,
    pub buff_id: i64,
    pub flags: u32,
    pub stack: i32,
    pub target_id: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuffEndEvent {
    pub caster_id: i64,
    pub instance_key: String,
    pub flags: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemUseEvent {
    /// 0 means the local player.
    pub user_id: i64,
    pub item_name: String,
}
