//! Wire type codes.

use phf::phf_map;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketType {
    Attack,
    Action,
    HpChanged,
    SelfDamage,
    ItemUse,
    DieBlow,
    CurrentHp,
    Boss,
    BuffStart,
    BuffUpdate,
    BuffEnd,
}

static PACKET_TYPES: phf::Map<u32, PacketType> = phf_map! {
    20318u32 => PacketType::Attack,
    100043u32 => PacketType::Action,
    100172u32 => PacketType::HpChanged,
    20741u32 => PacketType::SelfDamage,
    100321u32 => PacketType::ItemUse,
    100042u32 => PacketType::DieBlow,
    100180u32 => PacketType::CurrentHp,
    100181u32 => PacketType::Boss,
    100182u32 => PacketType::Boss,
    100183u32 => PacketType::Boss,
    100184u32 => PacketType::Boss,
    100185u32 => PacketType::Boss,
    100048u32 => PacketType::BuffStart,
    100051u32 => PacketType::BuffUpdate,
    100049u32 => PacketType::BuffEnd,
};

/// Codes that should always decode; a miss here usually means a layout change.
const DIAGNOSTIC_CODES: &[u32] = &[20318, 100043, 100172, 20741, 100048, 100051, 100049];

impl PacketType {
    pub fn from_code(code: u32) -> Option<Self> {
        PACKET_TYPES.get(&code).copied()
    }
}

/// Whether a failed decode of `code` is worth surfacing.
pub fn is_diagnostic(code: u32) -> bool {
    DIAGNOSTIC_CODES.contains(&code)
}
