//! Fixed-offset payload decoding.
//!
//! Every layout is little-endian. Reads are bounds-checked; any read past
//! the payload turns the whole message into `None`.

use encoding_rs::UTF_16LE;

use super::event::{
    ActionEvent, AttackEvent, BuffEndEvent, BuffEvent, CombatEvent, DieBlowEvent, ItemUseEvent,
    SelfDamageEvent,
};
use super::flags::{DamageFlags, FLAG_BLOCK_LEN};
use super::packet_type::{PacketType, is_diagnostic};

const DIE_BLOW_NAME: &str = "Die_Blow";
const ACTION_SKIP_BYTES: usize = 17;
const MAX_ITEM_NAME_BYTES: i32 = 100;

/// Bounds-checked little-endian reads over a payload.
struct Payload<'a>(&'a [u8]);

impl<'a> Payload<'a> {
    fn bytes(&self, at: usize, len: usize) -> Option<&'a [u8]> {
        self.0.get(at..at.checked_add(len)?)
    }

    fn u32(&self, at: usize) -> Option<u32> {
        let b: [u8; 4] = self.bytes(at, 4)?.try_into().ok()?;
        Some(u32::from_le_bytes(b))
    }

    fn i32(&self, at: usize) -> Option<i32> {
        self.u32(at).map(|v| v as i32)
    }

    /// Unsigned 32-bit id widened to i64.
    fn id(&self, at: usize) -> Option<i64> {
        self.u32(at).map(i64::from)
    }

    /// A non-negative i32 length prefix.
    fn len_prefix(&self, at: usize) -> Option<usize> {
        usize::try_from(self.i32(at)?).ok()
    }
}

/// Decode one message. Unknown type codes and malformed payloads yield `None`.
pub fn decode(type_code: u32, payload: &[u8]) -> Option<CombatEvent> {
    let packet_type = PacketType::from_code(type_code)?;
    let p = Payload(payload);

    let event = match packet_type {
        PacketType::Attack => decode_attack(&p).map(CombatEvent::Attack),
        PacketType::Action => decode_action(&p).map(CombatEvent::Action),
        PacketType::HpChanged => decode_hp_changed(&p),
        PacketType::CurrentHp => decode_current_hp(&p),
        PacketType::SelfDamage => decode_self_damage(&p).map(CombatEvent::SelfDamage),
        PacketType::ItemUse => decode_item_use(&p).map(CombatEvent::ItemUse),
        PacketType::DieBlow => decode_die_blow(&p).map(CombatEvent::DieBlow),
        PacketType::Boss => p.id(0).map(|boss_id| CombatEvent::BossIdentified { boss_id }),
        PacketType::BuffStart => decode_buff(&p).map(CombatEvent::BuffStart),
        PacketType::BuffUpdate => decode_buff(&p).map(CombatEvent::BuffUpdate),
        PacketType::BuffEnd => decode_buff_end(&p).map(CombatEvent::BuffEnd),
    };

    if event.is_none() && is_diagnostic(type_code) {
        tracing::info!(
            "[DECODE] Known packet type not parsed: {} ({} bytes)",
            type_code,
            payload.len()
        );
    }
    event
}

fn decode_attack(p: &Payload) -> Option<AttackEvent> {
    Some(AttackEvent {
        caster_id: p.id(0)?,
        target_id: p.id(8)?,
        skill_key: p.id(16)?,
        skill_key2: p.id(20)?,
        flags: DamageFlags::from_block(p.bytes(24, FLAG_BLOCK_LEN)?),
    })
}

fn decode_action(p: &Payload) -> Option<ActionEvent> {
    let user_id = p.id(0)?;
    let name_len = p.len_prefix(8)?;
    let name_bytes = p.bytes(12, name_len)?;
    let stripped: Vec<u8> = name_bytes.iter().copied().filter(|&b| b != 0).collect();
    let skill_name = String::from_utf8_lossy(&stripped).trim().to_string();

    let mut pos = 12 + name_len;
    let skill_id = p.i32(pos)?;
    pos += 4;
    // Unused field.
    p.i32(pos)?;
    pos += 4 + ACTION_SKIP_BYTES;
    let key1 = p.id(pos)?;

    Some(ActionEvent {
        user_id,
        skill_name,
        skill_id,
        key1,
    })
}

fn decode_hp_changed(p: &Payload) -> Option<CombatEvent> {
    p.bytes(0, 20)?;
    Some(CombatEvent::HpChanged {
        target_id: p.id(0)?,
        previous_hp: p.id(8)?,
        current_hp: p.id(16)?,
    })
}

fn decode_current_hp(p: &Payload) -> Option<CombatEvent> {
    p.bytes(0, 20)?;
    Some(CombatEvent::CurrentHp {
        target_id: p.id(0)?,
        current_hp: p.id(12)?,
    })
}

fn decode_self_damage(p: &Payload) -> Option<SelfDamageEvent> {
    Some(SelfDamageEvent {
        user_id: p.id(0)?,
        target_id: p.id(8)?,
        damage: p.id(16)?,
        flags: DamageFlags::from_block(p.bytes(32, FLAG_BLOCK_LEN)?),
    })
}

fn decode_item_use(p: &Payload) -> Option<ItemUseEvent> {
    let len = p.i32(0)?;
    if !(1..=MAX_ITEM_NAME_BYTES).contains(&len) {
        tracing::debug!("[DECODE] Item name length out of range: {}", len);
        return None;
    }
    let raw = p.bytes(4, len as usize)?;
    let (name, _) = UTF_16LE.decode_without_bom_handling(raw);
    Some(ItemUseEvent {
        user_id: 0,
        item_name: name.trim_matches('\0').to_string(),
    })
}

fn decode_die_blow(p: &Payload) -> Option<DieBlowEvent> {
    let user_id = p.id(0)?;
    let name_len = p.len_prefix(8)?;
    let (name, _) = UTF_16LE.decode_without_bom_handling(p.bytes(12, name_len)?);
    if !name.eq_ignore_ascii_case(DIE_BLOW_NAME) {
        return None;
    }
    Some(DieBlowEvent {
        user_id,
        skill_name: name.into_owned(),
    })
}

fn instance_key(p: &Payload) -> Option<String> {
    let raw = p.bytes(8, 8)?;
    Some(raw.iter().map(|b| format!("{:02x}", b)).collect())
}

fn decode_buff(p: &Payload) -> Option<BuffEvent> {
    let caster_id = p.id(0)?;
    let instance_key = instance_key(p)?;
    let buff_id = p.id(16)?;
    let flags = p.u32(20)?;
    let stack = p.i32(24)?;
    // A negative extra count skips nothing.
    let extra = usize::try_from(p.i32(28)?).unwrap_or(0);
    let target_at = extra.checked_mul(4)?.checked_add(32)?;
    let target_id = p.id(target_at)?;

    Some(BuffEvent {
        caster_id,
        instance_key,
        buff_id,
        flags,
        stack,
        target_id,
    })
}

fn decode_buff_end(p: &Payload) -> Option<BuffEndEvent> {
    Some(BuffEndEvent {
        caster_id: p.id(0)?,
        instance_key: instance_key(p)?,
        flags: p.u32(16)?,
    })
}
