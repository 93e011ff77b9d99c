//! Tests for payload decoding
//!
//! Payloads are built field by field at their wire offsets.

use super::*;
use crate::capture::frame::{extract, test_support};

fn put_u32(buf: &mut Vec<u8>, at: usize, value: u32) {
    if buf.len() < at + 4 {
        buf.resize(at + 4, 0);
    }
    buf[at..at + 4].copy_from_slice(&value.to_le_bytes());
}

fn utf16(s: &str) -> Vec<u8> {
    s.encode_utf16().flat_map(|u| u.to_le_bytes()).collect()
}

fn make_attack(caster: u32, target: u32, key: u32, flag_block: [u8; 7]) -> Vec<u8> {
    let mut p = vec![0u8; 35];
    put_u32(&mut p, 0, caster);
    put_u32(&mut p, 8, target);
    put_u32(&mut p, 16, key);
    p[24..31].copy_from_slice(&flag_block);
    p
}

fn make_action(user: u32, name: &[u8], skill_id: i32, key1: u32) -> Vec<u8> {
    let mut p = Vec::new();
    put_u32(&mut p, 0, user);
    put_u32(&mut p, 8, name.len() as u32);
    p.extend_from_slice(name);
    p.extend_from_slice(&skill_id.to_le_bytes());
    p.extend_from_slice(&0i32.to_le_bytes());
    p.extend_from_slice(&[0u8; 17]);
    p.extend_from_slice(&key1.to_le_bytes());
    p
}

fn make_buff(user: u32, key: [u8; 8], buff: u32, stack: i32, extra: &[u32], target: u32) -> Vec<u8> {
    let mut p = Vec::new();
    put_u32(&mut p, 0, user);
    p.resize(8, 0);
    p.extend_from_slice(&key);
    p.extend_from_slice(&buff.to_le_bytes());
    p.extend_from_slice(&7u32.to_le_bytes());
    p.extend_from_slice(&stack.to_le_bytes());
    p.extend_from_slice(&(extra.len() as i32).to_le_bytes());
    for e in extra {
        p.extend_from_slice(&e.to_le_bytes());
    }
    p.extend_from_slice(&target.to_le_bytes());
    p
}

#[test]
fn test_attack_fields_and_flags() {
    let payload = make_attack(11, 22, 3001, [0x01, 0x04, 0, 0x08, 0, 0, 0]);
    let Some(CombatEvent::Attack(a)) = decode(20318, &payload) else {
        panic!("expected attack");
    };
    assert_eq!(a.caster_id, 11);
    assert_eq!(a.target_id, 22);
    assert_eq!(a.skill_key, 3001);
    assert!(a.flags.is_crit());
    assert!(a.flags.is_fast());
    assert!(a.flags.is_add_hit());
    assert!(!a.flags.is_dot());
}

#[test]
fn test_attack_ids_are_unsigned() {
    let payload = make_attack(u32::MAX, 1, 0, [0; 7]);
    let Some(CombatEvent::Attack(a)) = decode(20318, &payload) else {
        panic!("expected attack");
    };
    assert_eq!(a.caster_id, u32::MAX as i64);
}

#[test]
fn test_short_attack_is_rejected() {
    assert_eq!(decode(20318, &[0u8; 20]), None);
}

#[test]
fn test_action_strips_nuls_and_reads_key() {
    let payload = make_action(5, b"HighMage_Fireball\0\0", 42, 9001);
    let Some(CombatEvent::Action(a)) = decode(100043, &payload) else {
        panic!("expected action");
    };
    assert_eq!(a.user_id, 5);
    assert_eq!(a.skill_name, "HighMage_Fireball");
    assert_eq!(a.skill_id, 42);
    assert_eq!(a.key1, 9001);
}

#[test]
fn test_action_negative_length_rejected() {
    let mut payload = make_action(5, b"abc", 1, 2);
    payload[8..12].copy_from_slice(&(-3i32).to_le_bytes());
    assert_eq!(decode(100043, &payload), None);
}

#[test]
fn test_action_truncated_before_key_rejected() {
    let mut payload = make_action(5, b"abc", 1, 2);
    payload.truncate(payload.len() - 2);
    assert_eq!(decode(100043, &payload), None);
}

#[test]
fn test_hp_changed_and_current_hp() {
    let mut p = vec![0u8; 20];
    put_u32(&mut p, 0, 77);
    put_u32(&mut p, 8, 100);
    put_u32(&mut p, 16, 40);
    assert_eq!(
        decode(100172, &p),
        Some(CombatEvent::HpChanged {
            target_id: 77,
            previous_hp: 100,
            current_hp: 40
        })
    );

    let mut p = vec![0u8; 20];
    put_u32(&mut p, 0, 77);
    put_u32(&mut p, 12, 500);
    assert_eq!(
        decode(100180, &p),
        Some(CombatEvent::CurrentHp {
            target_id: 77,
            current_hp: 500
        })
    );
    assert_eq!(decode(100180, &[0u8; 16]), None);
}

#[test]
fn test_self_damage_flags_at_offset_32() {
    let mut p = vec![0u8; 39];
    put_u32(&mut p, 0, 1);
    put_u32(&mut p, 8, 2);
    put_u32(&mut p, 16, 1234);
    p[32] = 0x01;
    let Some(CombatEvent::SelfDamage(s)) = decode(20741, &p) else {
        panic!("expected self damage");
    };
    assert_eq!(s.damage, 1234);
    assert!(s.flags.is_crit());
    assert_eq!(decode(20741, &p[..38]), None);
}

#[test]
fn test_die_blow_name_is_case_insensitive() {
    let name = utf16("die_BLOW");
    let mut p = Vec::new();
    put_u32(&mut p, 0, 900);
    put_u32(&mut p, 8, name.len() as u32);
    p.extend_from_slice(&name);
    let Some(CombatEvent::DieBlow(d)) = decode(100042, &p) else {
        panic!("expected die blow");
    };
    assert_eq!(d.user_id, 900);
}

#[test]
fn test_die_blow_other_name_rejected() {
    let name = utf16("Bash");
    let mut p = Vec::new();
    put_u32(&mut p, 0, 900);
    put_u32(&mut p, 8, name.len() as u32);
    p.extend_from_slice(&name);
    assert_eq!(decode(100042, &p), None);
}

#[test]
fn test_item_use_length_bounds() {
    let name = utf16("Potion\0");
    let mut p = (name.len() as i32).to_le_bytes().to_vec();
    p.extend_from_slice(&name);
    let Some(CombatEvent::ItemUse(item)) = decode(100321, &p) else {
        panic!("expected item use");
    };
    assert_eq!(item.item_name, "Potion");
    assert_eq!(item.user_id, 0);

    let mut too_long = 101i32.to_le_bytes().to_vec();
    too_long.extend_from_slice(&[0u8; 101]);
    assert_eq!(decode(100321, &too_long), None);

    let mut past_end = 10i32.to_le_bytes().to_vec();
    past_end.extend_from_slice(&[0u8; 4]);
    assert_eq!(decode(100321, &past_end), None);
}

#[test]
fn test_boss_codes() {
    for code in 100181..=100185 {
        assert_eq!(
            decode(code, &[0x10, 0x27, 0, 0]),
            Some(CombatEvent::BossIdentified { boss_id: 10_000 })
        );
    }
    assert_eq!(decode(100181, &[1, 2]), None);
}

#[test]
fn test_buff_start_skips_extra_words() {
    let key = [0xDE, 0xAD, 0xBE, 0xEF, 0x00, 0x01, 0x02, 0x03];
    let payload = make_buff(3, key, 5500, 2, &[99, 98], 44);
    let Some(CombatEvent::BuffStart(b)) = decode(100048, &payload) else {
        panic!("expected buff start");
    };
    assert_eq!(b.instance_key, "deadbeef00010203");
    assert_eq!(b.buff_id, 5500);
    assert_eq!(b.flags, 7);
    assert_eq!(b.stack, 2);
    assert_eq!(b.target_id, 44);

    let Some(CombatEvent::BuffUpdate(u)) = decode(100051, &payload) else {
        panic!("expected buff update");
    };
    assert_eq!(u, b);
}

#[test]
fn test_buff_start_missing_target_rejected() {
    let mut payload = make_buff(3, [1; 8], 5500, 1, &[1, 2, 3], 44);
    payload.truncate(payload.len() - 1);
    assert_eq!(decode(100048, &payload), None);
}

#[test]
fn test_buff_end() {
    let mut p = vec![0u8; 20];
    put_u32(&mut p, 0, 3);
    p[8..16].copy_from_slice(&[0xAB; 8]);
    put_u32(&mut p, 16, 1);
    let Some(CombatEvent::BuffEnd(e)) = decode(100049, &p) else {
        panic!("expected buff end");
    };
    assert_eq!(e.caster_id, 3);
    assert_eq!(e.instance_key, "abababababababab");
    assert_eq!(e.flags, 1);
}

#[test]
fn test_unknown_code_is_none() {
    assert_eq!(decode(424242, &[0u8; 64]), None);
}

#[test]
fn test_frame_round_trip_yields_one_event_per_message() {
    let mut hp = vec![0u8; 20];
    put_u32(&mut hp, 0, 8);
    put_u32(&mut hp, 8, 100);
    put_u32(&mut hp, 16, 40);
    let buf = test_support::frame(&[
        test_support::message(100172, &hp),
        test_support::message(20318, &make_attack(1, 8, 0, [0; 7])),
        test_support::message(100181, &[8, 0, 0, 0]),
    ]);

    let scan = extract(&buf);
    let events: Vec<_> = scan
        .messages
        .iter()
        .filter_map(|m| decode(m.type_code, m.payload))
        .collect();

    assert_eq!(events.len(), 3);
    assert_eq!(events[0].kind(), "hp_changed");
    assert_eq!(events[1].kind(), "attack");
    assert_eq!(events[2].kind(), "boss");
    assert_eq!(scan.bytes_consumed, buf.len());
}
