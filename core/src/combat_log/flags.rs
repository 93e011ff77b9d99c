//! Hit flag block decoding.
//!
//! Attack and self-damage payloads carry a 7-byte flag block. A fixed table
//! of (byte, mask) pairs maps it onto named flags.

use std::collections::BTreeMap;

/// Length of the flag block on the wire.
pub const FLAG_BLOCK_LEN: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum DamageFlag {
    Crit,
    What1,
    Unguarded,
    Break,
    What05,
    What06,
    FirstHit,
    DefaultAttack,
    MultiAttack,
    Power,
    Fast,
    Dot,
    Dot2,
    Dot3,
    AddHit,
    Bleed,
    Dark,
    Fire,
    Holy,
    Ice,
    Electric,
    Poison,
    Mind,
    Dot4,
}

/// (byte index, mask, flag)
const FLAG_TABLE: &[(usize, u8, DamageFlag)] = &[
    (0, 0x01, DamageFlag::Crit),
    (0, 0x02, DamageFlag::What1),
    (0, 0x04, DamageFlag::Unguarded),
    (0, 0x08, DamageFlag::Break),
    (0, 0x10, DamageFlag::What05),
    (0, 0x20, DamageFlag::What06),
    (0, 0x40, DamageFlag::FirstHit),
    (0, 0x80, DamageFlag::DefaultAttack),
    (1, 0x01, DamageFlag::MultiAttack),
    (1, 0x02, DamageFlag::Power),
    (1, 0x04, DamageFlag::Fast),
    (1, 0x08, DamageFlag::Dot),
    (1, 0x80, DamageFlag::Dot2),
    (2, 0x01, DamageFlag::Dot3),
    (3, 0x08, DamageFlag::AddHit),
    (3, 0x10, DamageFlag::Bleed),
    (3, 0x20, DamageFlag::Dark),
    (3, 0x40, DamageFlag::Fire),
    (3, 0x80, DamageFlag::Holy),
    (4, 0x01, DamageFlag::Ice),
    (4, 0x02, DamageFlag::Electric),
    (4, 0x04, DamageFlag::Poison),
    (4, 0x08, DamageFlag::Mind),
    (4, 0x10, DamageFlag::Dot4),
];

/// Elemental flags in display order, with their display names.
pub const ELEMENTS: &[(DamageFlag, &str)] = &[
    (DamageFlag::Bleed, "bleed"),
    (DamageFlag::Dark, "dark"),
    (DamageFlag::Fire, "fire"),
    (DamageFlag::Holy, "holy"),
    (DamageFlag::Ice, "ice"),
    (DamageFlag::Electric, "electric"),
    (DamageFlag::Poison, "poison"),
    (DamageFlag::Mind, "mind"),
];

impl DamageFlag {
    pub fn name(self) -> &'static str {
        match self {
            DamageFlag::Crit => "crit",
            DamageFlag::What1 => "what1",
            DamageFlag::Unguarded => "unguarded",
            DamageFlag::Break => "break",
            DamageFlag::What05 => "what05",
            DamageFlag::What06 => "what06",
            DamageFlag::FirstHit => "first_hit",
            DamageFlag::DefaultAttack => "default_attack",
            DamageFlag::MultiAttack => "multi_attack",
            DamageFlag::Power => "power",
            DamageFlag::Fast => "fast",
            DamageFlag::Dot => "dot",
            DamageFlag::Dot2 => "dot2",
            DamageFlag::Dot3 => "dot3",
            DamageFlag::AddHit => "add_hit",
            DamageFlag::Bleed => "bleed",
            DamageFlag::Dark => "dark",
            DamageFlag::Fire => "fire",
            DamageFlag::Holy => "holy",
            DamageFlag::Ice => "ice",
            DamageFlag::Electric => "electric",
            DamageFlag::Poison => "poison",
            DamageFlag::Mind => "mind",
            DamageFlag::Dot4 => "dot4",
        }
    }

    #[inline]
    fn bit(self) -> u32 {
        1 << (self as u8)
    }
}

/// Set of [`DamageFlag`]s decoded from one flag block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DamageFlags(u32);

impl DamageFlags {
    /// Decode a flag block. Bytes beyond the end of `block` read as zero.
    pub fn from_block(block: &[u8]) -> Self {
        let mut bits = 0u32;
        for &(index, mask, flag) in FLAG_TABLE {
            if block.get(index).is_some_and(|b| b & mask != 0) {
                bits |= flag.bit();
            }
        }
        Self(bits)
    }

    pub fn from_flags(flags: &[DamageFlag]) -> Self {
        Self(flags.iter().fold(0, |acc, f| acc | f.bit()))
    }

    #[inline]
    pub fn contains(self, flag: DamageFlag) -> bool {
        self.0 & flag.bit() != 0
    }

    /// Damage-over-time: `(dot ∧ dot2 ∧ dot3) ∨ dot4`.
    pub fn is_dot(self) -> bool {
        (self.contains(DamageFlag::Dot)
            && self.contains(DamageFlag::Dot2)
            && self.contains(DamageFlag::Dot3))
            || self.contains(DamageFlag::Dot4)
    }

    pub fn is_crit(self) -> bool {
        self.contains(DamageFlag::Crit)
    }

    pub fn is_add_hit(self) -> bool {
        self.contains(DamageFlag::AddHit)
    }

    pub fn is_power(self) -> bool {
        self.contains(DamageFlag::Power)
    }

    pub fn is_fast(self) -> bool {
        self.contains(DamageFlag::Fast)
    }

    /// Display names of the elemental flags that are set, in table order.
    pub fn elements(self) -> impl Iterator<Item = &'static str> {
        ELEMENTS
            .iter()
            .filter(move |(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
    }

    /// Full name→bool view, for diagnostics.
    pub fn to_map(self) -> BTreeMap<&'static str, bool> {
        FLAG_TABLE
            .iter()
            .map(|&(_, _, flag)| (flag.name(), self.contains(flag)))
            .collect()
    }
}
