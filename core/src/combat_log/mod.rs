//! Protocol message decoding.
//!
//! ```text
//! DecodedMessage { type_code, payload }
//!          │
//!          ▼  PacketType::from_code (phf)
//!   decode() ── fixed-offset layout ──► Option<CombatEvent>
//! ```

mod decoder;
mod event;
mod flags;
mod packet_type;

#[cfg(test)]
mod decoder_tests;

pub use decoder::decode;
pub use event::{
    ActionEvent, AttackEvent, BuffEndEvent, BuffEvent, CombatEvent, DieBlowEvent, ItemUseEvent,
    SelfDamageEvent,
};
pub use flags::{DamageFlag, DamageFlags, ELEMENTS, FLAG_BLOCK_LEN};
pub use packet_type::{PacketType, is_diagnostic};
