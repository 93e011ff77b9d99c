//! Runtime state of one live buff instance.

use crate::combat_log::BuffEvent;

/// Which side of a buff a subject's statistics describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuffRole {
    /// The subject applied the buff.
    Cast,
    /// The subject carries the buff.
    Received,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BuffInstance {
    pub instance_key: String,
    pub buff_id: i64,
    pub caster_id: i64,
    pub target_id: i64,
    pub stack: i32,
    /// Reset to "now" when statistics are rebased.
    pub started_at: i64,
    pub last_updated_at: i64,
}

impl BuffInstance {
    pub fn from_event(event: &BuffEvent, now: i64) -> Self {
        Self {
            instance_key: event.instance_key.clone(),
            buff_id: event.buff_id,
            caster_id: event.caster_id,
            target_id: event.target_id,
            stack: event.stack,
            started_at: now,
            last_updated_at: now,
        }
    }

    /// (subject, role) pairs whose statistics this instance feeds.
    pub fn subjects(&self) -> [(i64, BuffRole); 2] {
        [
            (self.caster_id, BuffRole::Cast),
            (self.target_id, BuffRole::Received),
        ]
    }
}
