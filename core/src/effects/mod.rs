//! Buff tracking
//!
//! This module provides:
//! - **Active instances**: runtime state of buffs currently on a target
//! - **Tracker**: buff lifecycle, per-user statistics and stat bonuses
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                   CombatEvent::BuffStart/Update                  │
//! │     "instance 0a1b.. of buff 500 from 1 on 2, stack 3"           │
//! └─────────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                  BuffInstance (runtime state)                    │
//! │        indexed by caster and by target for effect lookup         │
//! └─────────────────────────────────────────────────────────────────┘
//!                 │                               │
//!                 ▼                               ▼
//!   UserBuffStats (cast / received)     BuffEffect on the target
//!                 │                               │
//!                 ▼                               ▼
//!        snapshots and uptime            damage bonus at attribution
//! ```

mod active;
pub mod tracker;


pub use active::{BuffInstance, BuffRole};
pub use tracker::{BuffTracker, calculate_uptime};
