//! Damage aggregation for the current combat session.
//!
//! - **ledger**: the single-writer damage aggregates and combat timeout
//! - **metrics**: counter structs the ledger stores
//! - **timing**: session and per-target windows
//! - **summary**: ledger → [`raidlens_types::PersonalStats`]

mod ledger;
mod metrics;
pub mod summary;
mod timing;

pub use ledger::{DamageLedger, SessionStart};
pub use metrics::{DamageCounters, DpsTotals, SkillDetail, SkillTotals, TargetDamage};
pub use summary::{SnapshotContext, personal_stats};
pub use timing::{SessionTiming, TimeWindow};
