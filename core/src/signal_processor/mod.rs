//! Event routing and raid-level signals.
//!
//! - **processor**: pending-HP attribution and per-event routing into the
//!   session ledgers
//! - **raid_state**: boss tracking and boss skill counts
//! - **signal / handler**: what the processor reports and who listens

mod handler;
pub mod processor;
mod raid_state;
mod signal;

#[cfg(test)]
mod processor_tests;

pub use handler::SignalHandler;
pub use processor::{EventProcessor, set_boss};
pub use raid_state::{BossTransition, RaidState};
pub use signal::GameSignal;
