//! Session state and the assembled engine.
//!
//! - **cache**: the ledgers shared between the writer and snapshot readers
//! - **engine**: segment-in, signals-out pipeline and control operations
//! - **broadcast**: periodic snapshot publishing and signal forwarding

pub mod broadcast;
pub mod cache;
pub mod engine;

pub use broadcast::{SignalForwarder, SnapshotSink, SnapshotTicker, spawn_snapshot_ticker};
pub use cache::SessionCache;
pub use engine::{CombatEngine, IngestReport};
