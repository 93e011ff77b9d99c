pub mod capture;
pub mod combat_log;
pub mod context;
pub mod effects;
pub mod encounter;
pub mod error;
pub mod game_data;
pub mod signal_processor;
pub mod state;

// Re-exports for convenience
pub use capture::{CaptureService, ReplaySource, Segment, SegmentSource, StreamReassembler};
pub use combat_log::{CombatEvent, DamageFlag, DamageFlags, decode};
pub use context::{AppConfigExt, Clock, ManualClock, SharedClock, SystemClock};
pub use error::{CaptureError, CatalogError, ConfigError};
pub use game_data::{Catalog, CatalogHandle};
pub use signal_processor::{EventProcessor, GameSignal, SignalHandler};
pub use state::{CombatEngine, SessionCache, SnapshotSink, spawn_snapshot_ticker};

pub use raidlens_types::{AppConfig, PersonalStats, UserBuffStats, UserBuffSummary};
