//! Persisted application settings.
//!
//! Every field has a default so a partial (or missing) config file still
//! produces a complete [`AppConfig`]. Loading and saving live in the core
//! crate; this module is pure data.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default capture filter: game server traffic towards the client.
pub const DEFAULT_CAPTURE_FILTER: &str = "tcp and src port 16000";
/// Settle delay between stopping and restarting capture.
pub const DEFAULT_RESTART_SETTLE_MS: u64 = 2_000;
/// Largest circular sequence distance still treated as the same stream.
pub const DEFAULT_MAX_SEQ_DISTANCE: i64 = 10_000;
/// Reassembly buffer cap; the oldest half is dropped beyond this.
pub const DEFAULT_MAX_BUFFER_BYTES: usize = 1024 * 64;
/// Inactivity after which the next hit starts a fresh combat session.
pub const DEFAULT_COMBAT_TIMEOUT_MS: i64 = 60_000;
/// Self-damage values above this are corrupted wire values.
pub const DEFAULT_SELF_DAMAGE_CEILING: i64 = 2_095_071_572;
/// Snapshot poll interval for the delivery layer.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub capture: CaptureSettings,
    pub reassembly: ReassemblySettings,
    pub combat: CombatSettings,
    pub delivery: DeliverySettings,
    pub catalog: CatalogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureSettings {
    /// BPF-style predicate handed to the capture device.
    pub filter: String,
    /// Device identifier; `None` lets the device layer choose.
    pub interface: Option<String>,
    pub restart_settle_ms: u64,
    /// Poll timeout for a single device read.
    pub read_timeout_ms: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            filter: DEFAULT_CAPTURE_FILTER.to_string(),
            interface: None,
            restart_settle_ms: DEFAULT_RESTART_SETTLE_MS,
            read_timeout_ms: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReassemblySettings {
    pub max_seq_distance: i64,
    pub max_buffer_bytes: usize,
}

impl Default for ReassemblySettings {
    fn default() -> Self {
        Self {
            max_seq_distance: DEFAULT_MAX_SEQ_DISTANCE,
            max_buffer_bytes: DEFAULT_MAX_BUFFER_BYTES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatSettings {
    pub timeout_ms: i64,
    pub self_damage_ceiling: i64,
}

impl Default for CombatSettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_COMBAT_TIMEOUT_MS,
            self_damage_ceiling: DEFAULT_SELF_DAMAGE_CEILING,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeliverySettings {
    pub poll_interval_ms: u64,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CatalogSettings {
    /// Directory holding `skills.json` and `buffs.json`.
    pub dir: Option<PathBuf>,
}
