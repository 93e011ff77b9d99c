//! Error types for the fallible edges of the engine.
//!
//! Decoding and ledger updates never fail; they drop bad input. Only the
//! places that touch the outside world (catalog files, capture devices,
//! config storage) return these.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("catalog directory not found: {0}")]
    MissingDir(PathBuf),

    #[error("failed to read catalog file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse catalog file {path}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to open capture device {device}: {reason}")]
    DeviceOpen { device: String, reason: String },

    #[error("capture read failed: {0}")]
    Read(String),

    #[error("failed to open replay file {path}")]
    ReplayOpen {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("truncated replay record at byte {offset}")]
    ReplayTruncated { offset: usize },

    #[error("capture thread could not be spawned")]
    Spawn(#[source] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config storage error")]
    Store(#[from] confy::ConfyError),
}
