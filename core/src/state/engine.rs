//! The assembled pipeline.
//!
//! ```text
//! ingest_segment(seq, bytes)
//!     │
//!     ▼
//! StreamReassembler ──peek──▶ frame::extract ──▶ decode ──▶ EventProcessor ──▶ SessionCache
//!     ▲                                                          │
//!     └──────────── consume(bytes_consumed) ◀───────────────────┘
//!                                                                 │
//!                                                     GameSignal ─▶ SignalHandlers
//! ```
//!
//! Writer-side state sits behind one mutex that only the capture thread
//! takes in steady state. Snapshot readers go straight to the shared
//! [`SessionCache`] and never contend on it.

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use raidlens_types::{AppConfig, PersonalStats, UserBuffSummary};

use super::SessionCache;
use crate::capture::{StreamReassembler, extract};
use crate::combat_log::decode;
use crate::context::{AppConfigExt, SharedClock, system_clock};
use crate::error::CatalogError;
use crate::game_data::CatalogHandle;
use crate::signal_processor::{EventProcessor, GameSignal, SignalHandler, set_boss};

type BoxedHandler = Box<dyn SignalHandler + Send>;

struct Pipeline {
    reassembler: StreamReassembler,
    processor: EventProcessor,
}

/// Outcome of one ingested segment.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub events: usize,
    pub bytes_consumed: usize,
    pub signals: Vec<GameSignal>,
}

pub struct CombatEngine {
    cache: Arc<SessionCache>,
    pipeline: Mutex<Pipeline>,
    handlers: Mutex<Vec<BoxedHandler>>,
}

impl CombatEngine {
    pub fn new(config: &AppConfig, catalog: Arc<CatalogHandle>, clock: SharedClock) -> Self {
        Self {
            cache: Arc::new(SessionCache::new(catalog, clock, config.combat)),
            pipeline: Mutex::new(Pipeline {
                reassembler: StreamReassembler::new(config.reassembly),
                processor: EventProcessor::new(config.combat.self_damage_ceiling),
            }),
            handlers: Mutex::new(Vec::new()),
        }
    }

    /// Engine on the system clock with the catalog from the configured
    /// directory, or an empty one when it cannot be loaded.
    pub fn from_config(config: &AppConfig) -> Self {
        let catalog = Arc::new(CatalogHandle::load_or_empty(config.catalog_dir()));
        Self::new(config, catalog, system_clock())
    }

    pub fn cache(&self) -> Arc<SessionCache> {
        self.cache.clone()
    }

    fn pipeline(&self) -> std::sync::MutexGuard<'_, Pipeline> {
        self.pipeline.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // --- Writer side ---

    /// Feed one TCP segment through the whole pipeline and dispatch the
    /// signals it raised.
    pub fn ingest_segment(&self, seq: u32, payload: &[u8]) -> IngestReport {
        let report = {
            let mut pipeline = self.pipeline();
            let Pipeline {
                reassembler,
                processor,
            } = &mut *pipeline;

            reassembler.add_segment(seq, payload);
            let (events, bytes_consumed) = {
                let scan = extract(reassembler.peek());
                let events: Vec<_> = scan
                    .messages
                    .iter()
                    .filter_map(|m| decode(m.type_code, m.payload))
                    .collect();
                (events, scan.bytes_consumed)
            };
            reassembler.consume(bytes_consumed);

            let mut report = IngestReport {
                events: events.len(),
                bytes_consumed,
                signals: Vec::new(),
            };
            for event in events {
                report
                    .signals
                    .extend(processor.process_event(event, &self.cache));
            }
            report
        };

        self.dispatch_signals(&report.signals);
        report
    }

    /// Drop all reassembly state; the next segment anchors a new stream.
    pub fn reset_stream(&self) {
        self.pipeline().reassembler.reset();
        tracing::info!("[REASSEMBLY] Stream reset");
    }

    // --- Control ---

    /// Clear every ledger and the writer-side attribution state.
    pub fn clear_all(&self, preserve_recent_buffs: bool) {
        // Held across both clears so no hit lands between ledger steps.
        let mut pipeline = self.pipeline();
        pipeline.processor.clear();
        self.cache.clear_all(preserve_recent_buffs);
        drop(pipeline);
        tracing::info!(
            "[COMBAT-STATE] Cleared all statistics (preserve buffs: {})",
            preserve_recent_buffs
        );
    }

    pub fn set_boss_id(&self, boss_id: i64) {
        // Serialized with the writer so the rebase never interleaves with a hit.
        let signal = {
            let _pipeline = self.pipeline();
            set_boss(&self.cache, boss_id)
        };
        if let Some(signal) = signal {
            self.dispatch_signals(std::slice::from_ref(&signal));
        }
    }

    pub fn current_boss_id(&self) -> Option<i64> {
        self.cache.raid.boss_id()
    }

    pub fn reload_catalog(&self, dir: &Path) -> Result<(), CatalogError> {
        self.cache.catalog.reload(dir)
    }

    // --- Readers ---

    pub fn snapshot(&self) -> PersonalStats {
        self.cache.snapshot()
    }

    pub fn buff_summary(&self, user_id: i64) -> UserBuffSummary {
        self.cache.buffs.user_buff_summary(user_id)
    }

    // --- Signals ---

    /// Register a signal handler to receive game signals
    pub fn add_signal_handler(&self, handler: BoxedHandler) {
        self.handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(handler);
    }

    pub fn dispatch_signals(&self, signals: &[GameSignal]) {
        if signals.is_empty() {
            return;
        }
        let mut handlers = self.handlers.lock().unwrap_or_else(PoisonError::into_inner);
        for handler in handlers.iter_mut() {
            handler.handle_signals(signals);
        }
    }
}
