//! Snapshot delivery.
//!
//! A tokio interval task polls [`CombatEngine::snapshot`] and publishes it
//! only when the total damage moved since the last publish. Raid signals are
//! forwarded to the same sink as named events.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;

use super::CombatEngine;
use crate::signal_processor::{GameSignal, SignalHandler};

pub const PERSONAL_STATS_EVENT: &str = "personal_stats";
pub const RAID_END_EVENT: &str = "raid_end";
pub const BOSS_SKILL_EVENT: &str = "boss_skill";
pub const ITEM_USE_EVENT: &str = "item_use";

/// Destination for published events, e.g. a websocket hub or an IPC pipe.
pub trait SnapshotSink: Send + Sync {
    fn publish(&self, event: &str, payload: Value);
}

fn to_payload<T: Serialize>(value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(error = %e, "[BROADCAST] Failed to serialize payload");
            None
        }
    }
}

// ─── Snapshot ticker ─────────────────────────────────────────────────────────

/// Running ticker task. Dropping it leaves the task running; call
/// [`SnapshotTicker::shutdown`] to stop it.
pub struct SnapshotTicker {
    shutdown_tx: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

impl SnapshotTicker {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "[BROADCAST] Snapshot ticker ended abnormally");
        }
    }
}

/// Spawn the polling task on the current tokio runtime.
pub fn spawn_snapshot_ticker(
    engine: Arc<CombatEngine>,
    sink: Arc<dyn SnapshotSink>,
    poll_interval: Duration,
) -> SnapshotTicker {
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);

    let handle = tokio::spawn(async move {
        tracing::info!(
            "[BROADCAST] Snapshot ticker started ({}ms)",
            poll_interval.as_millis()
        );
        let mut interval = time::interval(poll_interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Skip);
        let mut last_total: Option<i64> = None;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let stats = engine.snapshot();
                    if last_total == Some(stats.total_damage) {
                        continue;
                    }
                    last_total = Some(stats.total_damage);
                    if let Some(payload) = to_payload(&stats) {
                        sink.publish(PERSONAL_STATS_EVENT, payload);
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("[BROADCAST] Snapshot ticker shutting down");
                    break;
                }
            }
        }
    });

    SnapshotTicker {
        shutdown_tx,
        handle,
    }
}

// ─── Signal forwarding ───────────────────────────────────────────────────────

/// Forwards raid signals to a sink as named events.
pub struct SignalForwarder {
    sink: Arc<dyn SnapshotSink>,
}

impl SignalForwarder {
    pub fn new(sink: Arc<dyn SnapshotSink>) -> Self {
        Self { sink }
    }
}

impl SignalHandler for SignalForwarder {
    fn handle_signal(&mut self, signal: &GameSignal) {
        let (event, payload) = match signal {
            GameSignal::RaidEnded { boss_id } => (RAID_END_EVENT, json!({ "bossId": boss_id })),
            GameSignal::BossSkillUsed {
                boss_id,
                skill_name,
                count,
            } => (
                BOSS_SKILL_EVENT,
                json!({ "bossId": boss_id, "skillName": skill_name, "count": count }),
            ),
            GameSignal::ItemUsed { user_id, item_name } => (
                ITEM_USE_EVENT,
                json!({ "userId": user_id, "itemName": item_name }),
            ),
            _ => return,
        };
        tracing::debug!("[BROADCAST] Forwarding {}", signal.name());
        self.sink.publish(event, payload);
    }
}
