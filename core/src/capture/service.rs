//! Capture thread lifecycle.
//!
//! One thread pulls segments from a [`SegmentSource`] and feeds the engine.
//! It is the only writer of the pipeline. Restart tears the thread down,
//! forgets the stream and waits for the device to settle before starting a
//! fresh source.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use raidlens_types::CaptureSettings;

use super::source::SegmentSource;
use crate::error::CaptureError;
use crate::state::CombatEngine;

/// Pause after a failed read before trying again.
const READ_ERROR_BACKOFF: Duration = Duration::from_secs(1);
/// Granularity at which a sleeping worker notices a stop request.
const STOP_POLL: Duration = Duration::from_millis(50);

/// Opens a fresh source for every (re)start.
pub type SourceFactory =
    Arc<dyn Fn(&CaptureSettings) -> Result<Box<dyn SegmentSource>, CaptureError> + Send + Sync>;

struct Worker {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

pub struct CaptureService {
    engine: Arc<CombatEngine>,
    settings: CaptureSettings,
    open_source: SourceFactory,
    worker: Option<Worker>,
}

impl CaptureService {
    pub fn new(engine: Arc<CombatEngine>, settings: CaptureSettings, open_source: SourceFactory) -> Self {
        Self {
            engine,
            settings,
            open_source,
            worker: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| !w.handle.is_finished())
    }

    /// Open the source and start the capture thread. A running thread is
    /// left alone.
    pub fn start(&mut self) -> Result<(), CaptureError> {
        if self.is_running() {
            return Ok(());
        }
        let source = (self.open_source)(&self.settings)?;
        let stop = Arc::new(AtomicBool::new(false));

        let engine = self.engine.clone();
        let thread_stop = stop.clone();
        let handle = thread::Builder::new()
            .name("raidlens-capture".into())
            .spawn(move || run_capture(source, engine, thread_stop))
            .map_err(CaptureError::Spawn)?;

        tracing::info!(
            "[CAPTURE] Started on {} with filter '{}'",
            self.settings.interface.as_deref().unwrap_or("default device"),
            self.settings.filter
        );
        self.worker = Some(Worker { stop, handle });
        Ok(())
    }

    /// Stop the capture thread and wait for it to exit.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        worker.stop.store(true, Ordering::Release);
        if worker.handle.join().is_err() {
            tracing::warn!("[CAPTURE] Capture thread panicked");
        }
        tracing::info!("[CAPTURE] Stopped");
    }

    /// Stop, reset the stream, wait for the device to settle, start again.
    pub fn restart(&mut self) -> Result<(), CaptureError> {
        self.stop();
        self.engine.reset_stream();
        thread::sleep(Duration::from_millis(self.settings.restart_settle_ms));
        self.start()
    }
}

impl Drop for CaptureService {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_capture(mut source: Box<dyn SegmentSource>, engine: Arc<CombatEngine>, stop: Arc<AtomicBool>) {
    while !stop.load(Ordering::Acquire) {
        match source.next_segment() {
            Ok(Some(segment)) => {
                engine.ingest_segment(segment.seq, &segment.payload);
            }
            Ok(None) => {
                if source.is_exhausted() {
                    tracing::info!("[CAPTURE] Source exhausted");
                    break;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "[CAPTURE] Read failed, backing off");
                if source.is_exhausted() {
                    break;
                }
                sleep_unless_stopped(READ_ERROR_BACKOFF, &stop);
            }
        }
    }
}

fn sleep_unless_stopped(total: Duration, stop: &AtomicBool) {
    let mut slept = Duration::ZERO;
    while slept < total && !stop.load(Ordering::Acquire) {
        thread::sleep(STOP_POLL);
        slept += STOP_POLL;
    }
}
