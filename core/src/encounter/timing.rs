//! Combat session timing.
//!
//! A session starts at its first recorded hit and is extended by every
//! later one. Per-target windows run from the first to the last hit on that
//! target. Readers load the atomics independently; a snapshot may pair a
//! start and end from slightly different instants.

use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;

/// Epoch-millisecond window. Zero means "not set".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: i64,
    pub end: i64,
}

impl TimeWindow {
    /// Whole seconds from start to end, when both are set.
    pub fn duration_secs(&self) -> Option<i64> {
        (self.start > 0 && self.end > 0).then(|| (self.end - self.start) / 1000)
    }
}

#[derive(Debug, Default)]
pub struct SessionTiming {
    start: AtomicI64,
    end: AtomicI64,
    by_target: DashMap<i64, TimeWindow>,
}

impl SessionTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time of the last recorded hit, 0 before the first.
    pub fn last_activity(&self) -> i64 {
        self.end.load(Ordering::Acquire)
    }

    /// Open a fresh session at `now`. Per-target windows are dropped.
    pub fn begin(&self, now: i64) {
        self.by_target.clear();
        self.end.store(0, Ordering::Release);
        self.start.store(now, Ordering::Release);
    }

    pub fn extend(&self, target_id: i64, now: i64) {
        self.end.store(now, Ordering::Release);
        self.by_target
            .entry(target_id)
            .and_modify(|w| w.end = now)
            .or_insert(TimeWindow {
                start: now,
                end: now,
            });
    }

    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start.load(Ordering::Acquire),
            end: self.end.load(Ordering::Acquire),
        }
    }

    pub fn target_window(&self, target_id: i64) -> Option<TimeWindow> {
        self.by_target.get(&target_id).map(|w| *w)
    }

    pub fn clear(&self) {
        self.start.store(0, Ordering::Release);
        self.end.store(0, Ordering::Release);
        self.by_target.clear();
    }
}
