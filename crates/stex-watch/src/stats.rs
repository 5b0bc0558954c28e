/*
[INPUT]:  Event, error and session notifications from channel callbacks
[OUTPUT]: Per-channel event counters for logging and tests
[POS]:    Observation layer - watch counters
[UPDATE]: When new counters are reported
*/

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

/// Counters shared by every callback of one watcher
#[derive(Debug, Default)]
pub struct WatchStats {
    events: Mutex<BTreeMap<String, u64>>,
    errors: AtomicU64,
    sessions: AtomicU64,
}

impl WatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_event(&self, channel: &str) {
        let mut events = self.events.lock().unwrap_or_else(PoisonError::into_inner);
        *events.entry(channel.to_string()).or_default() += 1;
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_session(&self) {
        self.sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn events(&self, channel: &str) -> u64 {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(channel)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_events(&self) -> u64 {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .sum()
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }

    /// Sessions that reached the socket.io connect packet
    pub fn sessions(&self) -> u64 {
        self.sessions.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
