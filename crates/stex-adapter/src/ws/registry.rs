/*
[INPUT]:  Event names, optional channel filters, decode-and-dispatch closures
[OUTPUT]: Handlers matching an inbound event frame
[POS]:    WebSocket layer - per-connection handler registry
[UPDATE]: When dispatch matching rules change
*/

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use crate::http::Result;
use crate::ws::transport::EventFrame;

/// Identifies one registration inside a registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Type-erased decode-and-dispatch function
pub type EventHandler = Arc<dyn Fn(&Value) -> Result<()> + Send + Sync>;

struct Registration {
    id: HandlerId,
    event: String,
    channel: Option<String>,
    handler: EventHandler,
}

impl Registration {
    fn matches(&self, frame: &EventFrame) -> bool {
        if self.event != frame.name {
            return false;
        }
        match (&self.channel, &frame.channel) {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        }
    }
}

/// Additive event-name → handler map; registering never replaces an
/// existing handler for the same event.
#[derive(Default)]
pub struct HandlerRegistry {
    next_id: AtomicU64,
    entries: RwLock<Vec<Registration>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        event: impl Into<String>,
        channel: Option<String>,
        handler: EventHandler,
    ) -> HandlerId {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let registration = Registration {
            id,
            event: event.into(),
            channel,
            handler,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(registration);
        id
    }

    /// Drop a registration; returns the channel filter it carried
    pub fn remove(&self, id: HandlerId) -> Option<Option<String>> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let index = entries.iter().position(|entry| entry.id == id)?;
        Some(entries.remove(index).channel)
    }

    /// Whether any registration still filters on `channel`
    pub fn has_channel(&self, channel: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|entry| entry.channel.as_deref() == Some(channel))
    }

    /// Handlers for a frame in registration order. Cloned out so callbacks
    /// run without the lock held.
    pub fn matching(&self, frame: &EventFrame) -> Vec<EventHandler> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|entry| entry.matches(frame))
            .map(|entry| Arc::clone(&entry.handler))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.len())
            .finish()
    }
}
