/*
[INPUT]:  Connect/disconnect notifications from the dispatch task
[OUTPUT]: Race-free connected flag for callers polling the manager
[POS]:    WebSocket layer - connection state guard
[UPDATE]: When the connection state model changes
*/

use std::sync::{Mutex, PoisonError};

/// Connected flag; every read and write goes through one lock
#[derive(Debug, Default)]
pub struct ConnectionState {
    connected: Mutex<bool>,
}

impl ConnectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, connected: bool) {
        *self.connected.lock().unwrap_or_else(PoisonError::into_inner) = connected;
    }

    pub fn get(&self) -> bool {
        *self.connected.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
