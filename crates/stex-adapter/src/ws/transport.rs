/*
[INPUT]:  Socket URL and fixed keepalive/timeout constants
[OUTPUT]: Dialer/SocketSink seams and the transport event stream
[POS]:    WebSocket layer - transport abstraction under the channel manager
[UPDATE]: When the wire protocol or transport constants change
*/

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::http::{Result, StexError};

pub const PING_INTERVAL: Duration = Duration::from_secs(15);
pub const PING_TIMEOUT: Duration = Duration::from_secs(60);
pub const RECEIVE_TIMEOUT: Duration = Duration::from_secs(60);
pub const SEND_TIMEOUT: Duration = Duration::from_secs(60);
pub const BUFFER_SIZE: usize = 32 * 1024;

/// Keepalive and timeout settings handed to the dialer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportConfig {
    pub ping_interval: Duration,
    pub ping_timeout: Duration,
    pub receive_timeout: Duration,
    pub send_timeout: Duration,
    pub buffer_size: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            ping_interval: PING_INTERVAL,
            ping_timeout: PING_TIMEOUT,
            receive_timeout: RECEIVE_TIMEOUT,
            send_timeout: SEND_TIMEOUT,
            buffer_size: BUFFER_SIZE,
        }
    }
}

/// One named application event.
///
/// `channel` is set when the server names the channel ahead of the payload
/// (`[event, channel, payload]`); `payload` is always the last argument.
#[derive(Debug, Clone, PartialEq)]
pub struct EventFrame {
    pub name: String,
    pub channel: Option<String>,
    pub payload: Value,
}

impl EventFrame {
    /// Build a frame from the argument list of an event packet
    pub fn from_args(mut args: Vec<Value>) -> Result<Self> {
        if args.is_empty() {
            return Err(StexError::Protocol("event packet without a name".to_string()));
        }
        let name = match args.remove(0) {
            Value::String(name) => name,
            other => {
                return Err(StexError::Protocol(format!(
                    "event name must be a string, got {other}"
                )));
            }
        };
        let payload = args.pop().unwrap_or(Value::Null);
        let channel = match args.first() {
            Some(Value::String(channel)) => Some(channel.clone()),
            _ => None,
        };
        Ok(Self {
            name,
            channel,
            payload,
        })
    }
}

/// What the transport reports to the dispatch task, in arrival order
#[derive(Debug)]
pub enum TransportEvent {
    /// Namespace connect acknowledged by the server
    Connected,
    /// Connection is gone; no further events follow
    Disconnected(String),
    /// Malformed frame or server-signalled error; the connection stays open
    Error(StexError),
    Event(EventFrame),
}

/// Write half of a live connection
#[async_trait]
pub trait SocketSink: Send + Sync {
    /// Send one named event with a JSON payload
    async fn emit(&self, event: &str, payload: Value) -> Result<()>;

    /// Close the underlying socket
    async fn close(&self) -> Result<()>;
}

/// A freshly dialled connection: its sink plus the inbound event stream
pub struct Connection {
    pub sink: Arc<dyn SocketSink>,
    pub events: mpsc::Receiver<TransportEvent>,
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

/// Opens connections; swapped for an in-memory script in tests
#[async_trait]
pub trait Dialer: Send + Sync {
    async fn dial(&self, url: &str, config: &TransportConfig) -> Result<Connection>;
}
