/*
[INPUT]:  Socket URL, TransportConfig, outbound events
[OUTPUT]: socket.io v2 / Engine.IO v3 connection over tokio-tungstenite
[POS]:    WebSocket layer - concrete transport behind the Dialer seam
[UPDATE]: When the server protocol revision or keepalive handling changes
*/

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, interval_at, sleep_until, timeout};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::tungstenite::protocol::WebSocketConfig;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async_with_config};
use tracing::{debug, info, warn};

use crate::http::client::truncate_for_log;
use crate::http::{Result, StexError};
use crate::ws::transport::{
    Connection, Dialer, EventFrame, SocketSink, TransportConfig, TransportEvent,
};

const EVENT_QUEUE_CAPACITY: usize = 256;
const OUTBOUND_QUEUE_CAPACITY: usize = 64;
const RAW_LOG_MAX_BYTES: usize = 1024;

const PING_FRAME: &str = "2";
const PONG_FRAME: &str = "3";
const DISCONNECT_FRAME: &str = "41";

/// Decoded Engine.IO / socket.io text packet
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    /// Engine.IO handshake (`0{...}`)
    Open(Value),
    Close,
    Ping,
    Pong,
    Noop,
    /// Namespace connect (`40`)
    Connect,
    /// Namespace disconnect (`41`)
    Disconnect,
    /// Event with its raw argument list (`42[...]`)
    Event(Vec<Value>),
    Ack,
    /// Server-signalled error (`44...`)
    Error(String),
}

impl Packet {
    pub fn decode(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| StexError::Protocol("empty frame".to_string()))?;
        let rest = chars.as_str();
        match kind {
            '0' => {
                if rest.is_empty() {
                    return Ok(Packet::Open(Value::Null));
                }
                Ok(Packet::Open(serde_json::from_str(rest).map_err(|err| {
                    StexError::Protocol(format!("invalid open packet: {err}"))
                })?))
            }
            '1' => Ok(Packet::Close),
            '2' => Ok(Packet::Ping),
            '3' => Ok(Packet::Pong),
            '5' | '6' => Ok(Packet::Noop),
            '4' => Self::decode_message(rest),
            other => Err(StexError::Protocol(format!(
                "unknown engine packet type `{other}`"
            ))),
        }
    }

    fn decode_message(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let kind = chars
            .next()
            .ok_or_else(|| StexError::Protocol("message packet without a type".to_string()))?;
        let body = chars.as_str();
        match kind {
            '0' => Ok(Packet::Connect),
            '1' => Ok(Packet::Disconnect),
            '2' => {
                let body = strip_namespace_and_id(body);
                let args: Vec<Value> = serde_json::from_str(body).map_err(|err| {
                    StexError::Protocol(format!(
                        "invalid event body `{}`: {err}",
                        truncate_for_log(body, RAW_LOG_MAX_BYTES)
                    ))
                })?;
                Ok(Packet::Event(args))
            }
            '3' => Ok(Packet::Ack),
            '4' => {
                let body = strip_namespace_and_id(body);
                let message = match serde_json::from_str::<Value>(body) {
                    Ok(Value::String(message)) => message,
                    Ok(other) => other.to_string(),
                    Err(_) => body.to_string(),
                };
                Ok(Packet::Error(message))
            }
            '5' | '6' => Err(StexError::Protocol(
                "binary socket.io packets are not supported".to_string(),
            )),
            other => Err(StexError::Protocol(format!(
                "unknown socket.io packet type `{other}`"
            ))),
        }
    }
}

// `/namespace,` prefix and numeric ack id both precede the JSON body
fn strip_namespace_and_id(body: &str) -> &str {
    let body = match body.strip_prefix('/') {
        Some(rest) => rest.split_once(',').map(|(_, tail)| tail).unwrap_or(""),
        None => body,
    };
    body.trim_start_matches(|c: char| c.is_ascii_digit())
}

/// Encode a named event as a `42[...]` text frame
pub fn encode_event(event: &str, payload: &Value) -> Result<String> {
    let args = serde_json::to_string(&(event, payload))?;
    Ok(format!("42{args}"))
}

enum Outbound {
    Frame {
        text: String,
        ack: oneshot::Sender<Result<()>>,
    },
    Close,
}

/// Write half handed to the channel manager
#[derive(Debug)]
pub struct SocketIoSink {
    outbound: mpsc::Sender<Outbound>,
    send_timeout: std::time::Duration,
}

#[async_trait]
impl SocketSink for SocketIoSink {
    async fn emit(&self, event: &str, payload: Value) -> Result<()> {
        let text = encode_event(event, &payload)?;
        let (ack, written) = oneshot::channel();
        self.outbound
            .send(Outbound::Frame { text, ack })
            .await
            .map_err(|_| StexError::NotConnected)?;
        match timeout(self.send_timeout, written).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(StexError::NotConnected),
            Err(_) => Err(StexError::Timeout {
                duration: self.send_timeout.as_secs(),
            }),
        }
    }

    async fn close(&self) -> Result<()> {
        // A driver that already exited has nothing left to close
        let _ = self.outbound.send(Outbound::Close).await;
        Ok(())
    }
}

/// Dials the exchange socket server
#[derive(Debug, Clone, Copy, Default)]
pub struct SocketIoDialer;

#[async_trait]
impl Dialer for SocketIoDialer {
    async fn dial(&self, url: &str, config: &TransportConfig) -> Result<Connection> {
        let ws_config = WebSocketConfig::default()
            .read_buffer_size(config.buffer_size)
            .write_buffer_size(config.buffer_size);

        let (stream, response) = timeout(
            config.receive_timeout,
            connect_async_with_config(url, Some(ws_config), false),
        )
        .await
        .map_err(|_| StexError::Timeout {
            duration: config.receive_timeout.as_secs(),
        })?
        .map_err(|err| StexError::WebSocket(format!("dial {url}: {err}")))?;

        info!(url, status = response.status().as_u16(), "ws connected");

        let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_QUEUE_CAPACITY);
        tokio::spawn(drive(stream, outbound_rx, event_tx, *config));

        Ok(Connection {
            sink: Arc::new(SocketIoSink {
                outbound: outbound_tx,
                send_timeout: config.send_timeout,
            }),
            events: event_rx,
        })
    }
}

type Stream = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn drive(
    stream: Stream,
    mut outbound: mpsc::Receiver<Outbound>,
    events: mpsc::Sender<TransportEvent>,
    config: TransportConfig,
) {
    let (mut write, mut read) = stream.split();
    let mut ping_timer = interval_at(Instant::now() + config.ping_interval, config.ping_interval);
    ping_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut pong_deadline: Option<Instant> = None;
    let mut receive_deadline = Instant::now() + config.receive_timeout;

    let reason = loop {
        tokio::select! {
            command = outbound.recv() => match command {
                Some(Outbound::Frame { text, ack }) => {
                    debug!(frame = %truncate_for_log(&text, RAW_LOG_MAX_BYTES), "ws frame out");
                    let result = match timeout(config.send_timeout, write.send(WsMessage::Text(text.into()))).await {
                        Ok(Ok(())) => Ok(()),
                        Ok(Err(err)) => Err(StexError::WebSocket(err.to_string())),
                        Err(_) => Err(StexError::Timeout { duration: config.send_timeout.as_secs() }),
                    };
                    let failed = result.as_ref().err().map(|err| err.to_string());
                    let _ = ack.send(result);
                    if let Some(err) = failed {
                        break format!("send failed: {err}");
                    }
                }
                Some(Outbound::Close) | None => {
                    let _ = timeout(
                        config.send_timeout,
                        write.send(WsMessage::Text(DISCONNECT_FRAME.into())),
                    )
                    .await;
                    let _ = timeout(config.send_timeout, write.close()).await;
                    break "client closed".to_string();
                }
            },
            _ = ping_timer.tick() => {
                if pong_deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    break "ping timeout".to_string();
                }
                if let Err(err) = write.send(WsMessage::Text(PING_FRAME.into())).await {
                    break format!("ping failed: {err}");
                }
                if pong_deadline.is_none() {
                    pong_deadline = Some(Instant::now() + config.ping_timeout);
                }
            }
            _ = sleep_until(receive_deadline) => {
                break "receive timeout".to_string();
            }
            incoming = read.next() => {
                receive_deadline = Instant::now() + config.receive_timeout;
                let text = match incoming {
                    Some(Ok(WsMessage::Text(text))) => text.to_string(),
                    Some(Ok(WsMessage::Binary(bytes))) => match String::from_utf8(bytes.to_vec()) {
                        Ok(text) => text,
                        Err(err) => {
                            warn!(bytes = bytes.len(), error = %err, "ws binary frame is not utf-8");
                            let event = TransportEvent::Error(StexError::Protocol(format!(
                                "binary frame is not utf-8: {err}"
                            )));
                            if events.send(event).await.is_err() {
                                break "event receiver dropped".to_string();
                            }
                            continue;
                        }
                    },
                    Some(Ok(WsMessage::Close(_))) => break "server closed".to_string(),
                    Some(Ok(_)) => continue,
                    Some(Err(err)) => break format!("read failed: {err}"),
                    None => break "stream ended".to_string(),
                };
                debug!(frame = %truncate_for_log(&text, RAW_LOG_MAX_BYTES), "ws frame in");

                let event = match Packet::decode(&text) {
                    Ok(Packet::Open(handshake)) => {
                        debug!(%handshake, "engine.io open");
                        continue;
                    }
                    Ok(Packet::Ping) => {
                        if let Err(err) = write.send(WsMessage::Text(PONG_FRAME.into())).await {
                            break format!("pong failed: {err}");
                        }
                        continue;
                    }
                    Ok(Packet::Pong) => {
                        pong_deadline = None;
                        continue;
                    }
                    Ok(Packet::Noop) | Ok(Packet::Ack) => continue,
                    Ok(Packet::Close) => break "server closed".to_string(),
                    Ok(Packet::Disconnect) => break "server disconnect".to_string(),
                    Ok(Packet::Connect) => TransportEvent::Connected,
                    Ok(Packet::Error(message)) => TransportEvent::Error(StexError::Protocol(message)),
                    Ok(Packet::Event(args)) => match EventFrame::from_args(args) {
                        Ok(frame) => TransportEvent::Event(frame),
                        Err(err) => TransportEvent::Error(err),
                    },
                    Err(err) => {
                        warn!(error = %err, "ws frame decode failed");
                        TransportEvent::Error(err)
                    }
                };
                if events.send(event).await.is_err() {
                    break "event receiver dropped".to_string();
                }
            }
        }
    };

    info!(reason = %reason, "ws connection finished");
    let _ = events.send(TransportEvent::Disconnected(reason)).await;
}
