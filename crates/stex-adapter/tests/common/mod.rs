/*
[INPUT]:  Test configuration and mock server requirements
[OUTPUT]: Shared test utilities, fixtures, and mock helpers
[POS]:    Test infrastructure - shared across all test modules
[UPDATE]: When adding new test patterns or fixtures
*/

//! Common test utilities for stex-adapter tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use stex_adapter::ws::{Connection, Dialer, EventFrame, SocketSink, TransportConfig, TransportEvent};
use stex_adapter::{ClientConfig, Result, StexClient, StexError};
use tokio::sync::{Semaphore, mpsc};
use wiremock::MockServer;

/// Setup a mock HTTP server for testing
pub async fn setup_mock_server() -> MockServer {
    MockServer::start().await
}

/// Client pointed at the mock server, optionally carrying a token
pub fn client_for(server: &MockServer, token: Option<&str>) -> StexClient {
    let config = ClientConfig {
        base_url: server.uri(),
        ..ClientConfig::default()
    };
    match token {
        Some(token) => StexClient::with_token(config, token).expect("client init"),
        None => StexClient::with_config(config).expect("client init"),
    }
}

/// Mock API token for testing
pub fn mock_api_token() -> String {
    "test-api-token".to_string()
}

/// Sink that records every emitted frame and close call
pub struct RecordingSink {
    emitted: Mutex<Vec<(String, Value)>>,
    closes: AtomicUsize,
    fail_emit: AtomicBool,
    events: mpsc::Sender<TransportEvent>,
}

impl RecordingSink {
    fn new(events: mpsc::Sender<TransportEvent>) -> Self {
        Self {
            emitted: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
            fail_emit: AtomicBool::new(false),
            events,
        }
    }

    pub fn emitted(&self) -> Vec<(String, Value)> {
        self.emitted.lock().unwrap().clone()
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn fail_next_emits(&self) {
        self.fail_emit.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SocketSink for RecordingSink {
    async fn emit(&self, event: &str, payload: Value) -> Result<()> {
        if self.fail_emit.load(Ordering::SeqCst) {
            return Err(StexError::WebSocket("broken pipe".to_string()));
        }
        self.emitted
            .lock()
            .unwrap()
            .push((event.to_string(), payload));
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        // A real transport reports its own shutdown as well
        let _ = self
            .events
            .try_send(TransportEvent::Disconnected("client closed".to_string()));
        Ok(())
    }
}

/// Server side of one scripted connection
#[derive(Clone)]
pub struct MockSession {
    pub sink: Arc<RecordingSink>,
    events: mpsc::Sender<TransportEvent>,
}

impl MockSession {
    pub async fn send(&self, event: TransportEvent) {
        self.events.send(event).await.expect("dispatch task gone");
    }

    pub async fn connected(&self) {
        self.send(TransportEvent::Connected).await;
    }

    /// Tolerates a dispatch task that already stopped
    pub async fn disconnect(&self, reason: &str) {
        let _ = self
            .events
            .send(TransportEvent::Disconnected(reason.to_string()))
            .await;
    }

    pub async fn event(&self, name: &str, channel: Option<&str>, payload: Value) {
        self.send(TransportEvent::Event(EventFrame {
            name: name.to_string(),
            channel: channel.map(str::to_string),
            payload,
        }))
        .await;
    }
}

/// In-memory dialer; every successful dial opens a new `MockSession`
#[derive(Default)]
pub struct ScriptedDialer {
    fail_with: Option<String>,
    gate: Option<Semaphore>,
    dials: AtomicUsize,
    sessions: Mutex<Vec<MockSession>>,
}

impl ScriptedDialer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        })
    }

    /// Every dial blocks until `release` is called
    pub fn gated() -> Arc<Self> {
        Arc::new(Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        })
    }

    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    pub fn dial_count(&self) -> usize {
        self.dials.load(Ordering::SeqCst)
    }

    pub fn session(&self, index: usize) -> MockSession {
        self.sessions.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl Dialer for ScriptedDialer {
    async fn dial(&self, url: &str, _config: &TransportConfig) -> Result<Connection> {
        self.dials.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.acquire().await.expect("gate closed").forget();
        }
        if let Some(message) = &self.fail_with {
            return Err(StexError::WebSocket(format!("dial {url}: {message}")));
        }
        let (events_tx, events_rx) = mpsc::channel(64);
        let sink = Arc::new(RecordingSink::new(events_tx.clone()));
        self.sessions.lock().unwrap().push(MockSession {
            sink: Arc::clone(&sink),
            events: events_tx,
        });
        Ok(Connection {
            sink,
            events: events_rx,
        })
    }
}

/// Poll `condition` until it holds, failing the test after two seconds
pub async fn wait_until<F>(description: &str, condition: F)
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for {description}");
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

/// Collects callback invocations for later assertions
#[derive(Clone)]
pub struct Recorder<T> {
    calls: Arc<Mutex<Vec<T>>>,
}

impl<T: Clone> Recorder<T> {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn push(&self, value: T) {
        self.calls.lock().unwrap().push(value);
    }

    pub fn calls(&self) -> Vec<T> {
        self.calls.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}
