/*
[INPUT]:  StreamConfig, lifecycle callbacks, cancellation token, channel subscriptions
[OUTPUT]: One live socket connection with typed event dispatch
[POS]:    WebSocket layer - channel manager (connection lifecycle and dispatch)
[UPDATE]: When connection lifecycle, auth or dispatch behavior changes
*/

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::http::{Result, StexError};
use crate::ws::channels::Channel;
use crate::ws::registry::{EventHandler, HandlerId, HandlerRegistry};
use crate::ws::socketio::SocketIoDialer;
use crate::ws::state::ConnectionState;
use crate::ws::transport::{Dialer, EventFrame, SocketSink, TransportConfig, TransportEvent};

/// socket.io endpoint of the exchange
pub const SOCKET_URL: &str = "wss://socket.stex.com/socket.io/?EIO=3&transport=websocket";

const SUBSCRIBE_EVENT: &str = "subscribe";
const UNSUBSCRIBE_EVENT: &str = "unsubscribe";

/// Socket connection settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    pub url: String,
    /// Bearer token attached to private channel subscriptions
    pub api_token: Option<String>,
    pub transport: TransportConfig,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            url: SOCKET_URL.to_string(),
            api_token: None,
            transport: TransportConfig::default(),
        }
    }
}

impl StreamConfig {
    pub fn with_token(api_token: impl Into<String>) -> Self {
        Self {
            api_token: Some(api_token.into()),
            ..Self::default()
        }
    }
}

type ConnectionCallback = Arc<dyn Fn() + Send + Sync>;
type DisconnectCallback = Arc<dyn Fn(&str) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&StexError) + Send + Sync>;

/// Caller hooks for connection-level events; all run on the dispatch task
#[derive(Clone, Default)]
pub struct LifecycleCallbacks {
    on_connection: Option<ConnectionCallback>,
    on_disconnect: Option<DisconnectCallback>,
    on_error: Option<ErrorCallback>,
}

impl LifecycleCallbacks {
    fn connected(&self) {
        if let Some(callback) = &self.on_connection {
            callback();
        }
    }

    fn disconnected(&self, reason: &str) {
        if let Some(callback) = &self.on_disconnect {
            callback(reason);
        }
    }

    fn error(&self, err: &StexError) {
        if let Some(callback) = &self.on_error {
            callback(err);
        }
    }
}

impl std::fmt::Debug for LifecycleCallbacks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleCallbacks")
            .field("on_connection", &self.on_connection.is_some())
            .field("on_disconnect", &self.on_disconnect.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// One live connection: its sink, handler set and close guard.
///
/// Created by a successful `connect` and never reused once closed.
pub struct ConnectionHandle {
    id: u64,
    sink: Arc<dyn SocketSink>,
    registry: HandlerRegistry,
    closed: AtomicBool,
    /// Flips to true once the server acknowledges the socket.io session
    established: watch::Sender<bool>,
    token: CancellationToken,
    authorization: String,
}

impl ConnectionHandle {
    fn new(id: u64, sink: Arc<dyn SocketSink>, token: CancellationToken, api_token: Option<&str>) -> Self {
        Self {
            id,
            sink,
            registry: HandlerRegistry::new(),
            closed: AtomicBool::new(false),
            established: watch::Sender::new(false),
            token,
            authorization: format!("Bearer {}", api_token.unwrap_or_default()),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn is_open(&self) -> bool {
        !self.closed.load(Ordering::Acquire)
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Resolve once the session is established; fails if the connection closes first
    async fn established(&self) -> Result<()> {
        let mut established = self.established.subscribe();
        tokio::select! {
            biased;
            _ = self.token.cancelled() => Err(StexError::NotConnected),
            result = established.wait_for(|up| *up) => result.map(|_| ()).map_err(|_| StexError::NotConnected),
        }
    }

    /// Close the socket; only the first call reaches the sink
    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.token.cancel();
        debug!(connection_id = self.id, "ws closing socket");
        self.sink.close().await
    }

    fn subscribe_payload(&self, channel: &str, private: bool) -> Value {
        let auth = if private {
            json!({ "headers": { "Authorization": self.authorization } })
        } else {
            json!({})
        };
        json!({ "channel": channel, "auth": auth })
    }

    async fn subscribe(&self, channel: &str, private: bool) -> Result<()> {
        if !self.is_open() {
            return Err(StexError::NotConnected);
        }
        self.sink
            .emit(SUBSCRIBE_EVENT, self.subscribe_payload(channel, private))
            .await?;
        info!(connection_id = self.id, channel, private, "ws subscription sent");
        Ok(())
    }

    async fn unsubscribe(&self, channel: &str) -> Result<()> {
        if !self.is_open() {
            return Err(StexError::NotConnected);
        }
        self.sink
            .emit(UNSUBSCRIBE_EVENT, json!({ "channel": channel }))
            .await?;
        info!(connection_id = self.id, channel, "ws unsubscription sent");
        Ok(())
    }

    fn dispatch(&self, frame: &EventFrame, callbacks: &LifecycleCallbacks) {
        let handlers = self.registry.matching(frame);
        if handlers.is_empty() {
            debug!(
                connection_id = self.id,
                event = %frame.name,
                channel = ?frame.channel,
                "ws event without handler"
            );
            return;
        }
        for handler in handlers {
            if let Err(err) = handler(&frame.payload) {
                warn!(connection_id = self.id, event = %frame.name, error = %err, "ws event dispatch failed");
                callbacks.error(&err);
            }
        }
    }
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("id", &self.id)
            .field("open", &self.is_open())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Returned by `subscribe_channel`; dropping it keeps the subscription
#[derive(Debug)]
pub struct SubscriptionHandle {
    id: HandlerId,
    channel: String,
    connection: Arc<ConnectionHandle>,
}

impl SubscriptionHandle {
    pub fn id(&self) -> HandlerId {
        self.id
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Stop delivering events to this subscription's callback.
    ///
    /// Sends `unsubscribe` once the last handler on the channel is gone and
    /// the connection is still open.
    pub async fn cancel(self) -> Result<()> {
        self.connection.registry.remove(self.id);
        if self.connection.registry.has_channel(&self.channel) || !self.connection.is_open() {
            return Ok(());
        }
        self.connection.unsubscribe(&self.channel).await
    }
}

struct ActiveConnection {
    handle: Arc<ConnectionHandle>,
    dispatch: JoinHandle<()>,
}

/// Owns one persistent socket connection and every channel subscription on it
pub struct ChannelManager {
    config: StreamConfig,
    dialer: Arc<dyn Dialer>,
    callbacks: LifecycleCallbacks,
    state: Arc<ConnectionState>,
    active: Mutex<Option<ActiveConnection>>,
    connecting: Mutex<()>,
    next_connection_id: AtomicU64,
}

impl ChannelManager {
    pub fn new(config: StreamConfig) -> Self {
        Self::with_dialer(config, Arc::new(SocketIoDialer))
    }

    pub fn with_dialer(config: StreamConfig, dialer: Arc<dyn Dialer>) -> Self {
        Self {
            config,
            dialer,
            callbacks: LifecycleCallbacks::default(),
            state: Arc::new(ConnectionState::new()),
            active: Mutex::new(None),
            connecting: Mutex::new(()),
            next_connection_id: AtomicU64::new(0),
        }
    }

    pub fn on_connection<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.callbacks.on_connection = Some(Arc::new(callback));
        self
    }

    pub fn on_disconnect<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + Send + Sync + 'static,
    {
        self.callbacks.on_disconnect = Some(Arc::new(callback));
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&StexError) + Send + Sync + 'static,
    {
        self.callbacks.on_error = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn is_connected(&self) -> bool {
        self.state.get()
    }

    /// Dial the socket and start dispatching.
    ///
    /// Returns once the dial completes; the session is up when
    /// `on_connection` fires. An open connection is closed first. Firing
    /// `cancel` closes the socket.
    pub async fn connect(&self, cancel: CancellationToken) -> Result<()> {
        // `active` stays unlocked during the dial; subscribers see `NotConnected`
        let _connecting = self.connecting.lock().await;
        let previous = self.active.lock().await.take();
        if let Some(previous) = previous {
            info!(connection_id = previous.handle.id, "ws replacing open connection");
            if let Err(err) = previous.handle.close().await {
                warn!(connection_id = previous.handle.id, error = %err, "ws close failed");
            }
            let _ = previous.dispatch.await;
        }

        let url = self.config.url.as_str();
        debug!(url, "ws dialing");
        let connection = match self.dialer.dial(url, &self.config.transport).await {
            Ok(connection) => connection,
            Err(err) => {
                warn!(url, error = %err, "ws dial failed");
                self.state.set(false);
                return Err(err);
            }
        };

        let id = self.next_connection_id.fetch_add(1, Ordering::Relaxed) + 1;
        let handle = Arc::new(ConnectionHandle::new(
            id,
            connection.sink,
            cancel.child_token(),
            self.config.api_token.as_deref(),
        ));

        let watcher = Arc::clone(&handle);
        tokio::spawn(async move {
            watcher.token.cancelled().await;
            if let Err(err) = watcher.close().await {
                warn!(connection_id = watcher.id, error = %err, "ws close failed");
            }
        });

        let dispatch = tokio::spawn(run_dispatch(
            Arc::clone(&handle),
            connection.events,
            Arc::clone(&self.state),
            self.callbacks.clone(),
        ));

        *self.active.lock().await = Some(ActiveConnection { handle, dispatch });
        Ok(())
    }

    /// Close the current connection and wait for `on_disconnect` to run
    pub async fn disconnect(&self) -> Result<()> {
        let Some(active) = self.active.lock().await.take() else {
            return Ok(());
        };
        let result = active.handle.close().await;
        let _ = active.dispatch.await;
        result
    }

    async fn live(&self) -> Result<Arc<ConnectionHandle>> {
        match self.active.lock().await.as_ref() {
            Some(active) if active.handle.is_open() => Ok(Arc::clone(&active.handle)),
            _ => Err(StexError::NotConnected),
        }
    }

    /// Wait until the server acknowledges the session (`on_connection`).
    ///
    /// Channels subscribed before that point may be dropped by the server.
    /// Fails with `NotConnected` when the connection closes first and with
    /// `Timeout` once `timeout` elapses.
    pub async fn wait_connected(&self, timeout: Duration) -> Result<()> {
        let connection = self.live().await?;
        match tokio::time::timeout(timeout, connection.established()).await {
            Ok(result) => result,
            Err(_) => Err(StexError::Timeout {
                duration: timeout.as_secs(),
            }),
        }
    }

    /// Send a raw `subscribe` frame; no acknowledgement is awaited
    pub async fn subscribe(&self, channel: &str, requires_auth: bool) -> Result<()> {
        self.live().await?.subscribe(channel, requires_auth).await
    }

    /// Attach a typed handler to every frame of `event` on the current connection
    pub async fn register_handler<T, F>(&self, event: &str, callback: F) -> Result<HandlerId>
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) + Send + Sync + 'static,
    {
        let connection = self.live().await?;
        Ok(connection
            .registry
            .register(event, None, typed_handler(event, callback)))
    }

    /// Validate a channel, register its typed handler and subscribe to it
    pub async fn subscribe_channel<C, F>(&self, channel: &C, callback: F) -> Result<SubscriptionHandle>
    where
        C: Channel,
        F: Fn(&str, C::Message) + Send + Sync + 'static,
    {
        let name = channel.name()?;
        let tag = channel.tag()?;
        let connection = self.live().await?;

        let handler = typed_handler(C::EVENT, move |message: C::Message| callback(&tag, message));
        let id = connection
            .registry
            .register(C::EVENT, Some(name.clone()), handler);

        if let Err(err) = connection.subscribe(&name, C::PRIVATE).await {
            connection.registry.remove(id);
            return Err(err);
        }

        Ok(SubscriptionHandle {
            id,
            channel: name,
            connection,
        })
    }
}

impl std::fmt::Debug for ChannelManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelManager")
            .field("url", &self.config.url)
            .field("connected", &self.is_connected())
            .field("callbacks", &self.callbacks)
            .finish_non_exhaustive()
    }
}

fn typed_handler<T, F>(event: &str, callback: F) -> EventHandler
where
    T: DeserializeOwned + 'static,
    F: Fn(T) + Send + Sync + 'static,
{
    let event = event.to_string();
    Arc::new(move |payload: &Value| {
        let message = T::deserialize(payload).map_err(|source| StexError::Decode {
            event: event.clone(),
            source,
        })?;
        callback(message);
        Ok(())
    })
}

async fn run_dispatch(
    handle: Arc<ConnectionHandle>,
    mut events: mpsc::Receiver<TransportEvent>,
    state: Arc<ConnectionState>,
    callbacks: LifecycleCallbacks,
) {
    let reason = loop {
        tokio::select! {
            biased;
            _ = handle.token.cancelled() => break "connection cancelled".to_string(),
            event = events.recv() => match event {
                Some(TransportEvent::Connected) => {
                    state.set(true);
                    handle.established.send_replace(true);
                    info!(connection_id = handle.id, "ws session established");
                    callbacks.connected();
                }
                Some(TransportEvent::Error(err)) => {
                    warn!(connection_id = handle.id, error = %err, "ws protocol error");
                    callbacks.error(&err);
                }
                Some(TransportEvent::Event(frame)) => handle.dispatch(&frame, &callbacks),
                Some(TransportEvent::Disconnected(reason)) => break reason,
                None => break "transport closed".to_string(),
            }
        }
    };

    if let Err(err) = handle.close().await {
        warn!(connection_id = handle.id, error = %err, "ws close failed");
    }
    state.set(false);
    info!(connection_id = handle.id, reason = %reason, "ws disconnected");
    callbacks.disconnected(&reason);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingSink {
        emitted: StdMutex<Vec<(String, Value)>>,
        closes: AtomicU64,
    }

    #[async_trait]
    impl SocketSink for RecordingSink {
        async fn emit(&self, event: &str, payload: Value) -> Result<()> {
            self.emitted.lock().unwrap().push((event.to_string(), payload));
            Ok(())
        }

        async fn close(&self) -> Result<()> {
            self.closes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn handle_with(sink: Arc<RecordingSink>, token: Option<&str>) -> ConnectionHandle {
        ConnectionHandle::new(1, sink, CancellationToken::new(), token)
    }

    #[tokio::test]
    async fn test_private_subscribe_carries_bearer() {
        let sink = Arc::new(RecordingSink::default());
        let handle = handle_with(Arc::clone(&sink), Some("tok"));
        handle.subscribe("private-trade_u1c2", true).await.unwrap();
        handle.subscribe("rate", false).await.unwrap();

        let emitted = sink.emitted.lock().unwrap();
        assert_eq!(emitted[0].0, "subscribe");
        assert_eq!(
            emitted[0].1,
            json!({"channel": "private-trade_u1c2", "auth": {"headers": {"Authorization": "Bearer tok"}}})
        );
        assert_eq!(emitted[1].1, json!({"channel": "rate", "auth": {}}));
    }

    #[tokio::test]
    async fn test_private_subscribe_without_token_keeps_shape() {
        let sink = Arc::new(RecordingSink::default());
        let handle = handle_with(Arc::clone(&sink), None);
        handle.subscribe("private-balance_changed_w_1", true).await.unwrap();

        let emitted = sink.emitted.lock().unwrap();
        assert_eq!(emitted[0].1["auth"]["headers"]["Authorization"], json!("Bearer "));
    }

    #[tokio::test]
    async fn test_close_reaches_sink_once() {
        let sink = Arc::new(RecordingSink::default());
        let handle = handle_with(Arc::clone(&sink), None);
        handle.close().await.unwrap();
        handle.close().await.unwrap();
        assert_eq!(sink.closes.load(Ordering::SeqCst), 1);
        assert!(!handle.is_open());
        assert!(matches!(
            handle.subscribe("rate", false).await,
            Err(StexError::NotConnected)
        ));
    }

    #[test]
    fn test_typed_handler_reports_decode_errors() {
        let handler = typed_handler("App\\\\Events\\\\Ticker", |_: crate::ws::RateMessage| {});
        let err = handler(&json!({"id": "not a number"})).unwrap_err();
        match err {
            StexError::Decode { event, .. } => assert_eq!(event, r"App\\Events\\Ticker"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(handler(&json!({"id": 1})).is_ok());
    }

    #[tokio::test]
    async fn test_subscribe_before_connect_is_not_connected() {
        let manager = ChannelManager::new(StreamConfig::default());
        assert!(matches!(
            manager.subscribe("rate", false).await,
            Err(StexError::NotConnected)
        ));
        assert!(!manager.is_connected());
    }
}
