/*
[INPUT]:  Local WebSocket server speaking Engine.IO v3 / socket.io v2
[OUTPUT]: Test results for the real transport under the channel manager
[POS]:    Integration tests - socket.io transport
[UPDATE]: When framing, keepalive or close handling changes
*/

mod common;

use std::time::Duration;

use common::{Recorder, wait_until};
use futures_util::{SinkExt, StreamExt};
use serde_json::{Value, json};
use stex_adapter::ws::{RateMessage, TransportConfig};
use stex_adapter::{ChannelManager, RateChannel, StreamConfig};
use tokio::net::{TcpListener, TcpStream};
use tokio_test::assert_ok;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{WebSocketStream, accept_async};
use tokio_util::sync::CancellationToken;

const HANDSHAKE: &str = r#"0{"sid":"test","upgrades":[],"pingInterval":25000,"pingTimeout":60000}"#;

async fn listen() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let url = format!("ws://{addr}/socket.io/?EIO=3&transport=websocket");
    (listener, url)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.expect("accept");
    let mut ws = accept_async(stream).await.expect("ws handshake");
    ws.send(Message::Text(HANDSHAKE.into())).await.expect("send open");
    ws.send(Message::Text("40".into())).await.expect("send connect");
    ws
}

/// Next text frame from the client that is not a keepalive ping
async fn next_text(ws: &mut WebSocketStream<TcpStream>) -> Option<String> {
    while let Some(message) = ws.next().await {
        match message {
            Ok(Message::Text(text)) if text.as_str() == "2" => continue,
            Ok(Message::Text(text)) => return Some(text.to_string()),
            Ok(Message::Close(_)) | Err(_) => return None,
            Ok(_) => continue,
        }
    }
    None
}

fn event_args(frame: &str) -> Vec<Value> {
    let body = frame.strip_prefix("42").expect("event frame");
    serde_json::from_str(body).expect("event args")
}

fn config_for(url: String) -> StreamConfig {
    StreamConfig {
        url,
        ..StreamConfig::default()
    }
}

#[tokio::test]
async fn test_subscribe_and_receive_over_socket() {
    let (listener, url) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;

        let subscribe = next_text(&mut ws).await.expect("subscribe frame");
        let args = event_args(&subscribe);
        assert_eq!(args[0], json!("subscribe"));
        assert_eq!(args[1], json!({"channel": "rate", "auth": {}}));

        let event = json!([
            "App\\\\Events\\\\Ticker",
            "rate",
            {"id": 702, "lastPrice": "0.00002640", "precision": 8}
        ]);
        ws.send(Message::Text(format!("42{event}").into()))
            .await
            .expect("send event");

        // the client says goodbye before closing
        next_text(&mut ws).await
    });

    let connections = Recorder::<()>::new();
    let manager = {
        let connections = connections.clone();
        ChannelManager::new(config_for(url)).on_connection(move || connections.push(()))
    };
    assert_ok!(manager.connect(CancellationToken::new()).await);
    wait_until("socket.io connect", || connections.len() == 1).await;
    assert!(manager.is_connected());

    let rates = Recorder::<(String, RateMessage)>::new();
    {
        let rates = rates.clone();
        assert_ok!(
            manager
                .subscribe_channel(&RateChannel, move |tag, message| rates.push((tag.to_string(), message)))
                .await
        );
    }
    wait_until("ticker event", || rates.len() == 1).await;
    let calls = rates.calls();
    assert_eq!(calls[0].0, "rate");
    assert_eq!(calls[0].1.id, 702);
    assert_eq!(calls[0].1.precision, 8);

    assert_ok!(manager.disconnect().await);
    assert!(!manager.is_connected());
    let goodbye = server.await.expect("server task");
    assert_eq!(goodbye.as_deref(), Some("41"));
}

#[tokio::test]
async fn test_server_ping_gets_pong() {
    let (listener, url) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        ws.send(Message::Text("2".into())).await.expect("send ping");
        next_text(&mut ws).await
    });

    let manager = ChannelManager::new(config_for(url));
    assert_ok!(manager.connect(CancellationToken::new()).await);
    let reply = server.await.expect("server task");
    assert_eq!(reply.as_deref(), Some("3"));
}

#[tokio::test]
async fn test_client_sends_keepalive_pings() {
    let (listener, url) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        let mut pings = 0;
        while let Some(Ok(message)) = ws.next().await {
            if let Message::Text(text) = message
                && text.as_str() == "2"
            {
                pings += 1;
                ws.send(Message::Text("3".into())).await.expect("send pong");
                if pings == 2 {
                    break;
                }
            }
        }
        pings
    });

    let config = StreamConfig {
        transport: TransportConfig {
            ping_interval: Duration::from_millis(50),
            ..TransportConfig::default()
        },
        ..config_for(url)
    };
    let manager = ChannelManager::new(config);
    assert_ok!(manager.connect(CancellationToken::new()).await);
    let pings = tokio::time::timeout(Duration::from_secs(2), server)
        .await
        .expect("pings in time")
        .expect("server task");
    assert_eq!(pings, 2);
}

#[tokio::test]
async fn test_server_error_and_close_reach_callbacks() {
    let (listener, url) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        ws.send(Message::Text(r#"44"unauthorized""#.into()))
            .await
            .expect("send error");
        ws.send(Message::Text("42not-json".into()))
            .await
            .expect("send garbage");
        ws.send(Message::Text("41".into())).await.expect("send disconnect");
    });

    let errors = Recorder::<String>::new();
    let disconnects = Recorder::<String>::new();
    let manager = {
        let errors = errors.clone();
        let disconnects = disconnects.clone();
        ChannelManager::new(config_for(url))
            .on_error(move |err| errors.push(err.to_string()))
            .on_disconnect(move |reason| disconnects.push(reason.to_string()))
    };
    assert_ok!(manager.connect(CancellationToken::new()).await);
    let _ = server.await;

    wait_until("on_disconnect", || disconnects.len() == 1).await;
    let errors = errors.calls();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].contains("unauthorized"));
    assert!(errors[1].contains("invalid event body"));
    assert_eq!(disconnects.calls(), vec!["server disconnect".to_string()]);
    assert!(!manager.is_connected());
}

#[tokio::test]
async fn test_dial_refused() {
    let (listener, url) = listen().await;
    drop(listener);

    let manager = ChannelManager::new(config_for(url));
    let err = manager
        .connect(CancellationToken::new())
        .await
        .expect_err("nothing listens");
    assert!(err.is_transport());
    assert!(!manager.is_connected());
}

#[tokio::test]
async fn test_invalid_utf8_binary_frame_reaches_on_error() {
    let (listener, url) = listen().await;
    let server = tokio::spawn(async move {
        let mut ws = accept(&listener).await;
        ws.send(Message::Binary(vec![0xff, 0xfe, 0xfd].into()))
            .await
            .expect("send binary");
        ws.send(Message::Text("41".into())).await.expect("send disconnect");
    });

    let errors = Recorder::<String>::new();
    let disconnects = Recorder::<String>::new();
    let manager = {
        let errors = errors.clone();
        let disconnects = disconnects.clone();
        ChannelManager::new(config_for(url))
            .on_error(move |err| errors.push(err.to_string()))
            .on_disconnect(move |reason| disconnects.push(reason.to_string()))
    };
    assert_ok!(manager.connect(CancellationToken::new()).await);
    let _ = server.await;

    wait_until("on_disconnect", || disconnects.len() == 1).await;
    let errors = errors.calls();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("binary frame is not utf-8"));
}

#[tokio::test]
async fn test_wait_connected_follows_connect_packet() {
    let (listener, url) = listen().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.expect("accept");
        let mut ws = accept_async(stream).await.expect("ws handshake");
        ws.send(Message::Text(HANDSHAKE.into())).await.expect("send open");
        tokio::time::sleep(Duration::from_millis(100)).await;
        ws.send(Message::Text("40".into())).await.expect("send connect");
        next_text(&mut ws).await
    });

    let manager = ChannelManager::new(config_for(url));
    assert_ok!(manager.connect(CancellationToken::new()).await);
    assert!(!manager.is_connected());

    assert_ok!(manager.wait_connected(Duration::from_secs(2)).await);
    assert!(manager.is_connected());
    assert_ok!(manager.subscribe("rate", false).await);

    let subscribe = server.await.expect("server task").expect("subscribe frame");
    assert_eq!(event_args(&subscribe)[1], json!({"channel": "rate", "auth": {}}));
}
