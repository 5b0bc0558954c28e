/*
[INPUT]:  Optional STEX_API_TOKEN environment variable
[OUTPUT]: Real-time ticker and order book updates
[POS]:    Examples - WebSocket stream handling
[UPDATE]: When WebSocket API changes
*/

use std::env;

use stex_adapter::ws::RateMessage;
use stex_adapter::*;
use tokio::time::{Duration, sleep};
use tokio_util::sync::CancellationToken;

/// Example: socket.io channel subscriptions
///
/// Public channels (`rate`, order book sides) need no token; private channels
/// send the token from STEX_API_TOKEN as a bearer header.
#[tokio::main]
async fn main() {
    println!("=== STEX WebSocket Example ===\n");

    let config = match env::var("STEX_API_TOKEN") {
        Ok(token) => StreamConfig::with_token(token),
        Err(_) => StreamConfig::default(),
    };
    let manager = ChannelManager::new(config)
        .on_connection(|| println!("✓ socket.io session established"))
        .on_disconnect(|reason| println!("✗ disconnected: {}", reason))
        .on_error(|err| println!("✗ error: {}", err));

    let cancel = CancellationToken::new();
    if let Err(e) = manager.connect(cancel.clone()).await {
        eprintln!("Failed to connect: {}", e);
        return;
    }
    if let Err(e) = manager.wait_connected(Duration::from_secs(60)).await {
        eprintln!("Session not established: {}", e);
        let _ = manager.disconnect().await;
        return;
    }

    let rate = manager
        .subscribe_channel(&RateChannel, |_, message: RateMessage| {
            println!("  rate pair={} last={}", message.id, message.last_price);
        })
        .await;
    if let Err(e) = rate {
        eprintln!("Failed to subscribe to rate: {}", e);
    }

    let book = OrderBookChannel::new(TradeType::Sell, 702);
    let book = manager
        .subscribe_channel(&book, |tag, row| {
            println!("  {} {} @ {}", tag, row.amount, row.price);
        })
        .await;
    if let Err(e) = book {
        eprintln!("Failed to subscribe to order book: {}", e);
    }

    println!("\nListening for 30 seconds...");
    sleep(Duration::from_secs(30)).await;

    cancel.cancel();
    if let Err(e) = manager.disconnect().await {
        eprintln!("Disconnect failed: {}", e);
    }
    println!("\n✓ WebSocket example complete");
}
