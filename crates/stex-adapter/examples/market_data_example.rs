/*
[INPUT]:  Currency pair id (e.g., 702)
[OUTPUT]: Market data (ticker, order book, recent trades)
[POS]:    Examples - public market data queries
[UPDATE]: When adding new market data endpoints
*/

use stex_adapter::*;

/// Example: Query market data (no authentication required)
///
/// These endpoints are public and don't need an API token.
#[tokio::main]
async fn main() {
    println!("=== STEX Market Data Example ===\n");

    let client = match StexClient::new() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create client: {}", e);
            return;
        }
    };
    println!("✓ HTTP client created (no auth required for public endpoints)\n");

    match client.ping().await {
        Ok(ping) => println!("✓ Server time: {}", ping.timestamp),
        Err(e) => println!("✗ Ping failed: {}", e),
    }

    let pair = 702;

    println!("\nQuerying ticker for pair {}...", pair);
    match client.ticker(pair).await {
        Ok(ticker) => println!("✓ {} last={} bid={} ask={}", ticker.symbol, ticker.last, ticker.bid, ticker.ask),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying order book for pair {}...", pair);
    let query = OrderBookQuery {
        limit_bids: Some(5),
        limit_asks: Some(5),
        ..OrderBookQuery::new(pair)
    };
    match client.order_book(&query).await {
        Ok(book) => {
            for row in &book.ask {
                println!("  ask {} @ {}", row.amount, row.price);
            }
            for row in &book.bid {
                println!("  bid {} @ {}", row.amount, row.price);
            }
        }
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\nQuerying recent trades for pair {}...", pair);
    let query = TradesQuery {
        limit: Some(10),
        ..TradesQuery::new(pair)
    };
    match client.trades(&query).await {
        Ok(trades) => println!("✓ {} trades", trades.len()),
        Err(e) => println!("✗ Error: {}", e),
    }

    println!("\n✓ Market data example complete");
}
