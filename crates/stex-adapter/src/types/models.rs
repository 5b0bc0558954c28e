/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust structs with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::enums::TradeType;
use super::serde_helpers::{decimal, decimal_option};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ping {
    #[serde(rename = "server_timestamp")]
    pub timestamp: i64,
}

// ### Currencies and markets

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtocolSettings {
    pub protocol_name: String,
    pub protocol_id: u32,
    pub active: bool,
    pub withdrawal_fee_currency_id: u32,
    #[serde(with = "decimal")]
    pub withdrawal_fee_const: Decimal,
    #[serde(with = "decimal")]
    pub withdrawal_fee_percent: Decimal,
    pub block_explorer_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyInfo {
    pub id: u32,
    pub code: String,
    pub name: String,
    pub active: bool,
    pub delisted: bool,
    pub precision: u32,
    #[serde(with = "decimal")]
    pub minimum_withdrawal_amount: Decimal,
    #[serde(with = "decimal")]
    pub minimum_deposit_amount: Decimal,
    pub deposit_fee_currency_id: u32,
    pub deposit_fee_currency_code: String,
    #[serde(with = "decimal")]
    pub deposit_fee_const: Decimal,
    #[serde(with = "decimal")]
    pub deposit_fee_percent: Decimal,
    pub withdrawal_fee_currency_id: u32,
    pub withdrawal_fee_currency_code: String,
    #[serde(with = "decimal")]
    pub withdrawal_fee_const: Decimal,
    #[serde(with = "decimal")]
    pub withdrawal_fee_percent: Decimal,
    pub block_explorer_url: String,
    pub protocol_specific_settings: Vec<ProtocolSettings>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketInfo {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairsGroup {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyPair {
    pub id: u32,
    pub currency_id: u32,
    pub currency_code: String,
    pub currency_name: String,
    pub market_currency_id: u32,
    pub market_code: String,
    pub market_name: String,
    #[serde(with = "decimal")]
    pub min_order_amount: Decimal,
    #[serde(with = "decimal")]
    pub min_buy_price: Decimal,
    #[serde(with = "decimal")]
    pub min_sell_price: Decimal,
    #[serde(with = "decimal")]
    pub buy_fee_percent: Decimal,
    #[serde(with = "decimal")]
    pub sell_fee_percent: Decimal,
    pub active: bool,
    pub delisted: bool,
    pub pair_message: String,
    pub currency_precision: u32,
    pub market_precision: u32,
    pub symbol: String,
    pub group_name: String,
    pub group_id: u32,
    pub amount_multiplier: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ticker {
    pub id: u32,
    pub amount_multiplier: u32,
    pub currency_code: String,
    pub market_code: String,
    pub currency_name: String,
    pub market_name: String,
    pub symbol: String,
    pub group_name: String,
    pub group_id: u32,
    #[serde(with = "decimal")]
    pub ask: Decimal,
    #[serde(with = "decimal")]
    pub bid: Decimal,
    #[serde(with = "decimal")]
    pub last: Decimal,
    #[serde(with = "decimal")]
    pub low: Decimal,
    #[serde(with = "decimal")]
    pub high: Decimal,
    #[serde(with = "decimal")]
    pub open: Decimal,
    #[serde(with = "decimal")]
    pub volume: Decimal,
    #[serde(rename = "volumeQuote", with = "decimal")]
    pub volume_quote: Decimal,
    #[serde(rename = "fiatsRate")]
    pub fiats_rate: HashMap<String, f64>,
    pub timestamp: i64,
}

/// Public trade on a currency pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PublicTrade {
    pub id: i64,
    #[serde(with = "decimal")]
    pub price: Decimal,
    #[serde(with = "decimal")]
    pub amount: Decimal,
    #[serde(rename = "type")]
    pub trade_type: String,
    pub timestamp: i64,
}

/// One aggregated order book row.
///
/// Also the payload of `GlassRowChanged` socket events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderBookRow {
    pub currency_pair_id: u32,
    #[serde(with = "decimal")]
    pub amount: Decimal,
    #[serde(with = "decimal")]
    pub price: Decimal,
    #[serde(with = "decimal")]
    pub amount2: Decimal,
    pub count: u32,
    #[serde(with = "decimal")]
    pub cumulative_amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderBook {
    pub ask: Vec<OrderBookRow>,
    pub bid: Vec<OrderBookRow>,
    #[serde(with = "decimal")]
    pub ask_total_amount: Decimal,
    #[serde(with = "decimal")]
    pub bid_total_amount: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Candle {
    pub time: i64,
    #[serde(with = "decimal")]
    pub open: Decimal,
    #[serde(with = "decimal")]
    pub close: Decimal,
    #[serde(with = "decimal")]
    pub low: Decimal,
    #[serde(with = "decimal")]
    pub high: Decimal,
    #[serde(with = "decimal")]
    pub volume: Decimal,
}

/// Deposit or withdrawal status reference entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferStatus {
    pub id: i64,
    pub name: String,
    #[serde(rename = "color", default)]
    pub status_color: String,
}

// ### Trading

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fees {
    #[serde(with = "decimal")]
    pub sell_fee: Decimal,
    #[serde(with = "decimal")]
    pub buy_fee: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderInfo {
    pub id: i64,
    pub currency_pair_id: u32,
    #[serde(with = "decimal")]
    pub price: Decimal,
    #[serde(with = "decimal_option")]
    pub trigger_price: Option<Decimal>,
    #[serde(with = "decimal")]
    pub initial_amount: Decimal,
    #[serde(with = "decimal")]
    pub processed_amount: Decimal,
    #[serde(rename = "type")]
    pub order_type: String,
    pub original_type: String,
    pub created: String,
    pub timestamp: i64,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeletedOrders {
    #[serde(rename = "put_into_processing_queue")]
    pub processing: Vec<OrderInfo>,
    #[serde(rename = "not_put_into_processing_queue")]
    pub pending: Vec<OrderInfo>,
    pub message: String,
}

// ### Reports

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub id: i64,
    pub buy_order_id: i64,
    pub sell_order_id: i64,
    #[serde(with = "decimal")]
    pub price: Decimal,
    #[serde(with = "decimal")]
    pub amount: Decimal,
    pub trade_type: TradeType,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fee {
    pub id: i64,
    pub currency_id: u32,
    #[serde(with = "decimal")]
    pub amount: Decimal,
    pub timestamp: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderTradesDetail {
    pub id: i64,
    pub currency_pair_id: u32,
    #[serde(with = "decimal")]
    pub price: Decimal,
    #[serde(with = "decimal")]
    pub initial_amount: Decimal,
    #[serde(rename = "type")]
    pub order_type: String,
    pub created: String,
    pub timestamp: i64,
    pub status: String,
    pub trades: Vec<Trade>,
    pub fees: Vec<Fee>,
}

// ### Profile

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileVerifications {
    pub cryptonomica: bool,
    pub privatbank: bool,
    pub stex: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingFeeLevels {
    #[serde(with = "decimal")]
    pub not_verified: Decimal,
    #[serde(with = "decimal")]
    pub cryptonomica: Decimal,
    #[serde(with = "decimal")]
    pub privatbank: Decimal,
    #[serde(with = "decimal")]
    pub stex: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Referral {
    pub referral_code: String,
    pub members: u32,
    pub invited: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApproxBalance {
    #[serde(with = "decimal")]
    pub balance: Decimal,
    #[serde(with = "decimal")]
    pub frozen_balance: Decimal,
    #[serde(with = "decimal")]
    pub bonus_balance: Decimal,
    #[serde(with = "decimal")]
    pub total_balance: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileInfo {
    pub email: String,
    pub username: String,
    pub user_id: i64,
    pub verifications: ProfileVerifications,
    pub trading_fee_levels: TradingFeeLevels,
    pub api_withdrawals_allowed: bool,
    pub referral_program: Referral,
    pub approx_balance: HashMap<String, ApproxBalance>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Wallet {
    pub id: i64,
    pub currency_id: u32,
    pub delisted: bool,
    pub disabled: bool,
    pub disable_deposits: bool,
    pub currency_code: String,
    pub currency_name: String,
    pub official_url: String,
    pub rates: HashMap<String, f64>,
    #[serde(with = "decimal")]
    pub balance: Decimal,
    #[serde(with = "decimal")]
    pub frozen_balance: Decimal,
    #[serde(with = "decimal")]
    pub bonus_balance: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub address: String,
    pub address_name: String,
    pub additional_address_parameter: String,
    pub additional_address_parameter_name: String,
    pub notification: String,
    pub protocol_id: u32,
    pub protocol_name: String,
}

/// Wallet with deposit addresses, as returned by the single-wallet endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletDetails {
    pub id: i64,
    pub currency_id: u32,
    pub delisted: bool,
    pub disabled: bool,
    pub disable_deposits: bool,
    pub code: String,
    #[serde(with = "decimal")]
    pub balance: Decimal,
    #[serde(with = "decimal")]
    pub frozen_balance: Decimal,
    #[serde(with = "decimal")]
    pub bonus_balance: Decimal,
    pub deposit_address: Option<Address>,
    pub multi_deposit_address: Option<Address>,
    pub withdrawal_additional_field_name: Option<String>,
    pub rates: HashMap<String, f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deposit {
    pub id: i64,
    pub currency_id: u32,
    pub currency_code: String,
    pub deposit_fee_currency_id: u32,
    pub deposit_fee_currency_code: String,
    #[serde(with = "decimal")]
    pub amount: Decimal,
    #[serde(with = "decimal")]
    pub fee: Decimal,
    pub txid: String,
    pub deposit_status_id: i64,
    pub status: String,
    pub status_color: String,
    pub created_at: String,
    pub timestamp: i64,
    pub confirmations: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Withdrawal {
    pub id: i64,
    pub currency_id: u32,
    pub currency_code: String,
    #[serde(with = "decimal")]
    pub amount: Decimal,
    #[serde(with = "decimal")]
    pub fee: Decimal,
    pub fee_currency_id: u32,
    pub fee_currency_code: String,
    pub withdrawal_status_id: i64,
    pub status: String,
    pub status_color: String,
    pub created_at: String,
    pub created_ts: String,
    pub updated_at: String,
    pub updated_ts: String,
    pub txid: Option<String>,
    pub withdrawal_address: Option<Address>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Notification {
    pub id: String,
    pub title: String,
    pub desc: String,
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_ticker_deserialization() {
        let raw = json!({
            "id": 1,
            "amount_multiplier": 1,
            "currency_code": "ETH",
            "market_code": "BTC",
            "currency_name": "Etherium",
            "market_name": "Bitcoin",
            "symbol": "ETH_BTC",
            "group_name": "FIAT coins",
            "group_id": 1,
            "ask": "0.03377988",
            "bid": "0.03350001",
            "last": "0.0337",
            "low": "0.03320157",
            "high": "0.0341",
            "open": "0.03340002",
            "volume": "5.1939",
            "volumeQuote": "154.12169946",
            "fiatsRate": { "BTC": 0.000001 },
            "timestamp": 1538737692
        });

        let ticker: Ticker = serde_json::from_value(raw).expect("ticker");
        assert_eq!(ticker.symbol, "ETH_BTC");
        assert_eq!(ticker.ask, Decimal::from_str("0.03377988").unwrap());
        assert_eq!(ticker.volume_quote, Decimal::from_str("154.12169946").unwrap());
        assert_eq!(ticker.fiats_rate.get("BTC"), Some(&0.000001));
    }

    #[test]
    fn test_order_info_tolerates_missing_fields() {
        let order: OrderInfo = serde_json::from_value(json!({
            "id": 828680665,
            "currency_pair_id": 1,
            "price": "0.011384",
            "trigger_price": 0.011385,
            "initial_amount": "13.942",
            "processed_amount": "3.724",
            "type": "SELL",
            "status": "PROCESSING"
        }))
        .expect("order");

        assert_eq!(order.id, 828680665);
        assert_eq!(order.trigger_price, Some(Decimal::from_str("0.011385").unwrap()));
        assert_eq!(order.order_type, "SELL");
        assert!(order.original_type.is_empty());
    }

    #[test]
    fn test_trade_requires_trade_type() {
        let trade: Trade = serde_json::from_value(json!({
            "id": 1,
            "buy_order_id": 2,
            "sell_order_id": 3,
            "price": 0.5,
            "amount": "10",
            "trade_type": "BUY",
            "timestamp": "1538737692"
        }))
        .expect("trade");
        assert_eq!(trade.trade_type, TradeType::Buy);
        assert_eq!(trade.price, Decimal::from_str("0.5").unwrap());
    }
}
