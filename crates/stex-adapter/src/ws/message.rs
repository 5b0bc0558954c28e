/*
[INPUT]:  JSON payloads of socket events
[OUTPUT]: Typed records handed to channel callbacks
[POS]:    WebSocket layer - message parsing and validation
[UPDATE]: When adding new message types or changing format
*/

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::OrderType;
use crate::types::serde_helpers::decimal;

pub use crate::types::OrderBookRow as GlassRow;

/// Ticker snapshot pushed on the `rate` channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateMessage {
    pub id: u32,
    #[serde(rename = "closedOrders")]
    pub closed_orders: u64,
    #[serde(rename = "lastPriceDayAgo", with = "decimal")]
    pub last_price_day_ago: Decimal,
    #[serde(rename = "maxBuy", with = "decimal")]
    pub max_buy: Decimal,
    #[serde(rename = "minSell", with = "decimal")]
    pub min_sell: Decimal,
    #[serde(rename = "volumeSum", with = "decimal")]
    pub volume_sum: Decimal,
    #[serde(with = "decimal")]
    pub market_volume: Decimal,
    #[serde(rename = "lastPrice", with = "decimal")]
    pub last_price: Decimal,
    #[serde(with = "decimal")]
    pub spread: Decimal,
    pub precision: u32,
}

/// Fill of one of the user's orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderFill {
    pub user_id: i64,
    pub currency_pair_id: u32,
    #[serde(with = "decimal")]
    pub price: Decimal,
    #[serde(with = "decimal")]
    pub amount: Decimal,
    #[serde(default, with = "decimal")]
    pub amount2: Decimal,
    #[serde(default)]
    pub date: String,
    pub order_type: OrderType,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderDeleted {
    pub id: i64,
    pub user_id: i64,
    pub currency_pair_id: u32,
    pub status: String,
}

/// New or changed open order of the user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderUpdate {
    pub id: i64,
    pub user_id: i64,
    pub currency_pair_id: u32,
    #[serde(with = "decimal")]
    pub price: Decimal,
    #[serde(with = "decimal")]
    pub amount: Decimal,
    #[serde(with = "decimal")]
    pub amount2: Decimal,
}

/// Wallet balance after a change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceUpdate {
    pub id: i64,
    pub currency_code: String,
    #[serde(with = "decimal")]
    pub balance: Decimal,
    #[serde(with = "decimal")]
    pub frozen_balance: Decimal,
    #[serde(with = "decimal")]
    pub bonus_balance: Decimal,
    #[serde(with = "decimal")]
    pub total_balance: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_rate_message() {
        let raw = json!({
            "id": 702,
            "closedOrders": 1043,
            "lastPriceDayAgo": "0.00002651",
            "maxBuy": "0.00002613",
            "minSell": "0.00002640",
            "volumeSum": "0.12",
            "market_volume": "4522.2",
            "lastPrice": "0.00002640",
            "spread": "0.00000027",
            "precision": 8
        });
        let rate: RateMessage = serde_json::from_value(raw).unwrap();
        assert_eq!(rate.id, 702);
        assert_eq!(rate.closed_orders, 1043);
        assert_eq!(rate.last_price, Decimal::from_str("0.00002640").unwrap());
        assert_eq!(rate.precision, 8);
    }

    #[test]
    fn test_order_fill_lowercase_type() {
        let raw = json!({
            "user_id": 42,
            "currency_pair_id": 7,
            "price": "0.5",
            "amount": "10",
            "amount2": 5.0,
            "date": "2019-01-17 10:14:48",
            "order_type": "sell"
        });
        let fill: OrderFill = serde_json::from_value(raw).unwrap();
        assert_eq!(fill.order_type, OrderType::Sell);
        assert_eq!(fill.amount2, Decimal::from(5));
    }

    #[test]
    fn test_balance_update() {
        let raw = json!({
            "id": 9,
            "currency_code": "BTC",
            "balance": "1.5",
            "frozen_balance": "0.5",
            "bonus_balance": "0",
            "total_balance": "2"
        });
        let update: BalanceUpdate = serde_json::from_value(raw).unwrap();
        assert_eq!(update.currency_code, "BTC");
        assert_eq!(update.total_balance, Decimal::from(2));
    }
}
