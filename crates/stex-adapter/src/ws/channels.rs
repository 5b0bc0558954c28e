/*
[INPUT]:  Channel parameters (trade side, pair, user, order type, wallet)
[OUTPUT]: Channel names, event names and callback tags
[POS]:    WebSocket layer - subscription channel definitions
[UPDATE]: When the server adds channels or renames events
*/

use serde::de::DeserializeOwned;

use crate::http::{Result, StexError};
use crate::types::{OrderBookRow, OrderType, TradeType};
use crate::ws::message::{BalanceUpdate, OrderDeleted, OrderFill, OrderUpdate, RateMessage};

pub const TICKER_EVENT: &str = r"App\\Events\\Ticker";
pub const GLASS_ROW_CHANGED_EVENT: &str = r"App\\Events\\GlassRowChanged";
pub const ORDER_FILL_EVENT: &str = r"App\\Events\\UserOrderFillCreated";
pub const ORDER_DELETED_EVENT: &str = r"App\\Events\\UserOrderDeleted";
pub const ORDER_UPDATE_EVENT: &str = r"App\\Events\\UserOrder";
pub const BALANCE_EVENT: &str = r"App\\Events\\BalanceChanged";

/// A subscribable channel family.
///
/// `name` validates the parameters, so a channel missing one fails before
/// anything is registered or sent.
pub trait Channel {
    type Message: DeserializeOwned + Send + 'static;

    /// Event the server emits for this family
    const EVENT: &'static str;
    /// Private channels carry the bearer token in the subscribe frame
    const PRIVATE: bool;

    fn name(&self) -> Result<String>;

    /// Discriminator passed to the callback with every message
    fn tag(&self) -> Result<String>;
}

fn required<T: Copy>(value: Option<T>, name: &str) -> Result<T> {
    value.ok_or_else(|| StexError::missing(name))
}

/// Global ticker feed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateChannel;

impl Channel for RateChannel {
    type Message = RateMessage;
    const EVENT: &'static str = TICKER_EVENT;
    const PRIVATE: bool = false;

    fn name(&self) -> Result<String> {
        Ok("rate".to_string())
    }

    fn tag(&self) -> Result<String> {
        Ok("rate".to_string())
    }
}

/// Order book row changes for one side of one pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderBookChannel {
    pub trade_type: Option<TradeType>,
    pub currency_pair_id: Option<u32>,
}

impl OrderBookChannel {
    pub fn new(trade_type: TradeType, currency_pair_id: u32) -> Self {
        Self {
            trade_type: Some(trade_type),
            currency_pair_id: Some(currency_pair_id),
        }
    }
}

impl Channel for OrderBookChannel {
    type Message = OrderBookRow;
    const EVENT: &'static str = GLASS_ROW_CHANGED_EVENT;
    const PRIVATE: bool = false;

    fn name(&self) -> Result<String> {
        let side = required(self.trade_type, "trade_type")?;
        let pair = required(self.currency_pair_id, "currency_pair_id")?;
        Ok(format!("{}_data{pair}", side.as_str().to_lowercase()))
    }

    fn tag(&self) -> Result<String> {
        self.name()
    }
}

/// Fills of the user's orders on one pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserOrderFillChannel {
    pub user_id: Option<i64>,
    pub currency_pair_id: Option<u32>,
}

impl UserOrderFillChannel {
    pub fn new(user_id: i64, currency_pair_id: u32) -> Self {
        Self {
            user_id: Some(user_id),
            currency_pair_id: Some(currency_pair_id),
        }
    }
}

impl Channel for UserOrderFillChannel {
    type Message = OrderFill;
    const EVENT: &'static str = ORDER_FILL_EVENT;
    const PRIVATE: bool = true;

    fn name(&self) -> Result<String> {
        let user = required(self.user_id, "user_id")?;
        let pair = required(self.currency_pair_id, "currency_pair_id")?;
        Ok(format!("private-trade_u{user}c{pair}"))
    }

    fn tag(&self) -> Result<String> {
        self.name()?;
        Ok("private-trade".to_string())
    }
}

/// Deletions of the user's orders on one pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserOrderDeleteChannel {
    pub user_id: Option<i64>,
    pub currency_pair_id: Option<u32>,
}

impl UserOrderDeleteChannel {
    pub fn new(user_id: i64, currency_pair_id: u32) -> Self {
        Self {
            user_id: Some(user_id),
            currency_pair_id: Some(currency_pair_id),
        }
    }
}

impl Channel for UserOrderDeleteChannel {
    type Message = OrderDeleted;
    const EVENT: &'static str = ORDER_DELETED_EVENT;
    const PRIVATE: bool = true;

    fn name(&self) -> Result<String> {
        let user = required(self.user_id, "user_id")?;
        let pair = required(self.currency_pair_id, "currency_pair_id")?;
        Ok(format!("private-del_order_u{user}c{pair}"))
    }

    fn tag(&self) -> Result<String> {
        self.name()?;
        Ok("private-delete".to_string())
    }
}

/// Updates of the user's open orders of one type on one pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserOrderUpdateChannel {
    pub user_id: Option<i64>,
    pub currency_pair_id: Option<u32>,
    pub order_type: Option<OrderType>,
}

impl UserOrderUpdateChannel {
    pub fn new(user_id: i64, currency_pair_id: u32, order_type: OrderType) -> Self {
        Self {
            user_id: Some(user_id),
            currency_pair_id: Some(currency_pair_id),
            order_type: Some(order_type),
        }
    }
}

impl Channel for UserOrderUpdateChannel {
    type Message = OrderUpdate;
    const EVENT: &'static str = ORDER_UPDATE_EVENT;
    const PRIVATE: bool = true;

    fn name(&self) -> Result<String> {
        let user = required(self.user_id, "user_id")?;
        let order_type = required(self.order_type, "order_type")?;
        let pair = required(self.currency_pair_id, "currency_pair_id")?;
        Ok(format!(
            "private-{}_user_data_u{user}c{pair}",
            order_type.as_str().to_lowercase()
        ))
    }

    fn tag(&self) -> Result<String> {
        let order_type = required(self.order_type, "order_type")?;
        Ok(order_type.as_str().to_lowercase())
    }
}

/// Balance changes of one wallet
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BalanceChannel {
    pub wallet_id: Option<i64>,
}

impl BalanceChannel {
    pub fn new(wallet_id: i64) -> Self {
        Self {
            wallet_id: Some(wallet_id),
        }
    }
}

impl Channel for BalanceChannel {
    type Message = BalanceUpdate;
    const EVENT: &'static str = BALANCE_EVENT;
    const PRIVATE: bool = true;

    fn name(&self) -> Result<String> {
        let wallet = required(self.wallet_id, "wallet_id")?;
        Ok(format!("private-balance_changed_w_{wallet}"))
    }

    fn tag(&self) -> Result<String> {
        self.name()?;
        Ok("private-balance".to_string())
    }
}
