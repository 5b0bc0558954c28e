/*
[INPUT]:  API schema definitions and serde requirements
[OUTPUT]: Typed Rust enums with serialization support
[POS]:    Data layer - type definitions for API communication
[UPDATE]: When API schema changes or new types added
*/

use std::fmt;

use serde::{Deserialize, Serialize};

/// Order book side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeType {
    #[serde(rename = "BUY", alias = "buy")]
    Buy,
    #[serde(rename = "SELL", alias = "sell")]
    Sell,
}

impl TradeType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeType::Buy => "BUY",
            TradeType::Sell => "SELL",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "BUY", alias = "buy")]
    Buy,
    #[serde(rename = "SELL", alias = "sell")]
    Sell,
    #[serde(rename = "STOP_LIMIT_BUY", alias = "stop_limit_buy")]
    StopLimitBuy,
    #[serde(rename = "STOP_LIMIT_SELL", alias = "stop_limit_sell")]
    StopLimitSell,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Buy => "BUY",
            OrderType::Sell => "SELL",
            OrderType::StopLimitBuy => "STOP_LIMIT_BUY",
            OrderType::StopLimitSell => "STOP_LIMIT_SELL",
        }
    }

    /// Stop-limit orders need a trigger price
    pub fn is_stop_limit(&self) -> bool {
        matches!(self, OrderType::StopLimitBuy | OrderType::StopLimitSell)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Desc,
    Asc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Desc => "DESC",
            SortOrder::Asc => "ASC",
        }
    }
}

/// Candle size for chart queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandleType {
    #[serde(rename = "1")]
    OneMinute,
    #[serde(rename = "5")]
    FiveMinutes,
    #[serde(rename = "30")]
    ThirtyMinutes,
    #[serde(rename = "60")]
    OneHour,
    #[serde(rename = "240")]
    FourHours,
    #[serde(rename = "720")]
    TwelveHours,
    #[serde(rename = "1D")]
    OneDay,
}

impl CandleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandleType::OneMinute => "1",
            CandleType::FiveMinutes => "5",
            CandleType::ThirtyMinutes => "30",
            CandleType::OneHour => "60",
            CandleType::FourHours => "240",
            CandleType::TwelveHours => "720",
            CandleType::OneDay => "1D",
        }
    }
}

/// Closed order filter for order history reports.
///
/// `WithTrades` returns both partial and finished orders in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    All,
    Finished,
    Cancelled,
    Partial,
    WithTrades,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::All => "ALL",
            OrderStatus::Finished => "FINISHED",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Partial => "PARTIAL",
            OrderStatus::WithTrades => "WITH_TRADES",
        }
    }
}

/// Wallet list sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortBalanceField {
    Balance,
    Frozen,
    Bonus,
    Total,
}

impl SortBalanceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortBalanceField::Balance => "BALANCE",
            SortBalanceField::Frozen => "FROZEN",
            SortBalanceField::Bonus => "BONUS",
            SortBalanceField::Total => "TOTAL",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

display_as_str!(TradeType, OrderType, SortOrder, CandleType, OrderStatus, SortBalanceField);
