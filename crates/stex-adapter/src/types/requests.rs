/*
[INPUT]:  Caller-supplied request options
[OUTPUT]: Validated option values rendered as query/form parameters
[POS]:    Data layer - request option values for REST endpoints
[UPDATE]: When endpoint parameters change
*/

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::enums::{CandleType, OrderStatus, OrderType, SortBalanceField, SortOrder};
use crate::http::{Result, StexError};

/// Report endpoints take `YYYY-mm-dd HH:MM:SS` in UTC
const REPORT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) type Params = Vec<(&'static str, String)>;

fn require_id(value: u32, name: &str) -> Result<()> {
    if value == 0 {
        return Err(StexError::missing(name));
    }
    Ok(())
}

fn require_positive(value: Decimal, name: &str) -> Result<()> {
    if value <= Decimal::ZERO {
        return Err(StexError::Validation(format!("{name} must be positive")));
    }
    Ok(())
}

fn check_range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Result<()> {
    if let (Some(start), Some(end)) = (start, end)
        && start >= end
    {
        return Err(StexError::Validation(format!(
            "time range start {start} must be before end {end}"
        )));
    }
    Ok(())
}

fn push_opt<T: ToString>(params: &mut Params, key: &'static str, value: Option<T>) {
    if let Some(value) = value {
        params.push((key, value.to_string()));
    }
}

/// Limit/offset pagination
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: Some(offset),
        }
    }

    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push_opt(&mut params, "limit", self.limit);
        push_opt(&mut params, "offset", self.offset);
        params
    }
}

/// Public trades of one currency pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradesQuery {
    pub currency_pair_id: u32,
    pub sort: Option<SortOrder>,
    pub from: Option<DateTime<Utc>>,
    pub till: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl TradesQuery {
    pub fn new(currency_pair_id: u32) -> Self {
        Self {
            currency_pair_id,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_id(self.currency_pair_id, "currency_pair_id")?;
        check_range(self.from, self.till)
    }

    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push_opt(&mut params, "from", self.from.map(|t| t.timestamp()));
        push_opt(&mut params, "till", self.till.map(|t| t.timestamp()));
        push_opt(&mut params, "sort", self.sort);
        push_opt(&mut params, "limit", self.limit);
        params.push(("offset", self.offset.to_string()));
        params
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderBookQuery {
    pub currency_pair_id: u32,
    pub limit_bids: Option<u32>,
    pub limit_asks: Option<u32>,
}

impl OrderBookQuery {
    pub fn new(currency_pair_id: u32) -> Self {
        Self {
            currency_pair_id,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_id(self.currency_pair_id, "currency_pair_id")
    }

    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push_opt(&mut params, "limit_bids", self.limit_bids);
        push_opt(&mut params, "limit_asks", self.limit_asks);
        params
    }
}

/// Candles for one pair; candle size and both bounds are mandatory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChartQuery {
    pub currency_pair_id: u32,
    pub candle_type: Option<CandleType>,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ChartQuery {
    pub fn validate(&self) -> Result<()> {
        require_id(self.currency_pair_id, "currency_pair_id")?;
        if self.candle_type.is_none() {
            return Err(StexError::missing("candle_type"));
        }
        if self.time_start.is_none() {
            return Err(StexError::missing("time_start"));
        }
        if self.time_end.is_none() {
            return Err(StexError::missing("time_end"));
        }
        check_range(self.time_start, self.time_end)
    }

    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push_opt(&mut params, "timeStart", self.time_start.map(|t| t.timestamp()));
        push_opt(&mut params, "timeEnd", self.time_end.map(|t| t.timestamp()));
        push_opt(&mut params, "limit", self.limit);
        push_opt(&mut params, "offset", self.offset);
        params
    }
}

/// New limit or stop-limit order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateOrderRequest {
    pub currency_pair_id: u32,
    pub order_type: Option<OrderType>,
    pub amount: Decimal,
    pub price: Decimal,
    pub trigger_price: Option<Decimal>,
}

impl CreateOrderRequest {
    pub fn limit(currency_pair_id: u32, order_type: OrderType, amount: Decimal, price: Decimal) -> Self {
        Self {
            currency_pair_id,
            order_type: Some(order_type),
            amount,
            price,
            trigger_price: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_id(self.currency_pair_id, "currency_pair_id")?;
        let order_type = self.order_type.ok_or_else(|| StexError::missing("order_type"))?;
        require_positive(self.amount, "amount")?;
        require_positive(self.price, "price")?;
        match self.trigger_price {
            Some(trigger) => require_positive(trigger, "trigger_price"),
            None if order_type.is_stop_limit() => Err(StexError::Validation(format!(
                "trigger_price is required for {order_type} orders"
            ))),
            None => Ok(()),
        }
    }

    pub(crate) fn form(&self) -> Params {
        let mut params = Params::new();
        push_opt(&mut params, "order_type", self.order_type);
        params.push(("amount", self.amount.normalize().to_string()));
        params.push(("price", self.price.normalize().to_string()));
        push_opt(&mut params, "trigger_price", self.trigger_price.map(|p| p.normalize()));
        params
    }
}

/// Closed orders report
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrdersHistoryQuery {
    pub currency_pair_id: Option<u32>,
    pub status: Option<OrderStatus>,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl OrdersHistoryQuery {
    pub fn validate(&self) -> Result<()> {
        check_range(self.time_start, self.time_end)
    }

    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push_opt(&mut params, "currencyPairId", self.currency_pair_id);
        push_opt(&mut params, "order_status", self.status);
        push_opt(
            &mut params,
            "timeStart",
            self.time_start.map(|t| t.format(REPORT_TIME_FORMAT).to_string()),
        );
        push_opt(
            &mut params,
            "timeEnd",
            self.time_end.map(|t| t.format(REPORT_TIME_FORMAT).to_string()),
        );
        push_opt(&mut params, "limit", self.limit);
        push_opt(&mut params, "offset", self.offset);
        params
    }
}

/// Own trades on one pair
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TradesHistoryQuery {
    pub currency_pair_id: u32,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl TradesHistoryQuery {
    pub fn new(currency_pair_id: u32) -> Self {
        Self {
            currency_pair_id,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_id(self.currency_pair_id, "currency_pair_id")?;
        check_range(self.time_start, self.time_end)
    }

    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push_opt(
            &mut params,
            "timeStart",
            self.time_start.map(|t| t.format(REPORT_TIME_FORMAT).to_string()),
        );
        push_opt(
            &mut params,
            "timeEnd",
            self.time_end.map(|t| t.format(REPORT_TIME_FORMAT).to_string()),
        );
        push_opt(&mut params, "limit", self.limit);
        push_opt(&mut params, "offset", self.offset);
        params
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalletsQuery {
    pub sort: Option<SortOrder>,
    pub sort_by: Option<SortBalanceField>,
}

impl WalletsQuery {
    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push_opt(&mut params, "sort", self.sort);
        push_opt(&mut params, "sortBy", self.sort_by);
        params
    }
}

/// Deposit or withdrawal listing filter
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransfersQuery {
    pub currency_id: Option<u32>,
    pub sort: Option<SortOrder>,
    pub time_start: Option<DateTime<Utc>>,
    pub time_end: Option<DateTime<Utc>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl TransfersQuery {
    pub fn validate(&self) -> Result<()> {
        check_range(self.time_start, self.time_end)
    }

    pub(crate) fn params(&self) -> Params {
        let mut params = Params::new();
        push_opt(&mut params, "currencyId", self.currency_id);
        push_opt(&mut params, "sort", self.sort);
        push_opt(&mut params, "timeStart", self.time_start.map(|t| t.timestamp()));
        push_opt(&mut params, "timeEnd", self.time_end.map(|t| t.timestamp()));
        push_opt(&mut params, "limit", self.limit);
        push_opt(&mut params, "offset", self.offset);
        params
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WithdrawRequest {
    pub currency_id: u32,
    pub amount: Decimal,
    pub address: String,
    pub protocol_id: Option<u32>,
    /// Payment id, memo or destination tag when the address needs one
    pub additional_address_parameter: Option<String>,
}

impl WithdrawRequest {
    pub fn validate(&self) -> Result<()> {
        require_id(self.currency_id, "currency_id")?;
        require_positive(self.amount, "amount")?;
        if self.address.trim().is_empty() {
            return Err(StexError::missing("address"));
        }
        Ok(())
    }

    pub(crate) fn form(&self) -> Params {
        let mut params = Params::new();
        params.push(("currency_id", self.currency_id.to_string()));
        params.push(("amount", self.amount.normalize().to_string()));
        params.push(("address", self.address.clone()));
        push_opt(&mut params, "protocol_id", self.protocol_id);
        push_opt(
            &mut params,
            "additional_address_parameter",
            self.additional_address_parameter.as_deref(),
        );
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::str::FromStr;

    fn dec(raw: &str) -> Decimal {
        Decimal::from_str(raw).unwrap()
    }

    #[test]
    fn test_stop_limit_needs_trigger_price() {
        let mut order = CreateOrderRequest::limit(7, OrderType::StopLimitBuy, dec("1"), dec("0.5"));
        assert!(matches!(order.validate(), Err(StexError::Validation(_))));

        order.trigger_price = Some(dec("0.45"));
        assert!(order.validate().is_ok());
    }

    #[test]
    fn test_create_order_missing_pair() {
        let order = CreateOrderRequest {
            order_type: Some(OrderType::Buy),
            amount: dec("1"),
            price: dec("1"),
            ..CreateOrderRequest::default()
        };
        let err = order.validate().unwrap_err();
        assert_eq!(err.to_string(), "Invalid parameters: currency_pair_id is required");
    }

    #[test]
    fn test_create_order_form_fields() {
        let order = CreateOrderRequest::limit(7, OrderType::Sell, dec("2.500"), dec("0.0100"));
        assert_eq!(
            order.form(),
            vec![
                ("order_type", "SELL".to_string()),
                ("amount", "2.5".to_string()),
                ("price", "0.01".to_string()),
            ]
        );
    }

    #[test]
    fn test_chart_query_requires_bounds() {
        let query = ChartQuery {
            currency_pair_id: 1,
            candle_type: Some(CandleType::OneHour),
            ..ChartQuery::default()
        };
        assert!(query.validate().is_err());

        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let reversed = ChartQuery {
            time_start: Some(start),
            time_end: Some(end),
            ..query
        };
        assert!(reversed.validate().is_err());
    }

    #[test]
    fn test_report_time_format() {
        let query = OrdersHistoryQuery {
            status: Some(OrderStatus::WithTrades),
            time_start: Some(Utc.with_ymd_and_hms(2024, 3, 4, 5, 6, 7).unwrap()),
            ..OrdersHistoryQuery::default()
        };
        assert_eq!(
            query.params(),
            vec![
                ("order_status", "WITH_TRADES".to_string()),
                ("timeStart", "2024-03-04 05:06:07".to_string()),
            ]
        );
    }

    #[test]
    fn test_trades_query_always_sends_offset() {
        let params = TradesQuery::new(3).params();
        assert_eq!(params, vec![("offset", "0".to_string())]);
    }

    #[test]
    fn test_withdraw_requires_address() {
        let request = WithdrawRequest {
            currency_id: 1,
            amount: dec("0.1"),
            address: "  ".to_string(),
            ..WithdrawRequest::default()
        };
        assert!(request.validate().is_err());
    }
}
