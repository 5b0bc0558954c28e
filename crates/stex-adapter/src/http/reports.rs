/*
[INPUT]:  Report filters (pair, status, time range, pagination)
[OUTPUT]: Closed orders, per-order trade details and own trade history
[POS]:    HTTP layer - report endpoints (API token required)
[UPDATE]: When adding new report endpoints or filters
*/

use reqwest::Method;

use crate::http::{Access, Result, StexClient, StexError};
use crate::types::{OrderInfo, OrderTradesDetail, OrdersHistoryQuery, Trade, TradesHistoryQuery};

impl StexClient {
    /// Past orders, optionally filtered by pair and status
    ///
    /// GET /reports/orders
    pub async fn orders_history(&self, query: &OrdersHistoryQuery) -> Result<Vec<OrderInfo>> {
        query.validate()?;
        let builder = self
            .request(Method::GET, "/reports/orders", Access::Private)?
            .query(&query.params());
        self.send_json(builder).await
    }

    /// One order with its trades and fees
    ///
    /// GET /reports/orders/{id}
    pub async fn order_trades(&self, order_id: i64) -> Result<OrderTradesDetail> {
        if order_id <= 0 {
            return Err(StexError::missing("order_id"));
        }
        let endpoint = format!("/reports/orders/{order_id}");
        let builder = self.request(Method::GET, &endpoint, Access::Private)?;
        self.send_json(builder).await
    }

    /// GET /reports/trades/{pair}
    pub async fn trades_history(&self, query: &TradesHistoryQuery) -> Result<Vec<Trade>> {
        query.validate()?;
        let endpoint = format!("/reports/trades/{}", query.currency_pair_id);
        let builder = self
            .request(Method::GET, &endpoint, Access::Private)?
            .query(&query.params());
        self.send_json(builder).await
    }
}

#[cfg(test)]
mod tests {
    use crate::http::{ClientConfig, StexClient};
    use crate::types::{OrderStatus, OrdersHistoryQuery, TradeType, TradesHistoryQuery};
    use chrono::{TimeZone, Utc};
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn authed_client(server: &MockServer) -> StexClient {
        StexClient::with_token(
            ClientConfig {
                base_url: server.uri(),
                ..ClientConfig::default()
            },
            "test-token",
        )
        .expect("client init")
    }

    #[tokio::test]
    async fn test_orders_history_filters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reports/orders"))
            .and(query_param("currencyPairId", "1"))
            .and(query_param("order_status", "FINISHED"))
            .and(query_param("timeStart", "2019-01-17 10:00:00"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"success":true,"data":[{"id":7,"currency_pair_id":1,"price":"1.5","type":"BUY","status":"FINISHED"}]}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let query = OrdersHistoryQuery {
            currency_pair_id: Some(1),
            status: Some(OrderStatus::Finished),
            time_start: Some(Utc.with_ymd_and_hms(2019, 1, 17, 10, 0, 0).unwrap()),
            ..OrdersHistoryQuery::default()
        };
        let orders = authed_client(&server)
            .orders_history(&query)
            .await
            .expect("orders history");
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].status, "FINISHED");
    }

    #[tokio::test]
    async fn test_order_trades_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reports/orders/7"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(
                r#"{"success":true,"data":{"id":7,"currency_pair_id":1,"price":"1.5","initial_amount":"3","type":"BUY","trades":[{"id":11,"buy_order_id":7,"sell_order_id":8,"price":"1.5","amount":"3","trade_type":"BUY","timestamp":"2019-01-17 10:05:00"}],"fees":[{"id":1,"currency_id":2,"amount":"0.001","timestamp":"2019-01-17 10:05:00"}]}}"#,
                "application/json",
            ))
            .expect(1)
            .mount(&server)
            .await;

        let detail = authed_client(&server).order_trades(7).await.expect("detail");
        assert_eq!(detail.trades.len(), 1);
        assert_eq!(detail.trades[0].trade_type, TradeType::Buy);
        assert_eq!(detail.fees.len(), 1);
    }

    #[tokio::test]
    async fn test_trades_history_rejects_inverted_range() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let query = TradesHistoryQuery {
            time_start: Some(Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap()),
            time_end: Some(Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()),
            ..TradesHistoryQuery::new(1)
        };
        let err = authed_client(&server)
            .trades_history(&query)
            .await
            .unwrap_err();
        assert!(matches!(err, crate::http::StexError::Validation(_)));
    }
}
