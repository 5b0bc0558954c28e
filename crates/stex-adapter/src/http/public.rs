/*
[INPUT]:  Currency, pair and status identifiers plus query options
[OUTPUT]: Market data (currencies, pairs, tickers, trades, order book, candles)
[POS]:    HTTP layer - public market data endpoints (no auth required)
[UPDATE]: When adding new public endpoints or changing response format
*/

use reqwest::Method;

use crate::http::{Access, Result, StexClient, StexError};
use crate::types::{
    Candle, ChartQuery, CurrencyInfo, CurrencyPair, MarketInfo, OrderBook, OrderBookQuery,
    PairsGroup, Ping, PublicTrade, Ticker, TradesQuery, TransferStatus,
};

impl StexClient {
    /// Server time, useful as a liveness check
    ///
    /// GET /public/ping
    pub async fn ping(&self) -> Result<Ping> {
        let builder = self.request(Method::GET, "/public/ping", Access::Public)?;
        self.send_json(builder).await
    }

    /// GET /public/currencies
    pub async fn currencies(&self) -> Result<Vec<CurrencyInfo>> {
        let builder = self.request(Method::GET, "/public/currencies", Access::Public)?;
        self.send_json(builder).await
    }

    /// GET /public/currencies/{id}
    pub async fn currency(&self, currency_id: u32) -> Result<CurrencyInfo> {
        if currency_id == 0 {
            return Err(StexError::missing("currency_id"));
        }
        let endpoint = format!("/public/currencies/{currency_id}");
        let builder = self.request(Method::GET, &endpoint, Access::Public)?;
        self.send_json(builder).await
    }

    /// GET /public/markets
    pub async fn markets(&self) -> Result<Vec<MarketInfo>> {
        let builder = self.request(Method::GET, "/public/markets", Access::Public)?;
        self.send_json(builder).await
    }

    /// GET /public/pairs-groups
    pub async fn pairs_groups(&self) -> Result<Vec<PairsGroup>> {
        let builder = self.request(Method::GET, "/public/pairs-groups", Access::Public)?;
        self.send_json(builder).await
    }

    /// Pairs quoted in one market, `ALL` for every market
    ///
    /// GET /public/currency_pairs/list/{code}
    pub async fn currency_pairs(&self, market_code: &str) -> Result<Vec<CurrencyPair>> {
        let market_code = market_code.trim();
        if market_code.is_empty() {
            return Err(StexError::missing("market_code"));
        }
        let endpoint = format!("/public/currency_pairs/list/{market_code}");
        let builder = self.request(Method::GET, &endpoint, Access::Public)?;
        self.send_json(builder).await
    }

    /// GET /public/currency_pairs/group/{id}
    pub async fn currency_pairs_in_group(&self, group_id: u32) -> Result<Vec<CurrencyPair>> {
        if group_id == 0 {
            return Err(StexError::missing("group_id"));
        }
        let endpoint = format!("/public/currency_pairs/group/{group_id}");
        let builder = self.request(Method::GET, &endpoint, Access::Public)?;
        self.send_json(builder).await
    }

    /// GET /public/currency_pairs/{id}
    pub async fn currency_pair(&self, currency_pair_id: u32) -> Result<CurrencyPair> {
        if currency_pair_id == 0 {
            return Err(StexError::missing("currency_pair_id"));
        }
        let endpoint = format!("/public/currency_pairs/{currency_pair_id}");
        let builder = self.request(Method::GET, &endpoint, Access::Public)?;
        self.send_json(builder).await
    }

    /// GET /public/ticker
    pub async fn tickers(&self) -> Result<Vec<Ticker>> {
        let builder = self.request(Method::GET, "/public/ticker", Access::Public)?;
        self.send_json(builder).await
    }

    /// GET /public/ticker/{pair}
    pub async fn ticker(&self, currency_pair_id: u32) -> Result<Ticker> {
        if currency_pair_id == 0 {
            return Err(StexError::missing("currency_pair_id"));
        }
        let endpoint = format!("/public/ticker/{currency_pair_id}");
        let builder = self.request(Method::GET, &endpoint, Access::Public)?;
        self.send_json(builder).await
    }

    /// Recent public trades
    ///
    /// GET /public/trades/{pair}?sort&from&till&limit&offset
    pub async fn trades(&self, query: &TradesQuery) -> Result<Vec<PublicTrade>> {
        query.validate()?;
        let endpoint = format!("/public/trades/{}", query.currency_pair_id);
        let builder = self
            .request(Method::GET, &endpoint, Access::Public)?
            .query(&query.params());
        self.send_json(builder).await
    }

    /// GET /public/orderbook/{pair}?limit_bids&limit_asks
    pub async fn order_book(&self, query: &OrderBookQuery) -> Result<OrderBook> {
        query.validate()?;
        let endpoint = format!("/public/orderbook/{}", query.currency_pair_id);
        let builder = self
            .request(Method::GET, &endpoint, Access::Public)?
            .query(&query.params());
        self.send_json(builder).await
    }

    /// Candles for one pair
    ///
    /// GET /public/chart/{pair}/{candle}?timeStart&timeEnd&limit&offset
    pub async fn chart(&self, query: &ChartQuery) -> Result<Vec<Candle>> {
        query.validate()?;
        let candle = query
            .candle_type
            .ok_or_else(|| StexError::missing("candle_type"))?;
        let endpoint = format!("/public/chart/{}/{}", query.currency_pair_id, candle);
        let builder = self
            .request(Method::GET, &endpoint, Access::Public)?
            .query(&query.params());
        self.send_json(builder).await
    }

    /// GET /public/deposit-statuses
    pub async fn deposit_statuses(&self) -> Result<Vec<TransferStatus>> {
        let builder = self.request(Method::GET, "/public/deposit-statuses", Access::Public)?;
        self.send_json(builder).await
    }

    /// GET /public/deposit-statuses/{id}
    pub async fn deposit_status(&self, status_id: u32) -> Result<TransferStatus> {
        if status_id == 0 {
            return Err(StexError::missing("status_id"));
        }
        let endpoint = format!("/public/deposit-statuses/{status_id}");
        let builder = self.request(Method::GET, &endpoint, Access::Public)?;
        self.send_json(builder).await
    }

    /// GET /public/withdrawal-statuses
    pub async fn withdrawal_statuses(&self) -> Result<Vec<TransferStatus>> {
        let builder = self.request(Method::GET, "/public/withdrawal-statuses", Access::Public)?;
        self.send_json(builder).await
    }

    /// GET /public/withdrawal-statuses/{id}
    pub async fn withdrawal_status(&self, status_id: u32) -> Result<TransferStatus> {
        if status_id == 0 {
            return Err(StexError::missing("status_id"));
        }
        let endpoint = format!("/public/withdrawal-statuses/{status_id}");
        let builder = self.request(Method::GET, &endpoint, Access::Public)?;
        self.send_json(builder).await
    }
}
