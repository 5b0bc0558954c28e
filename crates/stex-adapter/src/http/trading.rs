/*
[INPUT]:  Order parameters and currency pair identifiers
[OUTPUT]: Order records, cancellation results and trading fees
[POS]:    HTTP layer - trading endpoints (API token required)
[UPDATE]: When adding new trading endpoints or changing order parameters
*/

use reqwest::Method;
use tracing::info;

use crate::http::{Access, Result, StexClient, StexError};
use crate::types::{CreateOrderRequest, DeletedOrders, Fees, OrderInfo, Page};

fn require_pair(currency_pair_id: u32) -> Result<()> {
    if currency_pair_id == 0 {
        return Err(StexError::missing("currency_pair_id"));
    }
    Ok(())
}

impl StexClient {
    /// GET /trading/fees/{pair}
    pub async fn trading_fees(&self, currency_pair_id: u32) -> Result<Fees> {
        require_pair(currency_pair_id)?;
        let endpoint = format!("/trading/fees/{currency_pair_id}");
        let builder = self.request(Method::GET, &endpoint, Access::Private)?;
        self.send_json(builder).await
    }

    /// Open orders across all pairs
    ///
    /// GET /trading/orders
    pub async fn open_orders(&self, page: Page) -> Result<Vec<OrderInfo>> {
        let builder = self
            .request(Method::GET, "/trading/orders", Access::Private)?
            .query(&page.params());
        self.send_json(builder).await
    }

    /// DELETE /trading/orders
    pub async fn cancel_all_orders(&self) -> Result<DeletedOrders> {
        let builder = self.request(Method::DELETE, "/trading/orders", Access::Private)?;
        let deleted: DeletedOrders = self.send_json(builder).await?;
        info!(
            processing = deleted.processing.len(),
            pending = deleted.pending.len(),
            "cancel all orders accepted"
        );
        Ok(deleted)
    }

    /// GET /trading/orders/{pair}
    pub async fn pair_open_orders(&self, currency_pair_id: u32, page: Page) -> Result<Vec<OrderInfo>> {
        require_pair(currency_pair_id)?;
        let endpoint = format!("/trading/orders/{currency_pair_id}");
        let builder = self
            .request(Method::GET, &endpoint, Access::Private)?
            .query(&page.params());
        self.send_json(builder).await
    }

    /// DELETE /trading/orders/{pair}
    pub async fn cancel_pair_orders(&self, currency_pair_id: u32) -> Result<DeletedOrders> {
        require_pair(currency_pair_id)?;
        let endpoint = format!("/trading/orders/{currency_pair_id}");
        let builder = self.request(Method::DELETE, &endpoint, Access::Private)?;
        self.send_json(builder).await
    }

    /// Place a limit or stop-limit order.
    ///
    /// POST /trading/orders/{pair} (form: order_type, amount, price, trigger_price)
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<OrderInfo> {
        request.validate()?;
        let endpoint = format!("/trading/orders/{}", request.currency_pair_id);
        let builder = self
            .request(Method::POST, &endpoint, Access::Private)?
            .form(&request.form());
        let order: OrderInfo = self.send_json(builder).await?;
        info!(
            order_id = order.id,
            currency_pair_id = order.currency_pair_id,
            order_type = %order.order_type,
            "order created"
        );
        Ok(order)
    }

    /// GET /trading/order/{id}
    pub async fn order(&self, order_id: i64) -> Result<OrderInfo> {
        if order_id <= 0 {
            return Err(StexError::missing("order_id"));
        }
        let endpoint = format!("/trading/order/{order_id}");
        let builder = self.request(Method::GET, &endpoint, Access::Private)?;
        self.send_json(builder).await
    }

    /// DELETE /trading/order/{id}
    pub async fn cancel_order(&self, order_id: i64) -> Result<DeletedOrders> {
        if order_id <= 0 {
            return Err(StexError::missing("order_id"));
        }
        let endpoint = format!("/trading/order/{order_id}");
        let builder = self.request(Method::DELETE, &endpoint, Access::Private)?;
        self.send_json(builder).await
    }
}
