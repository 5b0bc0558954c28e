/*
[INPUT]:  Wallet, currency, protocol and transfer identifiers
[OUTPUT]: Account profile, wallets, addresses, deposits, withdrawals, notifications
[POS]:    HTTP layer - user profile endpoints (API token required)
[UPDATE]: When adding new profile endpoints or changing response format
*/

use reqwest::Method;
use tracing::info;

use crate::http::{Access, Result, StexClient, StexError};
use crate::types::{
    Address, Deposit, Notification, Page, ProfileInfo, Referral, TransfersQuery, Wallet,
    WalletDetails, WalletsQuery, WithdrawRequest, Withdrawal,
};

fn require(value: i64, name: &str) -> Result<()> {
    if value <= 0 {
        return Err(StexError::missing(name));
    }
    Ok(())
}

fn protocol_param(protocol_id: Option<u32>) -> Vec<(&'static str, String)> {
    protocol_id
        .map(|id| vec![("protocol_id", id.to_string())])
        .unwrap_or_default()
}

impl StexClient {
    /// GET /profile/info
    pub async fn profile(&self) -> Result<ProfileInfo> {
        let builder = self.request(Method::GET, "/profile/info", Access::Private)?;
        self.send_json(builder).await
    }

    /// GET /profile/wallets
    pub async fn wallets(&self, query: WalletsQuery) -> Result<Vec<Wallet>> {
        let builder = self
            .request(Method::GET, "/profile/wallets", Access::Private)?
            .query(&query.params());
        self.send_json(builder).await
    }

    /// GET /profile/wallets/{id}
    pub async fn wallet(&self, wallet_id: i64) -> Result<WalletDetails> {
        require(wallet_id, "wallet_id")?;
        let endpoint = format!("/profile/wallets/{wallet_id}");
        let builder = self.request(Method::GET, &endpoint, Access::Private)?;
        self.send_json(builder).await
    }

    /// Open a wallet for a currency
    ///
    /// POST /profile/wallets/{currency}?protocol_id
    pub async fn create_wallet(
        &self,
        currency_id: u32,
        protocol_id: Option<u32>,
    ) -> Result<WalletDetails> {
        require(i64::from(currency_id), "currency_id")?;
        let endpoint = format!("/profile/wallets/{currency_id}");
        let builder = self
            .request(Method::POST, &endpoint, Access::Private)?
            .query(&protocol_param(protocol_id));
        let wallet: WalletDetails = self.send_json(builder).await?;
        info!(wallet_id = wallet.id, currency_id, "wallet created");
        Ok(wallet)
    }

    /// GET /profile/wallets/address/{wallet}?protocol_id
    pub async fn wallet_address(&self, wallet_id: i64, protocol_id: Option<u32>) -> Result<Address> {
        require(wallet_id, "wallet_id")?;
        let endpoint = format!("/profile/wallets/address/{wallet_id}");
        let builder = self
            .request(Method::GET, &endpoint, Access::Private)?
            .query(&protocol_param(protocol_id));
        self.send_json(builder).await
    }

    /// Generate a fresh deposit address
    ///
    /// POST /profile/wallets/address/{wallet}?protocol_id
    pub async fn create_wallet_address(
        &self,
        wallet_id: i64,
        protocol_id: Option<u32>,
    ) -> Result<Address> {
        require(wallet_id, "wallet_id")?;
        let endpoint = format!("/profile/wallets/address/{wallet_id}");
        let builder = self
            .request(Method::POST, &endpoint, Access::Private)?
            .query(&protocol_param(protocol_id));
        self.send_json(builder).await
    }

    /// GET /profile/deposits
    pub async fn deposits(&self, query: &TransfersQuery) -> Result<Vec<Deposit>> {
        query.validate()?;
        let builder = self
            .request(Method::GET, "/profile/deposits", Access::Private)?
            .query(&query.params());
        self.send_json(builder).await
    }

    /// GET /profile/deposits/{id}
    pub async fn deposit(&self, deposit_id: i64) -> Result<Deposit> {
        require(deposit_id, "deposit_id")?;
        let endpoint = format!("/profile/deposits/{deposit_id}");
        let builder = self.request(Method::GET, &endpoint, Access::Private)?;
        self.send_json(builder).await
    }

    /// GET /profile/withdrawals
    pub async fn withdrawals(&self, query: &TransfersQuery) -> Result<Vec<Withdrawal>> {
        query.validate()?;
        let builder = self
            .request(Method::GET, "/profile/withdrawals", Access::Private)?
            .query(&query.params());
        self.send_json(builder).await
    }

    /// GET /profile/withdrawals/{id}
    pub async fn withdrawal(&self, withdrawal_id: i64) -> Result<Withdrawal> {
        require(withdrawal_id, "withdrawal_id")?;
        let endpoint = format!("/profile/withdrawals/{withdrawal_id}");
        let builder = self.request(Method::GET, &endpoint, Access::Private)?;
        self.send_json(builder).await
    }

    /// Request a withdrawal.
    ///
    /// POST /profile/withdraw (form: currency_id, amount, address, protocol_id,
    /// additional_address_parameter)
    pub async fn withdraw(&self, request: &WithdrawRequest) -> Result<Withdrawal> {
        request.validate()?;
        let builder = self
            .request(Method::POST, "/profile/withdraw", Access::Private)?
            .form(&request.form());
        let withdrawal: Withdrawal = self.send_json(builder).await?;
        info!(
            withdrawal_id = withdrawal.id,
            currency_id = request.currency_id,
            amount = %request.amount,
            "withdrawal requested"
        );
        Ok(withdrawal)
    }

    /// DELETE /profile/withdraw/{id}
    pub async fn cancel_withdrawal(&self, withdrawal_id: i64) -> Result<Withdrawal> {
        require(withdrawal_id, "withdrawal_id")?;
        let endpoint = format!("/profile/withdraw/{withdrawal_id}");
        let builder = self.request(Method::DELETE, &endpoint, Access::Private)?;
        self.send_json(builder).await
    }

    /// GET /profile/notifications
    pub async fn notifications(&self, page: Page) -> Result<Vec<Notification>> {
        let builder = self
            .request(Method::GET, "/profile/notifications", Access::Private)?
            .query(&page.params());
        self.send_json(builder).await
    }

    /// POST /profile/referral/program
    pub async fn create_referral_program(&self) -> Result<Referral> {
        let builder = self.request(Method::POST, "/profile/referral/program", Access::Private)?;
        self.send_json(builder).await
    }

    /// Attach the account to someone else's referral code
    ///
    /// POST /profile/referral/insert (form: code)
    pub async fn set_referral_code(&self, code: &str) -> Result<Referral> {
        let code = code.trim();
        if code.is_empty() {
            return Err(StexError::missing("code"));
        }
        let builder = self
            .request(Method::POST, "/profile/referral/insert", Access::Private)?
            .form(&[("code", code)]);
        self.send_json(builder).await
    }
}
