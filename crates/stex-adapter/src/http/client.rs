/*
[INPUT]:  HTTP configuration (base URL, timeouts, user agent) and optional API token
[OUTPUT]: Configured reqwest client ready for API calls, envelope decoding
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
*/

use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::http::error::ApiErrorBody;
use crate::http::{Result, StexError};
use crate::types::ApiResponse;

/// Base URL for the STEX REST API
pub const API_BASE_URL: &str = "https://api3.stex.com";
const DEFAULT_USER_AGENT: &str = "stex-adapter/rust";
const BODY_LOG_MAX_BYTES: usize = 1024;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: API_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Credentials for authenticated requests
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Personal access token issued by the exchange
    pub api_token: String,
}

impl Credentials {
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
        }
    }

    pub(crate) fn bearer(&self) -> String {
        format!("Bearer {}", self.api_token)
    }
}

/// Whether an endpoint needs the bearer token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Private,
}

/// Main HTTP client for the STEX API
#[derive(Debug)]
pub struct StexClient {
    http_client: Client,
    base_url: Url,
    credentials: Option<Credentials>,
}

impl StexClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent)
            .build()?;

        Ok(Self {
            http_client,
            base_url: Url::parse(&config.base_url)?,
            credentials: None,
        })
    }

    /// Create a client carrying an API token for private endpoints
    pub fn with_token(config: ClientConfig, api_token: impl Into<String>) -> Result<Self> {
        let mut client = Self::with_config(config)?;
        client.set_credentials(Credentials::new(api_token));
        Ok(client)
    }

    /// Set credentials for authenticated requests
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = Some(credentials);
    }

    /// Get credentials if set
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Base URL every endpoint is resolved against
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> Result<Url> {
        Ok(self.base_url.join(endpoint)?)
    }

    /// Build a request builder for an endpoint.
    ///
    /// Private endpoints get `Authorization: Bearer <token>`; without
    /// credentials they fail here, before anything is sent.
    pub(crate) fn request(
        &self,
        method: Method,
        endpoint: &str,
        access: Access,
    ) -> Result<RequestBuilder> {
        let url = self.url(endpoint)?;
        let builder = self
            .http_client
            .request(method, url)
            .header(ACCEPT, "application/json");

        match access {
            Access::Public => Ok(builder),
            Access::Private => {
                let credentials =
                    self.credentials
                        .as_ref()
                        .ok_or_else(|| StexError::Authentication {
                            message: format!("{endpoint} requires an API token"),
                        })?;
                Ok(builder.header(AUTHORIZATION, credentials.bearer()))
            }
        }
    }

    /// Send a request and unwrap the `{success, msg, data}` envelope.
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().clone();
        let body = response.text().await?;

        debug!(
            %url,
            status = status.as_u16(),
            bytes = body.len(),
            body = %truncate_for_log(&body, BODY_LOG_MAX_BYTES),
            "http response"
        );

        if status.is_client_error() || status.is_server_error() {
            let message = match serde_json::from_str::<ApiErrorBody>(&body) {
                Ok(envelope) if !envelope.message.is_empty() => envelope.message,
                Ok(_) | Err(_) => status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string(),
            };
            warn!(%url, status = status.as_u16(), message = %message, "api error response");
            return Err(StexError::api_error(status, message));
        }

        // `data` may be null on failure, so check the flag before typing it
        let envelope: ApiResponse<Option<Value>> = serde_json::from_str(&body)?;
        if !envelope.success {
            warn!(%url, message = %envelope.msg, "api rejected request");
            return Err(StexError::api_error(status, envelope.msg));
        }
        Ok(serde_json::from_value(envelope.data.unwrap_or(Value::Null))?)
    }
}

pub(crate) fn truncate_for_log(value: &str, max_len: usize) -> String {
    if value.len() <= max_len {
        return value.to_string();
    }
    let mut end = max_len;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = String::with_capacity(end + 3);
    out.push_str(&value[..end]);
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_private_request_without_token_fails_locally() {
        let client = StexClient::new().expect("client init");
        let err = client
            .request(Method::GET, "/profile/info", Access::Private)
            .expect_err("private endpoint must need a token");
        assert!(err.is_auth_error());
    }

    #[test]
    fn test_private_request_carries_bearer() {
        let client =
            StexClient::with_token(ClientConfig::default(), "secret").expect("client init");
        let request = client
            .request(Method::GET, "/profile/info", Access::Private)
            .expect("builder")
            .build()
            .expect("request");
        assert_eq!(
            request.headers().get(AUTHORIZATION).and_then(|v| v.to_str().ok()),
            Some("Bearer secret")
        );
        assert_eq!(request.url().as_str(), "https://api3.stex.com/profile/info");
    }

    #[test]
    fn test_public_request_has_no_bearer() {
        let client =
            StexClient::with_token(ClientConfig::default(), "secret").expect("client init");
        let request = client
            .request(Method::GET, "/public/ping", Access::Public)
            .expect("builder")
            .build()
            .expect("request");
        assert!(request.headers().get(AUTHORIZATION).is_none());
        assert_eq!(
            request.headers().get(ACCEPT).and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(truncate_for_log("short", 10), "short");
        assert_eq!(truncate_for_log("abcdefgh", 4), "abcd...");
    }
}
