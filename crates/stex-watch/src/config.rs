/*
[INPUT]:  YAML configuration file, optional STEX_API_TOKEN override
[OUTPUT]: Parsed watch configuration and the derived StreamConfig
[POS]:    Configuration layer - watcher setup
[UPDATE]: When adding new configuration options or subscription kinds
*/

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use stex_adapter::{OrderType, StreamConfig, TradeType};

/// Top-level configuration for the watcher
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WatchConfig {
    /// Bearer token for private channels
    #[serde(default)]
    pub api_token: Option<String>,
    /// socket.io endpoint; the exchange socket when unset
    #[serde(default)]
    pub socket_url: Option<String>,
    /// Failed connection attempts in a row before giving up
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Channels to subscribe on every session
    pub subscriptions: Vec<SubscriptionConfig>,
}

/// One channel subscription, selected by `kind`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubscriptionConfig {
    Rate,
    OrderBook {
        #[serde(default)]
        side: Option<TradeType>,
        #[serde(default)]
        currency_pair_id: Option<u32>,
    },
    OrderFill {
        #[serde(default)]
        user_id: Option<i64>,
        #[serde(default)]
        currency_pair_id: Option<u32>,
    },
    OrderDelete {
        #[serde(default)]
        user_id: Option<i64>,
        #[serde(default)]
        currency_pair_id: Option<u32>,
    },
    OrderUpdate {
        #[serde(default)]
        user_id: Option<i64>,
        #[serde(default)]
        currency_pair_id: Option<u32>,
        #[serde(default)]
        order_type: Option<OrderType>,
    },
    Balance {
        #[serde(default)]
        wallet_id: Option<i64>,
    },
}

fn default_max_retries() -> u32 {
    10
}

impl WatchConfig {
    /// Load configuration from YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).context("parse watch config")
    }

    /// A non-empty token from the environment wins over the file
    pub fn with_env_token(mut self, env_token: Option<String>) -> Self {
        if let Some(token) = env_token.filter(|token| !token.trim().is_empty()) {
            self.api_token = Some(token);
        }
        self
    }

    /// Every subscription must resolve to a channel name
    pub fn validate(&self) -> Result<()> {
        if self.subscriptions.is_empty() {
            bail!("no subscriptions configured");
        }
        for (index, subscription) in self.subscriptions.iter().enumerate() {
            subscription
                .channel_name()
                .with_context(|| format!("subscription #{index} ({})", subscription.kind()))?;
        }
        Ok(())
    }

    pub fn has_private(&self) -> bool {
        self.subscriptions.iter().any(SubscriptionConfig::is_private)
    }

    pub fn stream_config(&self) -> StreamConfig {
        let mut config = StreamConfig::default();
        if let Some(url) = &self.socket_url {
            config.url = url.clone();
        }
        config.api_token = self.api_token.clone();
        config
    }
}
