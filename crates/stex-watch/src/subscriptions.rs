/*
[INPUT]:  Subscription entries from WatchConfig, a connected ChannelManager
[OUTPUT]: Channel names and live subscriptions that log every event
[POS]:    Subscription layer - config to typed channel mapping
[UPDATE]: When a subscription kind is added or event logging changes
*/

use std::fmt::Debug;
use std::sync::Arc;

use stex_adapter::{
    BalanceChannel, Channel, ChannelManager, OrderBookChannel, RateChannel, Result,
    SubscriptionHandle, UserOrderDeleteChannel, UserOrderFillChannel, UserOrderUpdateChannel,
};
use tracing::info;

use crate::config::{SubscriptionConfig, WatchConfig};
use crate::stats::WatchStats;

impl SubscriptionConfig {
    pub fn kind(&self) -> &'static str {
        match self {
            SubscriptionConfig::Rate => "rate",
            SubscriptionConfig::OrderBook { .. } => "order_book",
            SubscriptionConfig::OrderFill { .. } => "order_fill",
            SubscriptionConfig::OrderDelete { .. } => "order_delete",
            SubscriptionConfig::OrderUpdate { .. } => "order_update",
            SubscriptionConfig::Balance { .. } => "balance",
        }
    }

    pub fn is_private(&self) -> bool {
        match self {
            SubscriptionConfig::Rate => RateChannel::PRIVATE,
            SubscriptionConfig::OrderBook { .. } => OrderBookChannel::PRIVATE,
            SubscriptionConfig::OrderFill { .. } => UserOrderFillChannel::PRIVATE,
            SubscriptionConfig::OrderDelete { .. } => UserOrderDeleteChannel::PRIVATE,
            SubscriptionConfig::OrderUpdate { .. } => UserOrderUpdateChannel::PRIVATE,
            SubscriptionConfig::Balance { .. } => BalanceChannel::PRIVATE,
        }
    }

    /// Server-side channel name, or the validation error for a missing parameter
    pub fn channel_name(&self) -> Result<String> {
        match *self {
            SubscriptionConfig::Rate => RateChannel.name(),
            SubscriptionConfig::OrderBook {
                side,
                currency_pair_id,
            } => OrderBookChannel {
                trade_type: side,
                currency_pair_id,
            }
            .name(),
            SubscriptionConfig::OrderFill {
                user_id,
                currency_pair_id,
            } => UserOrderFillChannel {
                user_id,
                currency_pair_id,
            }
            .name(),
            SubscriptionConfig::OrderDelete {
                user_id,
                currency_pair_id,
            } => UserOrderDeleteChannel {
                user_id,
                currency_pair_id,
            }
            .name(),
            SubscriptionConfig::OrderUpdate {
                user_id,
                currency_pair_id,
                order_type,
            } => UserOrderUpdateChannel {
                user_id,
                currency_pair_id,
                order_type,
            }
            .name(),
            SubscriptionConfig::Balance { wallet_id } => BalanceChannel { wallet_id }.name(),
        }
    }

    /// Subscribe on the manager's current connection, logging and counting each event
    pub async fn subscribe(
        &self,
        manager: &ChannelManager,
        stats: &Arc<WatchStats>,
    ) -> Result<SubscriptionHandle> {
        match *self {
            SubscriptionConfig::Rate => subscribe_logged(manager, &RateChannel, stats).await,
            SubscriptionConfig::OrderBook {
                side,
                currency_pair_id,
            } => {
                let channel = OrderBookChannel {
                    trade_type: side,
                    currency_pair_id,
                };
                subscribe_logged(manager, &channel, stats).await
            }
            SubscriptionConfig::OrderFill {
                user_id,
                currency_pair_id,
            } => {
                let channel = UserOrderFillChannel {
                    user_id,
                    currency_pair_id,
                };
                subscribe_logged(manager, &channel, stats).await
            }
            SubscriptionConfig::OrderDelete {
                user_id,
                currency_pair_id,
            } => {
                let channel = UserOrderDeleteChannel {
                    user_id,
                    currency_pair_id,
                };
                subscribe_logged(manager, &channel, stats).await
            }
            SubscriptionConfig::OrderUpdate {
                user_id,
                currency_pair_id,
                order_type,
            } => {
                let channel = UserOrderUpdateChannel {
                    user_id,
                    currency_pair_id,
                    order_type,
                };
                subscribe_logged(manager, &channel, stats).await
            }
            SubscriptionConfig::Balance { wallet_id } => {
                subscribe_logged(manager, &BalanceChannel { wallet_id }, stats).await
            }
        }
    }
}

async fn subscribe_logged<C>(
    manager: &ChannelManager,
    channel: &C,
    stats: &Arc<WatchStats>,
) -> Result<SubscriptionHandle>
where
    C: Channel,
    C::Message: Debug,
{
    let name = channel.name()?;
    let stats = Arc::clone(stats);
    manager
        .subscribe_channel(channel, move |tag, message| {
            stats.record_event(&name);
            info!(channel = %name, tag, ?message, "event");
        })
        .await
}

/// Channel names of every configured subscription, in config order
pub fn channel_names(config: &WatchConfig) -> Result<Vec<String>> {
    config
        .subscriptions
        .iter()
        .map(SubscriptionConfig::channel_name)
        .collect()
}
