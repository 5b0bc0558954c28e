/*
[INPUT]:  WatchConfig, Dialer, shutdown CancellationToken
[OUTPUT]: Long-running subscription session with reconnect and backoff
[POS]:    Runtime layer - drives the channel manager until shutdown
[UPDATE]: When changing reconnection backoff or shutdown semantics
*/

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use stex_adapter::ws::{Dialer, SocketIoDialer};
use stex_adapter::{ChannelManager, SubscriptionHandle};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::WatchConfig;
use crate::stats::WatchStats;

const DEFAULT_RETRY_BASE: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Keeps one socket session alive and resubscribes after every loss
pub struct Watcher {
    config: WatchConfig,
    manager: ChannelManager,
    stats: Arc<WatchStats>,
    lost: mpsc::UnboundedReceiver<String>,
    retry_base: Duration,
    session_timeout: Duration,
}

impl Watcher {
    pub fn new(config: WatchConfig) -> Self {
        Self::with_dialer(config, Arc::new(SocketIoDialer))
    }

    pub fn with_dialer(config: WatchConfig, dialer: Arc<dyn Dialer>) -> Self {
        let stream_config = config.stream_config();
        let session_timeout = stream_config.transport.receive_timeout;
        let stats = Arc::new(WatchStats::new());
        let (lost_tx, lost) = mpsc::unbounded_channel();

        let manager = ChannelManager::with_dialer(stream_config, dialer)
            .on_connection({
                let stats = Arc::clone(&stats);
                move || {
                    stats.record_session();
                    info!("watch session established");
                }
            })
            .on_disconnect(move |reason| {
                warn!(reason, "watch session lost");
                let _ = lost_tx.send(reason.to_string());
            })
            .on_error({
                let stats = Arc::clone(&stats);
                move |err| {
                    stats.record_error();
                    warn!(error = %err, "watch stream error");
                }
            });

        Self {
            config,
            manager,
            stats,
            lost,
            retry_base: DEFAULT_RETRY_BASE,
            session_timeout,
        }
    }

    /// First reconnect delay; doubles per failed attempt up to 30s
    pub fn with_retry_base(mut self, retry_base: Duration) -> Self {
        self.retry_base = retry_base;
        self
    }

    /// How long a dialed socket may take to acknowledge the session
    pub fn with_session_timeout(mut self, session_timeout: Duration) -> Self {
        self.session_timeout = session_timeout;
        self
    }

    pub fn stats(&self) -> Arc<WatchStats> {
        Arc::clone(&self.stats)
    }

    /// Run until `shutdown` fires or `max_retries` dials in a row fail
    pub async fn run(mut self, shutdown: CancellationToken) -> Result<()> {
        let mut retry_count: u32 = 0;

        'run: loop {
            if shutdown.is_cancelled() {
                break 'run;
            }

            // a half-started session from the last attempt must not report again
            if let Err(err) = self.manager.disconnect().await {
                warn!(error = %err, "watch close failed");
            }
            while self.lost.try_recv().is_ok() {}

            match self.start_session(&shutdown).await {
                Ok(handles) => {
                    retry_count = 0;
                    info!(subscriptions = handles.len(), "watch subscribed");

                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break 'run,
                        reason = self.lost.recv() => {
                            let reason = reason.unwrap_or_default();
                            info!(reason = %reason, "watch reconnecting");
                        }
                    }

                    if !self.pause(&shutdown, self.retry_base).await {
                        break 'run;
                    }
                }
                Err(err) => {
                    retry_count = retry_count.saturating_add(1);
                    if retry_count >= self.config.max_retries {
                        warn!(retry_count, max_retries = self.config.max_retries, error = %err, "watch gave up reconnecting");
                        let _ = self.manager.disconnect().await;
                        return Err(anyhow::Error::new(err)
                            .context(format!("no session after {retry_count} attempts")));
                    }

                    let backoff = backoff_duration(self.retry_base, retry_count);
                    warn!(retry_count, ?backoff, error = %err, "watch connect failed; retrying with backoff");
                    if !self.pause(&shutdown, backoff).await {
                        break 'run;
                    }
                }
            }
        }

        self.manager.disconnect().await.context("close socket")?;
        info!(
            events = self.stats.total_events(),
            errors = self.stats.errors(),
            "watch stopped"
        );
        Ok(())
    }

    async fn start_session(
        &self,
        shutdown: &CancellationToken,
    ) -> stex_adapter::Result<Vec<SubscriptionHandle>> {
        self.manager.connect(shutdown.child_token()).await?;
        self.manager.wait_connected(self.session_timeout).await?;
        let mut handles = Vec::with_capacity(self.config.subscriptions.len());
        for subscription in &self.config.subscriptions {
            handles.push(subscription.subscribe(&self.manager, &self.stats).await?);
        }
        Ok(handles)
    }

    /// Sleep unless shutdown comes first; false means stop
    async fn pause(&self, shutdown: &CancellationToken, delay: Duration) -> bool {
        tokio::select! {
            _ = shutdown.cancelled() => false,
            _ = tokio::time::sleep(delay) => true,
        }
    }
}

fn backoff_duration(base: Duration, retry_count: u32) -> Duration {
    let exp = retry_count.saturating_sub(1).min(16);
    base.saturating_mul(1u32 << exp).min(MAX_BACKOFF)
}
