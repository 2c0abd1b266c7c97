//! Reconnecting wrapper for [`FeedStream`].
//!
//! Adds exponential backoff and a circuit breaker to any feed stream. After
//! a successful reconnect the full product set is subscribed again, which
//! makes the venue send a fresh snapshot for every book.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::domain::id::ProductId;
use crate::error::Result;
use crate::infrastructure::config::reconnection::ReconnectionConfig;
use crate::port::feed::{FeedEvent, FeedStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CircuitState {
    Closed,
    /// Reconnects are paused until the instant passes.
    Open { until: Instant },
}

/// Feed stream that survives disconnects.
///
/// A `Disconnected` event from the inner stream is passed through once so
/// the registry can log it; the following `next_event` call reconnects and
/// resubscribes before reading again.
pub struct ReconnectingFeedStream<S: FeedStream> {
    inner: S,
    config: ReconnectionConfig,
    products: Vec<ProductId>,
    failures: u32,
    delay_ms: u64,
    circuit: CircuitState,
    connected: bool,
}

impl<S: FeedStream> ReconnectingFeedStream<S> {
    /// Wrap `inner`. The wrapper starts disconnected.
    pub fn new(inner: S, config: ReconnectionConfig) -> Self {
        let delay_ms = config.initial_delay_ms;
        Self {
            inner,
            config,
            products: Vec::new(),
            failures: 0,
            delay_ms,
            circuit: CircuitState::Closed,
            connected: false,
        }
    }

    /// Products that will be resubscribed after a reconnect.
    #[must_use]
    pub fn products(&self) -> &[ProductId] {
        &self.products
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected
    }

    fn reset_backoff(&mut self) {
        self.failures = 0;
        self.delay_ms = self.config.initial_delay_ms;
        self.circuit = CircuitState::Closed;
    }

    /// Current delay plus up to 20% jitter; advances the delay for next time.
    fn next_delay(&mut self) -> Duration {
        let base = Duration::from_millis(self.delay_ms);
        let delay = base + Duration::from_millis(jitter_ms(base));

        let grown = (self.delay_ms as f64 * self.config.backoff_multiplier) as u64;
        self.delay_ms = grown.min(self.config.max_delay_ms);

        delay
    }

    /// Remaining cooldown if the breaker is open; closes it once expired.
    fn cooldown_remaining(&mut self) -> Option<Duration> {
        match self.circuit {
            CircuitState::Closed => None,
            CircuitState::Open { until } => {
                let now = Instant::now();
                if now >= until {
                    info!("Circuit breaker cooldown expired");
                    self.reset_backoff();
                    None
                } else {
                    Some(until - now)
                }
            }
        }
    }

    fn record_failure(&mut self) {
        self.failures += 1;
        self.connected = false;

        if self.failures >= self.config.max_consecutive_failures {
            let cooldown = Duration::from_millis(self.config.circuit_breaker_cooldown_ms);
            self.circuit = CircuitState::Open {
                until: Instant::now() + cooldown,
            };
            error!(
                failures = self.failures,
                cooldown_secs = cooldown.as_secs(),
                "Circuit breaker tripped, pausing reconnection attempts"
            );
        }
    }

    async fn reconnect(&mut self) -> Result<()> {
        if let Some(remaining) = self.cooldown_remaining() {
            warn!(
                remaining_secs = remaining.as_secs(),
                "Circuit breaker open, waiting for cooldown"
            );
            sleep(remaining).await;
            self.reset_backoff();
        }

        let delay = self.next_delay();
        info!(
            feed = self.inner.feed_name(),
            delay_ms = delay.as_millis() as u64,
            attempt = self.failures + 1,
            "Reconnecting after delay"
        );
        sleep(delay).await;

        if let Err(e) = self.inner.connect().await {
            error!(error = %e, "Reconnection failed");
            self.record_failure();
            return Err(e);
        }

        if !self.products.is_empty() {
            debug!(products = self.products.len(), "Resubscribing after reconnect");
            if let Err(e) = self.inner.subscribe(&self.products).await {
                error!(error = %e, "Resubscribe failed after reconnect");
                self.record_failure();
                return Err(e);
            }
        }

        info!(feed = self.inner.feed_name(), "Reconnected");
        self.connected = true;
        self.reset_backoff();
        Ok(())
    }
}

fn jitter_ms(base: Duration) -> u64 {
    let range = (base.as_millis() as u64) / 5;
    if range == 0 {
        return 0;
    }
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    u64::from(nanos) % (range + 1)
}

#[async_trait]
impl<S: FeedStream> FeedStream for ReconnectingFeedStream<S> {
    async fn connect(&mut self) -> Result<()> {
        self.inner.connect().await?;
        self.connected = true;
        self.reset_backoff();
        Ok(())
    }

    /// Remember the set for later resubscription and forward it.
    async fn subscribe(&mut self, product_ids: &[ProductId]) -> Result<()> {
        self.products = product_ids.to_vec();
        if !self.connected {
            debug!(
                products = product_ids.len(),
                "Not connected, subscription deferred to reconnect"
            );
            return Ok(());
        }
        self.inner.subscribe(product_ids).await
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        loop {
            if !self.connected {
                if let Err(e) = self.reconnect().await {
                    warn!(error = %e, "Reconnection attempt failed, will retry");
                    continue;
                }
            }

            match self.inner.next_event().await {
                Some(event @ FeedEvent::Disconnected { .. }) => {
                    self.record_failure();
                    return Some(event);
                }
                Some(event) => {
                    if self.failures > 0 {
                        self.reset_backoff();
                    }
                    return Some(event);
                }
                None => {
                    warn!("Feed stream ended unexpectedly, will reconnect");
                    self.record_failure();
                }
            }
        }
    }

    fn feed_name(&self) -> &'static str {
        self.inner.feed_name()
    }
}
