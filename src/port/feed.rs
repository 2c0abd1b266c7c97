//! Feed port for market data and subscription control.
//!
//! These traits are the integration points between the order book registry
//! and an exchange feed implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::id::ProductId;
use crate::domain::level::{LevelChange, PriceLevel};
use crate::error::Result;

/// Parsed event delivered by a feed.
///
/// Prices and sizes are already decimals; string parsing happens in the
/// adapter that produced the event.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// Full book state for a product.
    Snapshot {
        /// The product this snapshot belongs to.
        product_id: ProductId,
        /// Bid levels.
        bids: Vec<PriceLevel>,
        /// Ask levels.
        asks: Vec<PriceLevel>,
    },
    /// Incremental level changes for a product.
    Update {
        /// The product these changes apply to.
        product_id: ProductId,
        /// Changes in feed order.
        changes: Vec<LevelChange>,
        /// Feed timestamp, when supplied.
        time: Option<DateTime<Utc>>,
    },
    /// The feed acknowledged a subscription.
    Subscribed {
        /// Products now covered by the subscription.
        product_ids: Vec<ProductId>,
    },
    /// The feed reported an error without closing the connection.
    FeedError {
        /// Error message from the feed.
        message: String,
    },
    /// Connection lost (may reconnect).
    Disconnected {
        /// The disconnection reason.
        reason: String,
    },
}

impl FeedEvent {
    /// Get the product ID if this event carries book data.
    #[must_use]
    pub fn product_id(&self) -> Option<&ProductId> {
        match self {
            Self::Snapshot { product_id, .. } | Self::Update { product_id, .. } => Some(product_id),
            _ => None,
        }
    }
}

/// Subscription control handed to the order book registry.
///
/// Calls are synchronous and must not block on network I/O; implementations
/// typically forward the request to the task that owns the connection.
pub trait FeedClient: Send + Sync {
    /// Replace the feed subscription with `product_ids`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be delivered to the feed.
    fn resubscribe(&self, product_ids: &[ProductId]) -> Result<()>;

    /// Get the feed name for logging/debugging.
    fn feed_name(&self) -> &'static str;
}

/// Real-time level-2 data stream from an exchange.
///
/// Implementations handle connection management, subscriptions, and message
/// parsing for their specific exchange protocols.
#[async_trait]
pub trait FeedStream: Send {
    /// Connect to the exchange's real-time data feed.
    async fn connect(&mut self) -> Result<()>;

    /// Subscribe to level-2 data for the given products.
    async fn subscribe(&mut self, product_ids: &[ProductId]) -> Result<()>;

    /// Receive the next feed event.
    ///
    /// Returns `None` when the stream is closed.
    async fn next_event(&mut self) -> Option<FeedEvent>;

    /// Get the feed name for logging/debugging.
    fn feed_name(&self) -> &'static str;
}

/// Implement FeedStream for boxed trait objects to allow use with generic wrappers.
#[async_trait]
impl FeedStream for Box<dyn FeedStream> {
    async fn connect(&mut self) -> Result<()> {
        (**self).connect().await
    }

    async fn subscribe(&mut self, product_ids: &[ProductId]) -> Result<()> {
        (**self).subscribe(product_ids).await
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        (**self).next_event().await
    }

    fn feed_name(&self) -> &'static str {
        (**self).feed_name()
    }
}
