//! Channel-backed [`FeedClient`].
//!
//! The registry calls `resubscribe` while holding its write lock, so the
//! call only queues the request. The [`FeedRunner`](super::runner::FeedRunner)
//! that owns the connection drains the queue and sends the subscribe frames
//! in the order they were requested.

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::id::ProductId;
use crate::error::{Error, Result};
use crate::port::feed::FeedClient;

/// Receiving half handed to the feed runner.
pub type SubscriptionRequests = mpsc::UnboundedReceiver<Vec<ProductId>>;

/// Registry-side handle for changing the feed subscription.
#[derive(Debug, Clone)]
pub struct SubscriptionHandle {
    feed_name: &'static str,
    tx: mpsc::UnboundedSender<Vec<ProductId>>,
}

impl SubscriptionHandle {
    /// Create a handle and the queue it feeds.
    #[must_use]
    pub fn channel(feed_name: &'static str) -> (Self, SubscriptionRequests) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { feed_name, tx }, rx)
    }
}

impl FeedClient for SubscriptionHandle {
    fn resubscribe(&self, product_ids: &[ProductId]) -> Result<()> {
        debug!(feed = self.feed_name, products = product_ids.len(), "Queueing resubscribe");
        self.tx
            .send(product_ids.to_vec())
            .map_err(|_| Error::Connection(format!("{} feed task stopped", self.feed_name)))
    }

    fn feed_name(&self) -> &'static str {
        self.feed_name
    }
}
