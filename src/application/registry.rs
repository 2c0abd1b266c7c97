//! Registry of tracked product books.
//!
//! [`CoinbaseOrderBook`] owns one [`ProductOrderBook`] per tracked product,
//! routes feed events to them and asks the injected [`FeedClient`] to
//! resubscribe when new products are added.
//!
//! Products are never removed once tracked.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::domain::book::ProductOrderBook;
use crate::domain::id::ProductId;
use crate::domain::level::{LevelChange, PriceLevel};
use crate::error::{BookError, Result};
use crate::port::feed::{FeedClient, FeedEvent};

/// Notification sent after a book has been mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookUpdate {
    /// The product that was updated.
    pub product_id: ProductId,
}

/// Thread-safe registry of product order books.
pub struct CoinbaseOrderBook {
    books: RwLock<HashMap<ProductId, Arc<ProductOrderBook>>>,
    feed: Arc<dyn FeedClient>,
    /// Broadcast sender for update notifications.
    /// Wrapped in Option to allow construction without notifications.
    tx: Option<broadcast::Sender<BookUpdate>>,
}

impl CoinbaseOrderBook {
    /// Create an empty registry bound to `feed`.
    #[must_use]
    pub fn new(feed: Arc<dyn FeedClient>) -> Self {
        Self {
            books: RwLock::new(HashMap::new()),
            feed,
            tx: None,
        }
    }

    /// Create an empty registry with broadcast notifications.
    ///
    /// Returns the registry and a receiver for update notifications.
    /// Additional receivers can be created via `subscribe()`.
    #[must_use]
    pub fn with_notifications(
        feed: Arc<dyn FeedClient>,
        capacity: usize,
    ) -> (Self, broadcast::Receiver<BookUpdate>) {
        let (tx, rx) = broadcast::channel(capacity);
        let registry = Self {
            books: RwLock::new(HashMap::new()),
            feed,
            tx: Some(tx),
        };
        (registry, rx)
    }

    /// Subscribe to book update notifications.
    ///
    /// Returns `None` if the registry was created without notifications.
    #[must_use]
    pub fn subscribe(&self) -> Option<broadcast::Receiver<BookUpdate>> {
        self.tx.as_ref().map(|tx| tx.subscribe())
    }

    /// Get the book for a tracked product.
    ///
    /// # Errors
    ///
    /// Returns [`BookError::UntrackedProduct`] if the product was never added.
    pub fn get_order_book(
        &self,
        product_id: &ProductId,
    ) -> std::result::Result<Arc<ProductOrderBook>, BookError> {
        self.lookup(product_id)
            .ok_or_else(|| BookError::UntrackedProduct {
                product_id: product_id.clone(),
            })
    }

    /// All tracked product ids, sorted.
    #[must_use]
    pub fn get_tracked_products(&self) -> BTreeSet<ProductId> {
        self.books.read().keys().cloned().collect()
    }

    /// Start tracking `product_ids`.
    ///
    /// Ids that are already tracked keep their existing book. When
    /// `refresh_subscriptions` is set and at least one id is new, the feed is
    /// asked to resubscribe with the full tracked set.
    ///
    /// Returns the ids that were newly added.
    ///
    /// # Errors
    ///
    /// Returns an error if the resubscription request cannot be delivered.
    /// The new books stay registered in that case.
    pub fn add_order_books<I, P>(
        &self,
        product_ids: I,
        refresh_subscriptions: bool,
    ) -> Result<Vec<ProductId>>
    where
        I: IntoIterator<Item = P>,
        P: Into<ProductId>,
    {
        let mut books = self.books.write();

        let mut added = Vec::new();
        for product_id in product_ids {
            let product_id = product_id.into();
            if books.contains_key(&product_id) {
                continue;
            }
            books.insert(
                product_id.clone(),
                Arc::new(ProductOrderBook::new(product_id.clone())),
            );
            added.push(product_id);
        }

        if added.is_empty() {
            return Ok(added);
        }
        info!(products = ?added, tracked = books.len(), "Tracking new order books");

        if refresh_subscriptions {
            // Held under the write lock so concurrent adds resubscribe in order.
            let mut tracked: Vec<ProductId> = books.keys().cloned().collect();
            tracked.sort();
            self.feed.resubscribe(&tracked)?;
            debug!(feed = self.feed.feed_name(), products = tracked.len(), "Requested resubscription");
        }

        Ok(added)
    }

    /// Apply a snapshot to a tracked product's book.
    ///
    /// Snapshots for untracked products are ignored.
    pub fn on_snapshot(&self, product_id: &ProductId, bids: &[PriceLevel], asks: &[PriceLevel]) {
        let Some(book) = self.lookup(product_id) else {
            debug!(product = %product_id, "Ignoring snapshot for untracked product");
            return;
        };
        book.init_snapshot(bids, asks);
        self.notify(product_id);
    }

    /// Apply level changes to a tracked product's book.
    ///
    /// Blocks until that product's first snapshot has arrived. Updates for
    /// untracked products are ignored.
    pub fn on_l2update(
        &self,
        product_id: &ProductId,
        changes: &[LevelChange],
        time: Option<DateTime<Utc>>,
    ) {
        let Some(book) = self.lookup(product_id) else {
            debug!(product = %product_id, "Ignoring update for untracked product");
            return;
        };
        book.apply_changes_at(changes, time);
        self.notify(product_id);
    }

    /// Dispatch a feed event to the right handler.
    pub fn route(&self, event: FeedEvent) {
        match event {
            FeedEvent::Snapshot {
                product_id,
                bids,
                asks,
            } => self.on_snapshot(&product_id, &bids, &asks),
            FeedEvent::Update {
                product_id,
                changes,
                time,
            } => self.on_l2update(&product_id, &changes, time),
            FeedEvent::Subscribed { product_ids } => {
                info!(products = ?product_ids, "Feed subscription confirmed");
            }
            FeedEvent::FeedError { message } => {
                warn!(feed = self.feed.feed_name(), message = %message, "Feed reported an error");
            }
            FeedEvent::Disconnected { reason } => {
                warn!(feed = self.feed.feed_name(), reason = %reason, "Feed disconnected");
            }
        }
    }

    /// Number of tracked products.
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clone the book handle and release the registry lock before returning,
    /// so a delta blocked on its snapshot never holds up registration.
    fn lookup(&self, product_id: &ProductId) -> Option<Arc<ProductOrderBook>> {
        self.books.read().get(product_id).cloned()
    }

    fn notify(&self, product_id: &ProductId) {
        // Ignore send errors - no receivers is fine
        if let Some(ref tx) = self.tx {
            let _ = tx.send(BookUpdate {
                product_id: product_id.clone(),
            });
        }
    }
}

impl std::fmt::Debug for CoinbaseOrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinbaseOrderBook")
            .field("feed", &self.feed.feed_name())
            .field("tracked", &self.get_tracked_products())
            .finish()
    }
}
