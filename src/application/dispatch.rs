//! Feed delivery thread.
//!
//! Applying a delta may block until its product's snapshot arrives, so feed
//! events are never applied on an async worker. The websocket task hands
//! each [`FeedEvent`] to a [`Dispatcher`], whose dedicated OS thread calls
//! [`CoinbaseOrderBook::route`] in arrival order.

use std::sync::Arc;
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info};

use super::registry::CoinbaseOrderBook;
use crate::error::{Error, Result};
use crate::port::feed::FeedEvent;

const THREAD_NAME: &str = "coinbook-dispatch";

/// Cloneable handle for submitting events to the dispatch thread.
#[derive(Debug, Clone)]
pub struct DispatchSender {
    tx: mpsc::UnboundedSender<FeedEvent>,
}

impl DispatchSender {
    /// Queue an event for the dispatch thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatch thread has stopped.
    pub fn send(&self, event: FeedEvent) -> Result<()> {
        self.tx
            .send(event)
            .map_err(|_| Error::Connection("dispatch thread stopped".into()))
    }
}

/// Owns the dispatch thread and the sending half of its queue.
pub struct Dispatcher {
    sender: DispatchSender,
    handle: thread::JoinHandle<()>,
}

impl Dispatcher {
    /// Spawn the dispatch thread for `registry`.
    ///
    /// # Errors
    ///
    /// Returns an error if the OS refuses to create the thread.
    pub fn spawn(registry: Arc<CoinbaseOrderBook>) -> Result<Self> {
        let (tx, mut rx) = mpsc::unbounded_channel::<FeedEvent>();

        let handle = thread::Builder::new()
            .name(THREAD_NAME.into())
            .spawn(move || {
                debug!("Dispatch thread started");
                let mut applied: u64 = 0;
                while let Some(event) = rx.blocking_recv() {
                    registry.route(event);
                    applied += 1;
                }
                info!(events = applied, "Dispatch thread stopped");
            })?;

        Ok(Self {
            sender: DispatchSender { tx },
            handle,
        })
    }

    /// Get a handle for submitting events.
    #[must_use]
    pub fn sender(&self) -> DispatchSender {
        self.sender.clone()
    }

    /// Queue an event for the dispatch thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatch thread has stopped.
    pub fn dispatch(&self, event: FeedEvent) -> Result<()> {
        self.sender.send(event)
    }

    /// Close the queue and wait for every queued event to be applied.
    ///
    /// Outstanding [`DispatchSender`] clones keep the thread alive, so drop
    /// them first. A queued delta for a product that never receives a
    /// snapshot blocks this call indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if the dispatch thread panicked.
    pub fn join(self) -> Result<()> {
        let Self { sender, handle } = self;
        drop(sender);
        handle
            .join()
            .map_err(|_| Error::Connection("dispatch thread panicked".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::id::ProductId;
    use crate::domain::level::{LevelChange, PriceLevel, Side};
    use crate::testkit::feed::RecordingFeedClient;
    use rust_decimal_macros::dec;

    fn tracked_registry(product: &str) -> Arc<CoinbaseOrderBook> {
        let registry = Arc::new(CoinbaseOrderBook::new(Arc::new(RecordingFeedClient::new())));
        registry.add_order_books([product], false).unwrap();
        registry
    }

    #[test]
    fn events_are_applied_in_order() {
        let registry = tracked_registry("BTC-USD");
        let dispatcher = Dispatcher::spawn(Arc::clone(&registry)).unwrap();
        let product_id = ProductId::from("BTC-USD");

        dispatcher
            .dispatch(FeedEvent::Snapshot {
                product_id: product_id.clone(),
                bids: vec![PriceLevel::new(dec!(100), dec!(1))],
                asks: vec![],
            })
            .unwrap();
        for size in [dec!(2), dec!(3), dec!(4)] {
            dispatcher
                .dispatch(FeedEvent::Update {
                    product_id: product_id.clone(),
                    changes: vec![LevelChange::new(Side::Bid, dec!(100), size)],
                    time: None,
                })
                .unwrap();
        }
        dispatcher.join().unwrap();

        let book = registry.get_order_book(&product_id).unwrap();
        assert_eq!(book.get_bids(None), vec![PriceLevel::new(dec!(100), dec!(4))]);
    }

    #[test]
    fn cloned_senders_feed_the_same_thread() {
        let registry = tracked_registry("ETH-USD");
        let dispatcher = Dispatcher::spawn(Arc::clone(&registry)).unwrap();

        let sender = dispatcher.sender();
        thread::spawn(move || {
            sender
                .send(FeedEvent::Snapshot {
                    product_id: ProductId::from("ETH-USD"),
                    bids: vec![],
                    asks: vec![PriceLevel::new(dec!(2000), dec!(1))],
                })
                .unwrap();
        })
        .join()
        .unwrap();
        dispatcher.join().unwrap();

        let book = registry.get_order_book(&ProductId::from("ETH-USD")).unwrap();
        assert!(book.is_initialized());
        assert_eq!(book.best_ask().unwrap().price(), dec!(2000));
    }
}
