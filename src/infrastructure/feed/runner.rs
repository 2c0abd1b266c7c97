//! Websocket task that owns the feed connection.
//!
//! [`FeedRunner`] is the only code that touches the [`FeedStream`]. It
//! forwards subscription requests from the registry to the stream and hands
//! every received event to the dispatch thread.

use tokio::sync::watch;
use tracing::{info, trace, warn};

use super::subscription::SubscriptionRequests;
use crate::application::dispatch::DispatchSender;
use crate::domain::id::ProductId;
use crate::error::Result;
use crate::port::feed::{FeedEvent, FeedStream};

/// Counters reported when the runner stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Events handed to the dispatch thread.
    pub events: u64,
    /// Subscribe frames sent after startup.
    pub resubscribes: u64,
}

/// Drives a [`FeedStream`] until shutdown or end of stream.
pub struct FeedRunner<S: FeedStream> {
    stream: S,
    requests: SubscriptionRequests,
    dispatch: DispatchSender,
}

impl<S: FeedStream> FeedRunner<S> {
    pub fn new(stream: S, requests: SubscriptionRequests, dispatch: DispatchSender) -> Self {
        Self {
            stream,
            requests,
            dispatch,
        }
    }

    /// Connect, subscribe to `initial`, then pump events.
    ///
    /// Stops when `shutdown` flips to true or its sender is dropped, when the
    /// stream ends, or when the dispatch thread is gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the initial connect or subscribe fails.
    pub async fn run(
        mut self,
        initial: &[ProductId],
        mut shutdown: watch::Receiver<bool>,
    ) -> Result<RunSummary> {
        let feed = self.stream.feed_name();
        self.stream.connect().await?;
        if !initial.is_empty() {
            self.stream.subscribe(initial).await?;
        }
        info!(feed, products = initial.len(), "Listening for level-2 events");

        let mut summary = RunSummary::default();
        let mut requests_open = true;

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!(feed, "Shutdown signal received");
                        break;
                    }
                }
                request = self.requests.recv(), if requests_open => {
                    match request {
                        Some(product_ids) => {
                            summary.resubscribes += 1;
                            if let Err(e) = self.stream.subscribe(&product_ids).await {
                                warn!(feed, error = %e, "Subscribe failed, will retry on reconnect");
                            }
                        }
                        None => requests_open = false,
                    }
                }
                event = self.stream.next_event() => {
                    let Some(event) = event else {
                        warn!(feed, "Feed stream ended");
                        break;
                    };
                    if !self.forward(event, &mut summary) {
                        break;
                    }
                }
            }
        }

        info!(
            feed,
            events = summary.events,
            resubscribes = summary.resubscribes,
            "Feed runner stopped"
        );
        Ok(summary)
    }

    fn forward(&self, event: FeedEvent, summary: &mut RunSummary) -> bool {
        if let Some(product_id) = event.product_id() {
            trace!(product = %product_id, "Forwarding book event");
        }
        if self.dispatch.send(event).is_err() {
            warn!("Dispatch thread stopped, closing feed");
            return false;
        }
        summary.events += 1;
        true
    }
}
