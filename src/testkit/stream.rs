//! Mock [`FeedStream`] implementations.
//!
//! - [`ScriptedStream`] - Pre-loaded connect/subscribe results and events.
//!   Best for reconnection and error handling.
//! - [`ChannelStream`] - Events pushed on demand through a
//!   [`ChannelStreamHandle`]. Best for end-to-end runner tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::mpsc;

use crate::domain::id::ProductId;
use crate::error::Result;
use crate::port::feed::{FeedEvent, FeedStream};

/// Stream with scripted results and a fixed event queue.
///
/// `connect` and `subscribe` pop the next scripted result and default to
/// `Ok(())` once the queue is empty. `next_event` returns `None` once the
/// events run out.
pub struct ScriptedStream {
    connect_results: VecDeque<Result<()>>,
    subscribe_results: VecDeque<Result<()>>,
    events: VecDeque<Option<FeedEvent>>,
    connect_count: Arc<AtomicU32>,
    subscribe_count: Arc<AtomicU32>,
}

impl ScriptedStream {
    pub fn new() -> Self {
        Self {
            connect_results: VecDeque::new(),
            subscribe_results: VecDeque::new(),
            events: VecDeque::new(),
            connect_count: Arc::new(AtomicU32::new(0)),
            subscribe_count: Arc::new(AtomicU32::new(0)),
        }
    }

    pub fn with_connect_results(mut self, results: Vec<Result<()>>) -> Self {
        self.connect_results = results.into();
        self
    }

    pub fn with_subscribe_results(mut self, results: Vec<Result<()>>) -> Self {
        self.subscribe_results = results.into();
        self
    }

    pub fn with_events(mut self, events: Vec<Option<FeedEvent>>) -> Self {
        self.events = events.into();
        self
    }

    /// Shared `(connect, subscribe)` call counters.
    pub fn counts(&self) -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        (self.connect_count.clone(), self.subscribe_count.clone())
    }
}

impl Default for ScriptedStream {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FeedStream for ScriptedStream {
    async fn connect(&mut self) -> Result<()> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.connect_results.pop_front().unwrap_or(Ok(()))
    }

    async fn subscribe(&mut self, _product_ids: &[ProductId]) -> Result<()> {
        self.subscribe_count.fetch_add(1, Ordering::SeqCst);
        self.subscribe_results.pop_front().unwrap_or(Ok(()))
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        self.events.pop_front().flatten()
    }

    fn feed_name(&self) -> &'static str {
        "scripted"
    }
}

/// Stream fed from a [`ChannelStreamHandle`].
pub struct ChannelStream {
    rx: mpsc::UnboundedReceiver<Option<FeedEvent>>,
    subscriptions: Arc<Mutex<Vec<Vec<ProductId>>>>,
}

/// Control side of a [`ChannelStream`].
#[derive(Clone)]
pub struct ChannelStreamHandle {
    tx: mpsc::UnboundedSender<Option<FeedEvent>>,
    subscriptions: Arc<Mutex<Vec<Vec<ProductId>>>>,
}

impl ChannelStreamHandle {
    pub fn send(&self, event: FeedEvent) {
        let _ = self.tx.send(Some(event));
    }

    /// End the stream; `next_event` returns `None` afterwards.
    pub fn close(&self) {
        let _ = self.tx.send(None);
    }

    /// Every product set passed to `subscribe`, oldest first.
    pub fn subscriptions(&self) -> Vec<Vec<ProductId>> {
        self.subscriptions.lock().clone()
    }
}

pub fn channel_stream() -> (ChannelStream, ChannelStreamHandle) {
    let (tx, rx) = mpsc::unbounded_channel();
    let subscriptions = Arc::new(Mutex::new(Vec::new()));
    (
        ChannelStream {
            rx,
            subscriptions: subscriptions.clone(),
        },
        ChannelStreamHandle { tx, subscriptions },
    )
}

#[async_trait]
impl FeedStream for ChannelStream {
    async fn connect(&mut self) -> Result<()> {
        Ok(())
    }

    async fn subscribe(&mut self, product_ids: &[ProductId]) -> Result<()> {
        self.subscriptions.lock().push(product_ids.to_vec());
        Ok(())
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        self.rx.recv().await.flatten()
    }

    fn feed_name(&self) -> &'static str {
        "channel"
    }
}
