//! In-memory [`FeedClient`] that records resubscribe calls.

use parking_lot::Mutex;

use crate::domain::id::ProductId;
use crate::error::{Error, Result};
use crate::port::feed::FeedClient;

#[derive(Debug, Default)]
pub struct RecordingFeedClient {
    requests: Mutex<Vec<Vec<ProductId>>>,
    fail: bool,
}

impl RecordingFeedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// A client whose every resubscribe is rejected (after being recorded).
    pub fn failing() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Every product set passed to `resubscribe`, oldest first.
    pub fn requests(&self) -> Vec<Vec<ProductId>> {
        self.requests.lock().clone()
    }

    pub fn last_request(&self) -> Option<Vec<ProductId>> {
        self.requests.lock().last().cloned()
    }
}

impl FeedClient for RecordingFeedClient {
    fn resubscribe(&self, product_ids: &[ProductId]) -> Result<()> {
        self.requests.lock().push(product_ids.to_vec());
        if self.fail {
            return Err(Error::Connection("feed unavailable".into()));
        }
        Ok(())
    }

    fn feed_name(&self) -> &'static str {
        "recording"
    }
}
