//! Port definitions (trait boundaries) for the order book engine.
//!
//! The engine never talks to a websocket directly. It sees the feed through
//! two traits:
//!
//! - [`feed::FeedClient`] - Synchronous subscription control, injected into
//!   the registry
//! - [`feed::FeedStream`] - Async source of parsed [`feed::FeedEvent`]s

pub mod feed;

pub use feed::{FeedClient, FeedEvent, FeedStream};
