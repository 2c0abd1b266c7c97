//! Coinbase Exchange websocket feed.
//!
//! - [`message`] - Wire types for the `level2` channel
//! - [`stream`] - [`FeedStream`](crate::port::feed::FeedStream) implementation

pub mod message;
pub mod stream;

pub use message::{CoinbaseSubscribeMessage, CoinbaseWsMessage};
pub use stream::CoinbaseStream;

/// Public market data endpoint.
pub const DEFAULT_WS_URL: &str = "wss://ws-feed.exchange.coinbase.com";

/// Level-2 channel that sends a snapshot followed by `l2update` messages.
pub const DEFAULT_CHANNEL: &str = "level2";
