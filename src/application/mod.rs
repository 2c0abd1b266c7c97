//! Application services (use cases).
//!
//! - [`registry::CoinbaseOrderBook`]: Tracked product books and feed routing
//! - [`dispatch::Dispatcher`]: Dedicated thread that applies feed events

pub mod dispatch;
pub mod registry;
