//! Coinbook - Live level-2 order books for Coinbase products.
//!
//! The crate keeps one price-ordered book per tracked product and applies the
//! Coinbase `level2` feed to it. Deltas that arrive before a product's first
//! snapshot wait for that snapshot instead of being dropped.
//!
//! # Modules
//!
//! - [`domain`] - Price levels, per-side ladders, per-product books
//! - [`application`] - Product registry and the dispatch thread
//! - [`port`] - Feed traits the registry depends on
//! - [`adapter`] - Coinbase websocket messages and stream
//! - [`infrastructure`] - Configuration, reconnection, feed task
//! - [`cli`] - `coinbook` command handlers
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use coinbook::application::registry::CoinbaseOrderBook;
//! use coinbook::domain::{PriceLevel, ProductId};
//! use coinbook::infrastructure::feed::SubscriptionHandle;
//! use rust_decimal_macros::dec;
//!
//! let (handle, _requests) = SubscriptionHandle::channel("Coinbase");
//! let registry = CoinbaseOrderBook::new(Arc::new(handle));
//! registry.add_order_books(["BTC-USD"], false).unwrap();
//!
//! let btc = ProductId::from("BTC-USD");
//! registry.on_snapshot(&btc, &[PriceLevel::new(dec!(100), dec!(1))], &[]);
//! let book = registry.get_order_book(&btc).unwrap();
//! assert_eq!(book.best_bid().map(|l| l.price()), Some(dec!(100)));
//! ```

pub mod adapter;
pub mod application;
pub mod cli;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
