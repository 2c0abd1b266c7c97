//! Infrastructure layer.
//!
//! Technical concerns that support the order books without containing book
//! logic.
//!
//! - [`config`] - Configuration loading and validation
//! - [`feed`] - Reconnection, subscription queue and the feed task

pub mod config;
pub mod feed;
