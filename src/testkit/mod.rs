//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! - [`stream`] - Mock [`FeedStream`](crate::port::feed::FeedStream) implementations
//! - [`feed`] - Recording [`FeedClient`](crate::port::feed::FeedClient)
//! - [`domain`] - Builders for products, levels and feed events
//! - [`config`] - Canonical test configurations

pub mod config;
pub mod domain;
pub mod feed;
pub mod stream;
