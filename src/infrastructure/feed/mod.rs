//! Feed connection management.
//!
//! - [`reconnecting`] - Backoff and circuit breaker around any stream
//! - [`subscription`] - Channel-backed `FeedClient` for the registry
//! - [`runner`] - Task that owns the connection and feeds the dispatcher

pub mod reconnecting;
pub mod runner;
pub mod subscription;

pub use reconnecting::ReconnectingFeedStream;
pub use runner::{FeedRunner, RunSummary};
pub use subscription::{SubscriptionHandle, SubscriptionRequests};
