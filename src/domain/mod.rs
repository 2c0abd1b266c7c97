//! Feed-agnostic order book types.
//!
//! - [`ladder::LevelMap`] - Price-ordered levels for one side
//! - [`book::ProductOrderBook`] - Both sides of one product's book
//! - [`gate::SnapshotGate`] - Orders deltas after the first snapshot

pub mod book;
pub mod gate;
pub mod id;
pub mod ladder;
pub mod level;
pub mod money;

pub use book::{BookSnapshot, ProductOrderBook};
pub use gate::SnapshotGate;
pub use id::ProductId;
pub use ladder::LevelMap;
pub use level::{LevelChange, PriceLevel, Side};
pub use money::{Price, Size};
