//! Builders for domain primitives and feed events used across tests.

use rust_decimal::Decimal;

use crate::domain::id::ProductId;
use crate::domain::level::{LevelChange, Side};
use crate::port::feed::FeedEvent;

pub fn product(id: &str) -> ProductId {
    ProductId::from(id)
}

/// Snapshot event with both sides empty.
pub fn snapshot_event(product_id: &str) -> FeedEvent {
    FeedEvent::Snapshot {
        product_id: product(product_id),
        bids: Vec::new(),
        asks: Vec::new(),
    }
}

/// Single-change update event without a timestamp.
pub fn update_event(product_id: &str, side: Side, price: Decimal, size: Decimal) -> FeedEvent {
    FeedEvent::Update {
        product_id: product(product_id),
        changes: vec![LevelChange::new(side, price, size)],
        time: None,
    }
}

pub fn disconnect_event(reason: &str) -> FeedEvent {
    FeedEvent::Disconnected {
        reason: reason.to_string(),
    }
}
