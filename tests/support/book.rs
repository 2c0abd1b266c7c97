use std::sync::Arc;

use rust_decimal::Decimal;

use coinbook::application::registry::CoinbaseOrderBook;
use coinbook::domain::{PriceLevel, ProductId};
use coinbook::testkit::feed::RecordingFeedClient;

pub fn level(price: &str, size: &str) -> PriceLevel {
    PriceLevel::new(dec(price), dec(size))
}

pub fn dec(raw: &str) -> Decimal {
    raw.parse().expect("decimal literal")
}

/// Ask levels 10..=14 with size equal to price / 10.
pub fn five_asks() -> Vec<PriceLevel> {
    (10..=14)
        .map(|p| PriceLevel::new(Decimal::from(p), Decimal::new(p, 1)))
        .collect()
}

/// A registry tracking `products`, plus the client recording its resubscribes.
pub fn registry_with(products: &[&str]) -> (CoinbaseOrderBook, Arc<RecordingFeedClient>) {
    let feed = Arc::new(RecordingFeedClient::new());
    let registry = CoinbaseOrderBook::new(feed.clone());
    registry
        .add_order_books(products.iter().copied().map(ProductId::from), false)
        .expect("add products");
    (registry, feed)
}
