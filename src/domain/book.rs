//! Two-sided order book for a single product.
//!
//! This module provides:
//!
//! - [`ProductOrderBook`] - Live book mutated by the feed, read by any thread
//! - [`BookSnapshot`] - Point-in-time copy returned by queries
//!
//! # Concurrency
//!
//! Each side sits behind its own mutex, so an ask update never blocks a bid
//! read. Queries copy the requested levels under the lock and release it
//! before returning.
//!
//! Deltas must not land before the first snapshot. [`ProductOrderBook::apply_changes`]
//! waits on a [`SnapshotGate`] that [`ProductOrderBook::init_snapshot`] opens.
//!
//! # Examples
//!
//! ```
//! use coinbook::domain::book::ProductOrderBook;
//! use coinbook::domain::id::ProductId;
//! use coinbook::domain::level::{LevelChange, PriceLevel, Side};
//! use rust_decimal_macros::dec;
//!
//! let book = ProductOrderBook::new(ProductId::new("BTC-USD"));
//! book.init_snapshot(
//!     &[PriceLevel::new(dec!(100), dec!(1.5))],
//!     &[PriceLevel::new(dec!(101), dec!(2.0))],
//! );
//! book.apply_changes(&[LevelChange::new(Side::Ask, dec!(101), dec!(0.0))]);
//!
//! assert!(book.get_asks(None).is_empty());
//! assert_eq!(book.best_bid().unwrap().price(), dec!(100));
//! ```

use std::fmt::Write as _;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use tracing::{debug, trace};

use super::gate::SnapshotGate;
use super::id::ProductId;
use super::ladder::LevelMap;
use super::level::{LevelChange, PriceLevel, Side};
use super::money::Price;

/// Point-in-time copy of both sides of a book.
///
/// Asks are sorted ascending, bids descending (best prices first).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BookSnapshot {
    asks: Vec<PriceLevel>,
    bids: Vec<PriceLevel>,
}

impl BookSnapshot {
    /// Creates a snapshot from already-ordered levels.
    #[must_use]
    pub const fn with_levels(asks: Vec<PriceLevel>, bids: Vec<PriceLevel>) -> Self {
        Self { asks, bids }
    }

    #[must_use]
    pub fn asks(&self) -> &[PriceLevel] {
        &self.asks
    }

    #[must_use]
    pub fn bids(&self) -> &[PriceLevel] {
        &self.bids
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<&PriceLevel> {
        self.asks.first()
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<&PriceLevel> {
        self.bids.first()
    }
}

/// Live order book for one product.
pub struct ProductOrderBook {
    product_id: ProductId,
    asks: Mutex<LevelMap>,
    bids: Mutex<LevelMap>,
    snapshot: SnapshotGate,
    last_update: Mutex<Option<DateTime<Utc>>>,
}

impl ProductOrderBook {
    /// Creates an empty, uninitialized book.
    #[must_use]
    pub fn new(product_id: ProductId) -> Self {
        Self {
            product_id,
            asks: Mutex::new(LevelMap::asks()),
            bids: Mutex::new(LevelMap::bids()),
            snapshot: SnapshotGate::new(),
            last_update: Mutex::new(None),
        }
    }

    #[must_use]
    pub const fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Replaces both sides with the given levels and opens the snapshot gate.
    ///
    /// Any prior state is discarded. Zero-size levels are skipped.
    pub fn init_snapshot(&self, bids: &[PriceLevel], asks: &[PriceLevel]) {
        self.bids.lock().replace(bids.iter().copied());
        self.asks.lock().replace(asks.iter().copied());

        let first = self.snapshot.open();
        debug!(
            product = %self.product_id,
            bids = bids.len(),
            asks = asks.len(),
            first,
            "Applied book snapshot"
        );
    }

    /// Applies incremental level changes.
    ///
    /// Blocks until the first snapshot has been applied. A change with zero
    /// size removes its level; removing an absent level is a no-op.
    pub fn apply_changes(&self, changes: &[LevelChange]) {
        self.snapshot.wait();

        for change in changes {
            let side = match change.side() {
                Side::Bid => &self.bids,
                Side::Ask => &self.asks,
            };
            side.lock().set(change.price(), change.size());
        }

        trace!(product = %self.product_id, changes = changes.len(), "Applied book changes");
    }

    /// Applies changes and records the feed time they were stamped with.
    pub fn apply_changes_at(&self, changes: &[LevelChange], time: Option<DateTime<Utc>>) {
        self.apply_changes(changes);
        if let Some(time) = time {
            *self.last_update.lock() = Some(time);
        }
    }

    /// Returns up to `top_n` levels per side (all levels when `None`).
    #[must_use]
    pub fn get_book(&self, top_n: Option<usize>) -> BookSnapshot {
        BookSnapshot::with_levels(self.get_asks(top_n), self.get_bids(top_n))
    }

    /// Returns up to `top_n` ask levels, lowest price first.
    #[must_use]
    pub fn get_asks(&self, top_n: Option<usize>) -> Vec<PriceLevel> {
        self.asks.lock().slice(0, top_n)
    }

    /// Returns up to `top_n` bid levels, highest price first.
    #[must_use]
    pub fn get_bids(&self, top_n: Option<usize>) -> Vec<PriceLevel> {
        self.bids.lock().slice(0, top_n)
    }

    #[must_use]
    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.lock().best()
    }

    #[must_use]
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.lock().best()
    }

    /// Best ask minus best bid, when both sides have levels.
    #[must_use]
    pub fn spread(&self) -> Option<Price> {
        let ask = self.best_ask()?;
        let bid = self.best_bid()?;
        Some(ask.price() - bid.price())
    }

    /// Returns true once a snapshot has been applied.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.snapshot.is_open()
    }

    /// Waits up to `timeout` for the first snapshot.
    ///
    /// Returns true if the book is initialized on return.
    pub fn wait_for_snapshot(&self, timeout: Duration) -> bool {
        self.snapshot.wait_for(timeout)
    }

    /// Feed time of the most recent applied update, if the feed supplied one.
    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        *self.last_update.lock()
    }

    /// Renders the top `n` levels of both sides for diagnostics.
    ///
    /// Asks are listed highest first so the spread sits in the middle.
    #[must_use]
    pub fn top_n_string(&self, n: Option<usize>) -> String {
        let book = self.get_book(n);
        let mut out = String::new();

        let _ = writeln!(out, "{}", self.product_id);
        let _ = writeln!(out, "{:<5}{:>18}{:>18}", "side", "price", "size");
        for level in book.asks().iter().rev() {
            write_row(&mut out, Side::Ask, level);
        }
        let _ = writeln!(out, "{}", "-".repeat(41));
        for level in book.bids() {
            write_row(&mut out, Side::Bid, level);
        }

        out
    }
}

fn write_row(out: &mut String, side: Side, level: &PriceLevel) {
    let _ = writeln!(
        out,
        "{:<5}{:>18}{:>18}",
        side.to_string(),
        level.price().to_string(),
        level.size().to_string()
    );
}

impl std::fmt::Debug for ProductOrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProductOrderBook")
            .field("product_id", &self.product_id)
            .field("initialized", &self.is_initialized())
            .field("asks", &self.asks.lock().len())
            .field("bids", &self.bids.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use std::thread;

    fn level(price: rust_decimal::Decimal, size: rust_decimal::Decimal) -> PriceLevel {
        PriceLevel::new(price, size)
    }

    fn seeded_book() -> ProductOrderBook {
        let book = ProductOrderBook::new(ProductId::from("BTC-USD"));
        book.init_snapshot(
            &[level(dec!(100), dec!(1.5)), level(dec!(99), dec!(3))],
            &[level(dec!(101), dec!(2.0)), level(dec!(102), dec!(1))],
        );
        book
    }

    #[test]
    fn new_book_is_empty_and_uninitialized() {
        let book = ProductOrderBook::new(ProductId::from("BTC-USD"));
        assert!(!book.is_initialized());
        assert_eq!(book.get_book(None), BookSnapshot::default());
        assert!(book.spread().is_none());
    }

    #[test]
    fn snapshot_populates_both_sides() {
        let book = seeded_book();

        assert!(book.is_initialized());
        assert_eq!(book.best_bid().unwrap().price(), dec!(100));
        assert_eq!(book.best_ask().unwrap().price(), dec!(101));
        assert_eq!(book.spread(), Some(dec!(1)));
    }

    #[test]
    fn second_snapshot_overwrites_state() {
        let book = seeded_book();
        book.init_snapshot(&[level(dec!(50), dec!(1))], &[]);

        assert_eq!(book.get_bids(None), vec![level(dec!(50), dec!(1))]);
        assert!(book.get_asks(None).is_empty());
    }

    #[test]
    fn changes_route_by_side() {
        let book = seeded_book();
        book.apply_changes(&[
            LevelChange::new(Side::Bid, dec!(100.5), dec!(4)),
            LevelChange::new(Side::Ask, dec!(102), dec!(0)),
        ]);

        assert_eq!(book.best_bid().unwrap(), level(dec!(100.5), dec!(4)));
        assert_eq!(book.get_asks(None), vec![level(dec!(101), dec!(2.0))]);
    }

    #[test]
    fn redundant_removal_is_tolerated() {
        let book = seeded_book();
        let removal = LevelChange::new(Side::Ask, dec!(101), dec!(0.0));
        book.apply_changes(&[removal, removal]);
        book.apply_changes(&[removal]);

        assert_eq!(book.get_asks(None), vec![level(dec!(102), dec!(1))]);
    }

    #[test]
    fn get_book_limits_each_side() {
        let book = seeded_book();
        let snapshot = book.get_book(Some(1));

        assert_eq!(snapshot.asks(), &[level(dec!(101), dec!(2.0))]);
        assert_eq!(snapshot.bids(), &[level(dec!(100), dec!(1.5))]);
    }

    #[test]
    fn get_book_returns_a_copy() {
        let book = seeded_book();
        let before = book.get_book(None);
        book.apply_changes(&[LevelChange::new(Side::Bid, dec!(100), dec!(0))]);

        assert_eq!(before.bids().len(), 2);
        assert_eq!(book.get_bids(None).len(), 1);
    }

    #[test]
    fn apply_changes_at_records_time() {
        let book = seeded_book();
        let time = Utc::now();
        book.apply_changes_at(&[], Some(time));
        assert_eq!(book.last_update(), Some(time));

        book.apply_changes_at(&[], None);
        assert_eq!(book.last_update(), Some(time));
    }

    #[test]
    fn delta_before_snapshot_waits_for_it() {
        let book = Arc::new(ProductOrderBook::new(ProductId::from("ETH-USD")));

        let delta = {
            let book = Arc::clone(&book);
            thread::spawn(move || {
                book.apply_changes(&[LevelChange::new(Side::Bid, dec!(10), dec!(7))]);
            })
        };

        thread::sleep(Duration::from_millis(20));
        assert!(!delta.is_finished());
        assert!(book.get_bids(None).is_empty());

        book.init_snapshot(&[level(dec!(9), dec!(1))], &[]);
        delta.join().unwrap();

        assert_eq!(
            book.get_bids(None),
            vec![level(dec!(10), dec!(7)), level(dec!(9), dec!(1))]
        );
    }

    #[test]
    fn wait_for_snapshot_times_out_on_empty_book() {
        let book = ProductOrderBook::new(ProductId::from("ETH-USD"));
        assert!(!book.wait_for_snapshot(Duration::from_millis(5)));
    }

    #[test]
    fn top_n_string_lists_asks_above_bids() {
        let book = seeded_book();
        let rendered = book.top_n_string(Some(2));

        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "BTC-USD");
        assert!(lines[2].starts_with("ask") && lines[2].contains("102"));
        assert!(lines[3].starts_with("ask") && lines[3].contains("101"));
        assert!(lines[4].starts_with("---"));
        assert!(lines[5].starts_with("bid") && lines[5].contains("100"));
        assert!(lines[6].starts_with("bid") && lines[6].contains("99"));
    }
}
