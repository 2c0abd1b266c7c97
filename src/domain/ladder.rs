//! Price-ordered level storage for one side of a book.
//!
//! [`LevelMap`] keeps `price -> size` in a [`BTreeMap`] and walks it forwards
//! for asks (lowest first) or backwards for bids (highest first). Sizes of
//! zero are never stored: setting a level to zero removes it.

use std::collections::BTreeMap;

use super::level::{PriceLevel, Side};
use super::money::{Price, Size};

/// Sorted price levels for a single side of the book.
#[derive(Debug, Clone)]
pub struct LevelMap {
    side: Side,
    levels: BTreeMap<Price, Size>,
}

impl LevelMap {
    /// Creates an empty map ordered for `side`.
    #[must_use]
    pub const fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    /// Creates an empty ask-side map (ascending prices).
    #[must_use]
    pub const fn asks() -> Self {
        Self::new(Side::Ask)
    }

    /// Creates an empty bid-side map (descending prices).
    #[must_use]
    pub const fn bids() -> Self {
        Self::new(Side::Bid)
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    /// Sets the size at `price`.
    ///
    /// A positive size inserts or overwrites the level. A zero size removes
    /// it, and removing a level that is not present is a no-op. Negative sizes
    /// are treated like zero.
    pub fn set(&mut self, price: Price, size: Size) {
        if size > Size::ZERO {
            self.levels.insert(price, size);
        } else {
            self.levels.remove(&price);
        }
    }

    /// Clears the map and loads `levels`, skipping non-positive sizes.
    pub fn replace<I>(&mut self, levels: I)
    where
        I: IntoIterator<Item = PriceLevel>,
    {
        self.levels.clear();
        for level in levels {
            self.set(level.price(), level.size());
        }
    }

    /// Returns the size resting at `price`, if any.
    #[must_use]
    pub fn get(&self, price: &Price) -> Option<Size> {
        self.levels.get(price).copied()
    }

    /// Returns the best level for this side.
    #[must_use]
    pub fn best(&self) -> Option<PriceLevel> {
        let entry = if self.side.is_descending() {
            self.levels.iter().next_back()
        } else {
            self.levels.iter().next()
        };
        entry.map(|(price, size)| PriceLevel::new(*price, *size))
    }

    /// Returns the levels at positions `start..stop` in side order.
    ///
    /// `stop = None` returns everything from `start` onwards. Out-of-range
    /// bounds yield fewer (or zero) entries rather than an error.
    #[must_use]
    pub fn slice(&self, start: usize, stop: Option<usize>) -> Vec<PriceLevel> {
        let take = match stop {
            Some(stop) => stop.saturating_sub(start),
            None => usize::MAX,
        };
        self.iter().skip(start).take(take).collect()
    }

    /// Iterates levels best-first.
    pub fn iter(&self) -> Box<dyn Iterator<Item = PriceLevel> + '_> {
        let levels = self
            .levels
            .iter()
            .map(|(price, size)| PriceLevel::new(*price, *size));
        if self.side.is_descending() {
            Box::new(levels.rev())
        } else {
            Box::new(levels)
        }
    }

    /// Number of price levels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}
