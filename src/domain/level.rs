//! Price levels, book sides and level changes.
//!
//! - [`PriceLevel`] - A single aggregated price level
//! - [`Side`] - Which half of the book a level belongs to
//! - [`LevelChange`] - One incremental update to a single level
//!
//! # Examples
//!
//! ```
//! use coinbook::domain::level::{LevelChange, PriceLevel, Side};
//! use rust_decimal_macros::dec;
//!
//! let level = PriceLevel::new(dec!(100.5), dec!(2));
//! assert_eq!(level.price(), dec!(100.5));
//!
//! let change = LevelChange::new(Side::from_feed("buy").unwrap(), dec!(100.5), dec!(0));
//! assert!(change.is_removal());
//! ```

use std::fmt;

use serde::Serialize;

use super::money::{Price, Size};

/// A single price level in an order book.
///
/// Represents aggregated orders at a specific price point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceLevel {
    /// The price at this level.
    price: Price,
    /// Total size resting at this price.
    size: Size,
}

impl PriceLevel {
    /// Creates a new price level.
    #[must_use]
    pub const fn new(price: Price, size: Size) -> Self {
        Self { price, size }
    }

    /// Returns the price at this level.
    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    /// Returns the total size available at this level.
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }
}

impl From<(Price, Size)> for PriceLevel {
    fn from((price, size): (Price, Size)) -> Self {
        Self::new(price, size)
    }
}

/// Side of the book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy interest, best (highest) price first.
    Bid,
    /// Sell interest, best (lowest) price first.
    Ask,
}

impl Side {
    /// Map a feed side string onto a book side.
    ///
    /// `"buy"` lands on the bid side; any other value lands on the ask side.
    /// Returns `None` only for an empty string.
    #[must_use]
    pub fn from_feed(side: &str) -> Option<Self> {
        if side.is_empty() {
            return None;
        }
        if side.eq_ignore_ascii_case("buy") {
            Some(Self::Bid)
        } else {
            Some(Self::Ask)
        }
    }

    /// Returns true when better prices on this side are higher.
    #[must_use]
    pub const fn is_descending(self) -> bool {
        matches!(self, Self::Bid)
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bid => write!(f, "bid"),
            Self::Ask => write!(f, "ask"),
        }
    }
}

/// One incremental change to a price level.
///
/// A zero size means the level is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelChange {
    side: Side,
    price: Price,
    size: Size,
}

impl LevelChange {
    #[must_use]
    pub const fn new(side: Side, price: Price, size: Size) -> Self {
        Self { side, price, size }
    }

    #[must_use]
    pub const fn side(&self) -> Side {
        self.side
    }

    #[must_use]
    pub const fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Returns true if this change deletes its level.
    #[must_use]
    pub fn is_removal(&self) -> bool {
        self.size.is_zero()
    }
}
