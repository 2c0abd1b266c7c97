//! Monetary types for price and size representation.

use rust_decimal::Decimal;

/// Price represented as a Decimal for precision.
pub type Price = Decimal;

/// Aggregate size at a price level, represented as a Decimal for precision.
pub type Size = Decimal;

/// Parse a feed-supplied decimal string.
///
/// Accepts plain and scientific notation (`"0.0"`, `"1.5e-3"`). Whatever the
/// spelling, the resulting value is compared numerically afterwards.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    raw.parse::<Decimal>()
        .ok()
        .or_else(|| Decimal::from_scientific(raw).ok())
}
