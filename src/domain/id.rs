//! Domain identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Product identifier (e.g. `BTC-USD`) - newtype for type safety.
///
/// The inner String is private to ensure all construction goes through
/// the defined constructors.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Create a new `ProductId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the product ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into `(base, quote)` currencies.
    ///
    /// Returns `None` unless the id has the `BASE-QUOTE` form with both
    /// halves non-empty.
    #[must_use]
    pub fn currencies(&self) -> Option<(&str, &str)> {
        let (base, quote) = self.0.split_once('-')?;
        if base.is_empty() || quote.is_empty() || quote.contains('-') {
            return None;
        }
        Some((base, quote))
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ProductId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for ProductId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_id_new_and_as_str() {
        let id = ProductId::new("BTC-USD");
        assert_eq!(id.as_str(), "BTC-USD");
    }

    #[test]
    fn product_id_from_string() {
        let id = ProductId::from("ETH-EUR".to_string());
        assert_eq!(id.as_str(), "ETH-EUR");
    }

    #[test]
    fn product_id_display() {
        assert_eq!(format!("{}", ProductId::from("SOL-USD")), "SOL-USD");
    }

    #[test]
    fn product_id_currencies() {
        assert_eq!(ProductId::from("BTC-USD").currencies(), Some(("BTC", "USD")));
        assert_eq!(ProductId::from("BTCUSD").currencies(), None);
        assert_eq!(ProductId::from("-USD").currencies(), None);
        assert_eq!(ProductId::from("BTC-").currencies(), None);
        assert_eq!(ProductId::from("A-B-C").currencies(), None);
    }

    #[test]
    fn product_id_orders_lexically() {
        let mut ids = vec![ProductId::from("ETH-USD"), ProductId::from("BTC-USD")];
        ids.sort();
        assert_eq!(ids[0].as_str(), "BTC-USD");
    }

    #[test]
    fn product_id_serializes_as_plain_string() {
        let json = serde_json::to_string(&ProductId::from("BTC-USD")).unwrap();
        assert_eq!(json, r#""BTC-USD""#);
    }
}
