//! Coinbase websocket message types.
//!
//! Messages are JSON objects tagged by `type`. Prices and sizes arrive as
//! strings and are converted to decimals here, before anything reaches the
//! order book.
//!
//! Example messages:
//! ```json
//! {"type":"snapshot","product_id":"BTC-USD","bids":[["100.00","1.5"]],"asks":[["101.00","2.0"]]}
//! {"type":"l2update","product_id":"BTC-USD","time":"2019-08-14T20:42:27.265Z","changes":[["sell","101.00","0.0"]]}
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::id::ProductId;
use crate::domain::level::{LevelChange, PriceLevel, Side};
use crate::domain::money::{parse_decimal, Price, Size};
use crate::error::{Error, Result};
use crate::port::feed::FeedEvent;

/// Subscription request sent to the Coinbase websocket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoinbaseSubscribeMessage {
    #[serde(rename = "type")]
    pub msg_type: String,
    pub product_ids: Vec<String>,
    pub channels: Vec<String>,
}

impl CoinbaseSubscribeMessage {
    pub fn new(product_ids: &[ProductId], channel: &str) -> Self {
        Self {
            msg_type: "subscribe".into(),
            product_ids: product_ids.iter().map(|p| p.as_str().to_string()).collect(),
            channels: vec![channel.to_string()],
        }
    }
}

/// Messages received from the Coinbase websocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum CoinbaseWsMessage {
    #[serde(rename = "snapshot")]
    Snapshot(CoinbaseSnapshotMessage),

    #[serde(rename = "l2update")]
    L2Update(CoinbaseL2UpdateMessage),

    #[serde(rename = "subscriptions")]
    Subscriptions(CoinbaseSubscriptionsMessage),

    #[serde(rename = "error")]
    Error(CoinbaseErrorMessage),

    /// Heartbeats, tickers and anything else we do not consume.
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
pub struct CoinbaseSnapshotMessage {
    pub product_id: String,
    pub bids: Vec<(String, String)>,
    pub asks: Vec<(String, String)>,
}

#[derive(Debug, Deserialize)]
pub struct CoinbaseL2UpdateMessage {
    pub product_id: String,
    #[serde(default)]
    pub time: Option<DateTime<Utc>>,
    pub changes: Vec<(String, String, String)>,
}

#[derive(Debug, Deserialize)]
pub struct CoinbaseSubscriptionsMessage {
    #[serde(default)]
    pub channels: Vec<CoinbaseChannel>,
}

#[derive(Debug, Deserialize)]
pub struct CoinbaseChannel {
    pub name: String,
    #[serde(default)]
    pub product_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CoinbaseErrorMessage {
    pub message: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl CoinbaseWsMessage {
    /// Convert this message into a feed event.
    ///
    /// Returns `Ok(None)` for message types the order book does not consume.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] if a price, size or side cannot be parsed.
    pub fn into_event(self) -> Result<Option<FeedEvent>> {
        let event = match self {
            Self::Snapshot(msg) => FeedEvent::Snapshot {
                product_id: ProductId::from(msg.product_id),
                bids: parse_levels(&msg.bids)?,
                asks: parse_levels(&msg.asks)?,
            },
            Self::L2Update(msg) => FeedEvent::Update {
                product_id: ProductId::from(msg.product_id),
                changes: parse_changes(&msg.changes)?,
                time: msg.time,
            },
            Self::Subscriptions(msg) => {
                let mut product_ids: Vec<ProductId> = msg
                    .channels
                    .into_iter()
                    .filter(|c| c.name.starts_with("level2"))
                    .flat_map(|c| c.product_ids)
                    .map(ProductId::from)
                    .collect();
                product_ids.sort();
                product_ids.dedup();
                FeedEvent::Subscribed { product_ids }
            }
            Self::Error(msg) => FeedEvent::FeedError {
                message: match msg.reason {
                    Some(reason) => format!("{}: {reason}", msg.message),
                    None => msg.message,
                },
            },
            Self::Unknown => return Ok(None),
        };
        Ok(Some(event))
    }
}

fn parse_number(field: &'static str, raw: &str) -> Result<Price> {
    parse_decimal(raw).ok_or_else(|| Error::Parse(format!("invalid {field} '{raw}'")))
}

fn parse_levels(levels: &[(String, String)]) -> Result<Vec<PriceLevel>> {
    levels
        .iter()
        .map(|(price, size)| {
            let price = parse_number("price", price)?;
            let size: Size = parse_number("size", size)?;
            Ok(PriceLevel::new(price, size))
        })
        .collect()
}

fn parse_changes(changes: &[(String, String, String)]) -> Result<Vec<LevelChange>> {
    changes
        .iter()
        .map(|(side, price, size)| {
            let side = Side::from_feed(side)
                .ok_or_else(|| Error::Parse(format!("invalid side '{side}'")))?;
            let price = parse_number("price", price)?;
            let size = parse_number("size", size)?;
            Ok(LevelChange::new(side, price, size))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn parse(json: &str) -> Option<FeedEvent> {
        serde_json::from_str::<CoinbaseWsMessage>(json)
            .unwrap()
            .into_event()
            .unwrap()
    }

    #[test]
    fn subscribe_message_serializes_correctly() {
        let msg = CoinbaseSubscribeMessage::new(
            &[ProductId::from("BTC-USD"), ProductId::from("ETH-USD")],
            "level2",
        );
        let json = serde_json::to_string(&msg).unwrap();

        assert_eq!(
            json,
            r#"{"type":"subscribe","product_ids":["BTC-USD","ETH-USD"],"channels":["level2"]}"#
        );
    }

    #[test]
    fn snapshot_parses_to_decimal_levels() {
        let event = parse(
            r#"{"type":"snapshot","product_id":"BTC-USD","bids":[["100","1.5"]],"asks":[["101","2.0"],["102","0.5"]]}"#,
        );

        match event {
            Some(FeedEvent::Snapshot {
                product_id,
                bids,
                asks,
            }) => {
                assert_eq!(product_id.as_str(), "BTC-USD");
                assert_eq!(bids, vec![PriceLevel::new(dec!(100), dec!(1.5))]);
                assert_eq!(asks.len(), 2);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[test]
    fn l2update_parses_sides_and_time() {
        let event = parse(
            r#"{"type":"l2update","product_id":"BTC-USD","time":"2019-08-14T20:42:27.265Z","changes":[["buy","100.5","3"],["sell","101","0.0"]]}"#,
        );

        match event {
            Some(FeedEvent::Update {
                product_id,
                changes,
                time,
            }) => {
                assert_eq!(product_id.as_str(), "BTC-USD");
                assert!(time.is_some());
                assert_eq!(
                    changes,
                    vec![
                        LevelChange::new(Side::Bid, dec!(100.5), dec!(3)),
                        LevelChange::new(Side::Ask, dec!(101), dec!(0)),
                    ]
                );
                assert!(changes[1].is_removal());
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[test]
    fn l2update_without_time() {
        let event = parse(r#"{"type":"l2update","product_id":"ETH-USD","changes":[]}"#);
        assert!(matches!(event, Some(FeedEvent::Update { time: None, .. })));
    }

    #[test]
    fn subscriptions_collect_level2_products() {
        let event = parse(
            r#"{"type":"subscriptions","channels":[{"name":"level2","product_ids":["ETH-USD","BTC-USD"]},{"name":"heartbeat","product_ids":["SOL-USD"]}]}"#,
        );

        assert_eq!(
            event,
            Some(FeedEvent::Subscribed {
                product_ids: vec![ProductId::from("BTC-USD"), ProductId::from("ETH-USD")]
            })
        );
    }

    #[test]
    fn error_message_includes_reason() {
        let event = parse(r#"{"type":"error","message":"Failed to subscribe","reason":"bad product"}"#);
        assert_eq!(
            event,
            Some(FeedEvent::FeedError {
                message: "Failed to subscribe: bad product".into()
            })
        );
    }

    #[test]
    fn unknown_types_are_skipped() {
        assert_eq!(parse(r#"{"type":"heartbeat","sequence":90}"#), None);
        assert_eq!(parse(r#"{"type":"ticker","price":"1"}"#), None);
    }

    #[test]
    fn unparseable_size_is_an_error() {
        let msg: CoinbaseWsMessage = serde_json::from_str(
            r#"{"type":"l2update","product_id":"BTC-USD","changes":[["buy","100","abc"]]}"#,
        )
        .unwrap();

        assert!(matches!(msg.into_event(), Err(Error::Parse(_))));
    }
}
