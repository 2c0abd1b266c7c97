//! Coinbase websocket stream.
//!
//! [`CoinbaseStream`] owns one websocket connection and turns incoming text
//! frames into [`FeedEvent`]s. It does not reconnect on its own; wrap it in
//! [`ReconnectingFeedStream`](crate::infrastructure::feed::ReconnectingFeedStream)
//! for that.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};
use tracing::{error, info, trace, warn};

use super::message::{CoinbaseSubscribeMessage, CoinbaseWsMessage};
use crate::domain::id::ProductId;
use crate::error::{Error, Result};
use crate::port::feed::{FeedEvent, FeedStream};

/// Coinbase level-2 data stream implementing the `FeedStream` trait.
pub struct CoinbaseStream {
    url: String,
    channel: String,
    ws: Option<WebSocketStream<MaybeTlsStream<TcpStream>>>,
}

impl CoinbaseStream {
    /// Create a new data stream for the given websocket URL and channel.
    #[must_use]
    pub fn new(url: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            channel: channel.into(),
            ws: None,
        }
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn channel(&self) -> &str {
        &self.channel
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.ws.is_some()
    }

    /// Parse one text frame. Malformed frames are logged and dropped.
    fn parse_frame(text: &str) -> Option<FeedEvent> {
        let msg = match serde_json::from_str::<CoinbaseWsMessage>(text) {
            Ok(msg) => msg,
            Err(e) => {
                warn!(error = %e, bytes = text.len(), "Failed to parse message");
                return None;
            }
        };

        match msg.into_event() {
            Ok(event) => event,
            Err(e) => {
                warn!(error = %e, bytes = text.len(), "Dropping malformed message");
                None
            }
        }
    }
}

#[async_trait]
impl FeedStream for CoinbaseStream {
    async fn connect(&mut self) -> Result<()> {
        info!(url = %self.url, "Connecting to WebSocket");
        let (ws_stream, response) = connect_async(&self.url).await?;
        info!(status = %response.status(), "WebSocket connected");
        self.ws = Some(ws_stream);
        Ok(())
    }

    async fn subscribe(&mut self, product_ids: &[ProductId]) -> Result<()> {
        let ws = self
            .ws
            .as_mut()
            .ok_or_else(|| Error::Connection("Not connected".into()))?;

        let msg = CoinbaseSubscribeMessage::new(product_ids, &self.channel);
        let json = serde_json::to_string(&msg)?;

        // Log a truncated view of products to avoid spam
        let total = product_ids.len();
        if total <= 5 {
            info!(products = ?msg.product_ids, channel = %self.channel, "Subscribing to products");
        } else {
            let preview: Vec<_> = msg.product_ids.iter().take(5).collect();
            info!(products = ?preview, more = total - 5, channel = %self.channel, "Subscribing to products");
        }
        ws.send(Message::Text(json)).await?;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<FeedEvent> {
        let ws = self.ws.as_mut()?;

        loop {
            let frame = match ws.next().await {
                Some(frame) => frame,
                None => {
                    self.ws = None;
                    return Some(FeedEvent::Disconnected {
                        reason: "stream ended".into(),
                    });
                }
            };

            match frame {
                Ok(Message::Text(text)) => {
                    trace!(bytes = text.len(), "Received WebSocket text frame");
                    if let Some(event) = Self::parse_frame(&text) {
                        return Some(event);
                    }
                }
                Ok(Message::Ping(data)) => {
                    trace!("Received WebSocket ping");
                    if ws.send(Message::Pong(data)).await.is_err() {
                        self.ws = None;
                        return Some(FeedEvent::Disconnected {
                            reason: "Failed to send pong".into(),
                        });
                    }
                }
                Ok(Message::Close(frame)) => {
                    info!(frame = ?frame, "WebSocket closed by server");
                    self.ws = None;
                    return Some(FeedEvent::Disconnected {
                        reason: frame.map(|f| f.reason.to_string()).unwrap_or_default(),
                    });
                }
                Ok(_) => continue,
                Err(e) => {
                    error!(error = %e, "WebSocket error");
                    self.ws = None;
                    return Some(FeedEvent::Disconnected {
                        reason: e.to_string(),
                    });
                }
            }
        }
    }

    fn feed_name(&self) -> &'static str {
        "Coinbase"
    }
}
