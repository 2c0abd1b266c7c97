//! Feed connection settings.

use serde::Deserialize;

use crate::adapter::coinbase::{DEFAULT_CHANNEL, DEFAULT_WS_URL};

/// Level-2 channels the order book can consume.
pub const SUPPORTED_CHANNELS: &[&str] = &["level2", "level2_batch"];

/// Websocket feed configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// Websocket endpoint.
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    /// Level-2 channel name to subscribe to.
    #[serde(default = "default_channel")]
    pub channel: String,
}

fn default_ws_url() -> String {
    DEFAULT_WS_URL.to_string()
}

fn default_channel() -> String {
    DEFAULT_CHANNEL.to_string()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            channel: default_channel(),
        }
    }
}
