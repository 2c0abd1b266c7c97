//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; every section has defaults so
//! only `products` is strictly required.
//!
//! # Example
//!
//! ```no_run
//! use coinbook::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use serde::Deserialize;
use std::path::Path;

use super::display::DisplayConfig;
use super::feed::{FeedConfig, SUPPORTED_CHANNELS};
use super::logging::{LoggingConfig, LOG_FORMATS};
use super::reconnection::ReconnectionConfig;
use crate::domain::id::ProductId;
use crate::error::{ConfigError, Result};

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Products to track, e.g. `["BTC-USD", "ETH-USD"]`.
    #[serde(default)]
    pub products: Vec<ProductId>,

    /// Websocket endpoint and channel.
    #[serde(default)]
    pub feed: FeedConfig,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Websocket reconnection settings.
    #[serde(default)]
    pub reconnection: ReconnectionConfig,

    /// Terminal rendering settings.
    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Parse configuration from TOML content without validating it.
    ///
    /// Callers that layer overrides on top of the file use this and call
    /// [`Config::validate`] once the overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed.
    #[allow(clippy::result_large_err)]
    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content).map_err(ConfigError::Parse)?)
    }

    /// Parse and validate configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is malformed or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let config = Self::from_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file without validating it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    #[allow(clippy::result_large_err)]
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, the TOML is malformed,
    /// or validation fails.
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Initialize tracing from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    /// Tracked products, deduplicated and sorted.
    #[must_use]
    pub fn product_ids(&self) -> Vec<ProductId> {
        let mut ids = self.products.clone();
        ids.sort();
        ids.dedup();
        ids
    }

    /// Check that all values are within acceptable ranges.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] encountered.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.products.is_empty() {
            return Err(ConfigError::MissingField { field: "products" }.into());
        }
        if let Some(bad) = self.products.iter().find(|p| p.currencies().is_none()) {
            return Err(ConfigError::InvalidValue {
                field: "products",
                reason: format!("'{bad}' is not of the form BASE-QUOTE"),
            }
            .into());
        }

        self.validate_feed()?;
        self.validate_logging()?;
        self.validate_reconnection()?;

        if self.display.depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "display.depth",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        if self.display.interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "display.interval_secs",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }

    #[allow(clippy::result_large_err)]
    fn validate_feed(&self) -> Result<()> {
        if self.feed.ws_url.is_empty() {
            return Err(ConfigError::MissingField {
                field: "feed.ws_url",
            }
            .into());
        }
        let url = url::Url::parse(&self.feed.ws_url).map_err(|e| ConfigError::InvalidValue {
            field: "feed.ws_url",
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "ws" | "wss") {
            return Err(ConfigError::InvalidValue {
                field: "feed.ws_url",
                reason: format!("unsupported scheme '{}', expected ws or wss", url.scheme()),
            }
            .into());
        }
        if !SUPPORTED_CHANNELS.contains(&self.feed.channel.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "feed.channel",
                reason: format!("expected one of {}", SUPPORTED_CHANNELS.join(", ")),
            }
            .into());
        }
        Ok(())
    }

    #[allow(clippy::result_large_err)]
    fn validate_logging(&self) -> Result<()> {
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "logging.level",
            }
            .into());
        }
        if !LOG_FORMATS
            .iter()
            .any(|f| f.eq_ignore_ascii_case(&self.logging.format))
        {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected one of {}", LOG_FORMATS.join(", ")),
            }
            .into());
        }
        Ok(())
    }

    #[allow(clippy::result_large_err)]
    fn validate_reconnection(&self) -> Result<()> {
        let r = &self.reconnection;
        if r.initial_delay_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnection.initial_delay_ms",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        if r.max_delay_ms < r.initial_delay_ms {
            return Err(ConfigError::InvalidValue {
                field: "reconnection.max_delay_ms",
                reason: "must be at least initial_delay_ms".to_string(),
            }
            .into());
        }
        if r.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnection.backoff_multiplier",
                reason: "must be at least 1.0".to_string(),
            }
            .into());
        }
        if r.max_consecutive_failures == 0 {
            return Err(ConfigError::InvalidValue {
                field: "reconnection.max_consecutive_failures",
                reason: "must be greater than zero".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn invalid_field(result: Result<Config>) -> &'static str {
        match result {
            Err(Error::Config(ConfigError::InvalidValue { field, .. })) => field,
            Err(Error::Config(ConfigError::MissingField { field })) => field,
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn minimal_config_uses_defaults() {
        let config = Config::parse_toml(r#"products = ["BTC-USD"]"#).unwrap();
        assert_eq!(config.feed.ws_url, "wss://ws-feed.exchange.coinbase.com");
        assert_eq!(config.feed.channel, "level2");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.display.depth, 5);
        assert_eq!(config.reconnection.backoff_multiplier, 2.0);
    }

    #[test]
    fn product_ids_are_sorted_and_unique() {
        let config =
            Config::parse_toml(r#"products = ["ETH-USD", "BTC-USD", "ETH-USD"]"#).unwrap();
        assert_eq!(
            config.product_ids(),
            vec![ProductId::from("BTC-USD"), ProductId::from("ETH-USD")]
        );
    }

    #[test]
    fn empty_products_is_missing() {
        assert_eq!(invalid_field(Config::parse_toml("products = []")), "products");
        assert_eq!(invalid_field(Config::parse_toml("")), "products");
    }

    #[test]
    fn malformed_product_rejected() {
        assert_eq!(
            invalid_field(Config::parse_toml(r#"products = ["BTCUSD"]"#)),
            "products"
        );
    }

    #[test]
    fn non_websocket_url_rejected() {
        let toml = r#"
            products = ["BTC-USD"]
            [feed]
            ws_url = "https://example.com"
        "#;
        assert_eq!(invalid_field(Config::parse_toml(toml)), "feed.ws_url");
    }

    #[test]
    fn unknown_channel_rejected() {
        let toml = r#"
            products = ["BTC-USD"]
            [feed]
            channel = "ticker"
        "#;
        assert_eq!(invalid_field(Config::parse_toml(toml)), "feed.channel");
    }

    #[test]
    fn zero_depth_rejected() {
        let toml = r#"
            products = ["BTC-USD"]
            [display]
            depth = 0
        "#;
        assert_eq!(invalid_field(Config::parse_toml(toml)), "display.depth");
    }

    #[test]
    fn shrinking_backoff_rejected() {
        let toml = r#"
            products = ["BTC-USD"]
            [reconnection]
            backoff_multiplier = 0.5
        "#;
        assert_eq!(
            invalid_field(Config::parse_toml(toml)),
            "reconnection.backoff_multiplier"
        );
    }

    #[test]
    fn bad_log_format_rejected() {
        let toml = r#"
            products = ["BTC-USD"]
            [logging]
            format = "xml"
        "#;
        assert_eq!(invalid_field(Config::parse_toml(toml)), "logging.format");
    }

    #[test]
    fn from_toml_defers_validation() {
        let mut config = Config::from_toml("[display]\ndepth = 3").unwrap();
        assert!(config.products.is_empty());
        assert!(matches!(
            config.validate(),
            Err(Error::Config(ConfigError::MissingField { field: "products" }))
        ));

        config.products = vec![ProductId::from("BTC-USD")];
        config.validate().unwrap();
        assert_eq!(config.display.depth, 3);
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        let result = Config::parse_toml("products = [");
        assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
    }
}
