//! Logging configuration and initialization.

use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (e.g. `info`, `coinbook=debug`).
    #[serde(default = "default_level")]
    pub level: String,
    /// Output format: `pretty` or `json`.
    #[serde(default = "default_format")]
    pub format: String,
}

/// Accepted values for [`LoggingConfig::format`].
pub const LOG_FORMATS: &[&str] = &["pretty", "json"];

fn default_level() -> String {
    "info".into()
}

fn default_format() -> String {
    "pretty".into()
}

impl LoggingConfig {
    /// Returns true when logs should be emitted as JSON lines.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    /// Build the env filter; `RUST_LOG` takes precedence over `level`.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    /// Initialize the tracing subscriber with this logging configuration.
    ///
    /// Does nothing if a global subscriber is already installed.
    pub fn init(&self) {
        let builder = fmt().with_env_filter(self.filter()).with_writer(std::io::stderr);
        let _ = if self.is_json() {
            builder.json().try_init()
        } else {
            builder.try_init()
        };
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}
