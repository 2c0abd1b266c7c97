//! Terminal rendering settings for `coinbook run`.

use serde::Deserialize;

/// How much of each book to print and how often.
#[derive(Debug, Clone, Deserialize)]
pub struct DisplayConfig {
    /// Levels shown per side.
    #[serde(default = "default_depth")]
    pub depth: usize,
    /// Minimum seconds between renders of the same book.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

const fn default_depth() -> usize {
    5
}

const fn default_interval_secs() -> u64 {
    5
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
            interval_secs: default_interval_secs(),
        }
    }
}
