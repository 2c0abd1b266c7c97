//! Canonical test configurations.

use crate::infrastructure::config::reconnection::ReconnectionConfig;

/// Reconnection config with zero delays so tests never wait.
pub fn fast_reconnection() -> ReconnectionConfig {
    ReconnectionConfig {
        initial_delay_ms: 0,
        max_delay_ms: 0,
        backoff_multiplier: 1.0,
        max_consecutive_failures: 5,
        circuit_breaker_cooldown_ms: 0,
    }
}

/// Smallest valid configuration file tracking `products`.
pub fn minimal_toml(products: &[&str]) -> String {
    let quoted: Vec<String> = products.iter().map(|p| format!("\"{p}\"")).collect();
    format!("products = [{}]\n", quoted.join(", "))
}
