use std::io::Write;

use tempfile::NamedTempFile;

pub fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .prefix("coinbook-test-")
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file.flush().expect("flush temp config");
    file
}

pub const FULL_CONFIG: &str = r#"
products = ["BTC-USD", "ETH-USD"]

[feed]
ws_url = "wss://ws-feed.exchange.coinbase.com"
channel = "level2"

[logging]
level = "debug"
format = "json"

[reconnection]
initial_delay_ms = 250
max_delay_ms = 10000
backoff_multiplier = 1.5
max_consecutive_failures = 4
circuit_breaker_cooldown_ms = 60000

[display]
depth = 3
interval_secs = 2
"#;
