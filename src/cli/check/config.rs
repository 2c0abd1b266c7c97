//! `coinbook check config`.

use std::path::Path;

use crate::cli::output;
use crate::error::{ConfigError, Result};
use crate::infrastructure::config::Config;

/// Validate the configuration file without connecting.
///
/// # Errors
///
/// Returns an error if the file is missing, malformed or invalid.
pub fn execute_config<P: AsRef<Path>>(config_path: P) -> Result<()> {
    let path = config_path.as_ref();
    output::note(&format!("Checking configuration: {}", path.display()));

    if !path.exists() {
        output::error(&format!("Configuration file not found: {}", path.display()));
        return Err(ConfigError::ReadFile(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            path.display().to_string(),
        ))
        .into());
    }

    let config = match Config::load(path) {
        Ok(config) => config,
        Err(e) => {
            output::error(&format!("Configuration error: {e}"));
            return Err(e);
        }
    };

    output::ok("Configuration file is valid");
    output::section("Summary");
    let products: Vec<&str> = config.products.iter().map(|p| p.as_str()).collect();
    output::key_value("Products", products.join(", "));
    output::key_value("Feed", &config.feed.ws_url);
    output::key_value("Channel", &config.feed.channel);
    output::key_value("Log level", &config.logging.level);
    output::key_value("Depth", config.display.depth);
    output::key_value("Interval", format!("{}s", config.display.interval_secs));
    Ok(())
}
