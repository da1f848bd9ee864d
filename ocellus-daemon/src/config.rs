//! Configuration loading
//!
//! Reads a TOML file when one is given, otherwise (or when it cannot be
//! read) falls back to the copy compiled into the binary. Whatever is
//! loaded must pass validation before anything is started.

use std::fs;
use std::path::Path;

use log::{info, warn};
use ocellus_core::config::Config;
use ocellus_core::ConfigError;

/// Default configuration compiled into the binary
pub const EMBEDDED_CONFIG: &str = include_str!("../ocellus.toml");

/// Parse and validate TOML text
pub fn parse_config(text: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Load the runtime configuration
///
/// An unreadable file is not fatal; an unparsable or invalid one is.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    if let Some(path) = path {
        match fs::read_to_string(path) {
            Ok(text) => {
                let config = parse_config(&text)?;
                info!("Loaded configuration from {}", path.display());
                return Ok(config);
            }
            Err(e) => {
                warn!(
                    "Cannot read {} ({}), using embedded configuration",
                    path.display(),
                    e
                );
            }
        }
    }
    let config = parse_config(EMBEDDED_CONFIG)?;
    info!("Using embedded configuration");
    Ok(config)
}
