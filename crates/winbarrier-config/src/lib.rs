//! winbarrier configuration.
//!
//! TOML-based configuration with serde defaults for every section, so a
//! partial file (or none at all) yields a working proxy.
//!
//! ```rust,no_run
//! use winbarrier_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    BarrierConfig, BusConfig, LogLevel, LoggingConfig, ProxyConfig, CONFIG_SCHEMA_VERSION,
    KNOWN_METHODS,
};
pub use toml_loader::{load_default, load_from_path};

use winbarrier_common::ConfigError;

/// Load config from the platform default path and validate it.
///
/// Creates a default file if none exists.
pub fn load_config() -> Result<BarrierConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &BarrierConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}
