//! Full configuration validation.
//!
//! Each section has its own check; this orchestrator runs them all and
//! collects every error into a single `ConfigError`.

mod helpers;
mod sections;


use crate::schema::BarrierConfig;
use winbarrier_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &BarrierConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    sections::validate_proxy(&mut errors, config);
    sections::validate_bus(&mut errors, config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}
