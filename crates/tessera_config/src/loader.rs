//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::TesseraConfig;
use std::path::Path;

/// File name looked up by [`load_config`].
pub const CONFIG_FILE_NAME: &str = "tessera.toml";

/// Loads and validates `<dir>/tessera.toml`.
pub fn load_config(dir: &Path) -> Result<TesseraConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE_NAME);
    let content = std::fs::read_to_string(&config_path)?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<TesseraConfig, ConfigError> {
    let config: TesseraConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &TesseraConfig) -> Result<(), ConfigError> {
    let opt = &config.optimize;
    if opt.passes == 0 {
        return Err(ConfigError::ValidationError(
            "optimize.passes must be at least 1".to_string(),
        ));
    }
    if opt.tolerance.is_nan() || opt.tolerance < 0.0 {
        return Err(ConfigError::ValidationError(format!(
            "optimize.tolerance must be non-negative, got {}",
            opt.tolerance
        )));
    }
    if opt.skip_nets_larger_than < 2 {
        return Err(ConfigError::ValidationError(format!(
            "optimize.skip_nets_larger_than must be at least 2, got {}",
            opt.skip_nets_larger_than
        )));
    }
    Ok(())
}
