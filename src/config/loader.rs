//! Configuration loading from files.

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Error, Result};

use super::StageConfig;

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
///
/// ```rust,ignore
/// use mcode_stage::load_config;
///
/// let config = load_config("stage.toml")?;
/// ```
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StageConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
        Error::Config(ConfigError::IoError(format!("{}: {e}", path.display())))
    })?;

    parse_config(&content)
}

/// Parse configuration from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is invalid or fails validation.
pub fn parse_config(content: &str) -> Result<StageConfig> {
    let config: StageConfig = toml::from_str(content)
        .map_err(|e| Error::Config(ConfigError::ParseError(e.message().to_owned())))?;

    super::validation::validate_config(&config)?;

    Ok(config)
}
