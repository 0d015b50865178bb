//! Configuration parsing.

use thiserror::Error;

use crate::config::schema::MonitorConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration parsing and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document is not well-formed JSON.
    #[error("parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but failed semantic validation.
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate a raw configuration document.
///
/// Reading the bytes is the source's job; this is the shared
/// parse-then-validate half of every load path.
pub fn parse_config(raw: &[u8]) -> Result<MonitorConfig, ConfigError> {
    let config: MonitorConfig = serde_json::from_slice(raw)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}
