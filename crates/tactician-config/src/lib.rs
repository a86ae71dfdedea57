//! Configuration parsing and validation for tactician
//!
//! Two JSON files live in the data directory:
//! - `config.json`: notification webhook, concurrency limit, remote endpoint
//! - `strategies.json`: the named strategy catalog
//!
//! Both are created with defaults on first use.

mod schema;
mod strategy;
mod validation;

pub use schema::*;
pub use strategy::*;
pub use validation::*;

use serde::Serialize;
use std::io::ErrorKind;
use std::path::Path;
use tactician_api::ReportedTimeMode;
use thiserror::Error;
use tracing::{info, warn};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Load and validate the strategy catalog, writing the default catalog if the file is missing
pub fn load_strategies(path: impl AsRef<Path>) -> ConfigResult<StrategyCatalog> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => parse_strategies(&content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let raw = RawStrategyCatalog::with_default_strategy();
            write_json(path, &raw)?;
            info!(path = %path.display(), "Created default strategy catalog");
            Ok(StrategyCatalog::from_raw(raw))
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse and validate a strategy catalog from a JSON string
pub fn parse_strategies(content: &str) -> ConfigResult<StrategyCatalog> {
    let raw: RawStrategyCatalog = serde_json::from_str(content)?;

    let errors = validate_strategies(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    for s in &raw.strategies {
        if ReportedTimeMode::parse(&s.time_mode) == ReportedTimeMode::Fixed {
            warn!(
                strategy = %s.name,
                time_mode = %s.time_mode,
                fixed_secs = ReportedTimeMode::FIXED_SECS,
                "Unknown time_mode, reporting a fixed duration"
            );
        }
    }

    Ok(StrategyCatalog::from_raw(raw))
}

/// Load and validate application settings, writing defaults if the file is missing
pub fn load_app_config(path: impl AsRef<Path>) -> ConfigResult<AppConfig> {
    let path = path.as_ref();
    match std::fs::read_to_string(path) {
        Ok(content) => parse_app_config(&content),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            let raw = RawAppConfig::default();
            write_json(path, &raw)?;
            info!(path = %path.display(), "Created default application config");
            Ok(AppConfig::from_raw(raw))
        }
        Err(e) => Err(e.into()),
    }
}

/// Parse and validate application settings from a JSON string
pub fn parse_app_config(content: &str) -> ConfigResult<AppConfig> {
    let raw: RawAppConfig = serde_json::from_str(content)?;

    let errors = validate_app_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(AppConfig::from_raw(raw))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> ConfigResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json)?;
    Ok(())
}
