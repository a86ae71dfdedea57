//! Configuration validation

use crate::schema::{RawAppConfig, RawStrategy, RawStrategyCatalog};
use std::collections::HashSet;
use tactician_api::{StopMode, SubmitMode};
use thiserror::Error;

/// Validation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Strategy '{strategy}': {message}")]
    StrategyError { strategy: String, message: String },

    #[error("Duplicate strategy name: {0}")]
    DuplicateStrategyName(String),

    #[error("Strategy name cannot be empty")]
    EmptyStrategyName,

    #[error("Global config error: {0}")]
    GlobalError(String),
}

/// Validate a raw strategy catalog, collecting every problem
pub fn validate_strategies(catalog: &RawStrategyCatalog) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for strategy in &catalog.strategies {
        if strategy.name.trim().is_empty() {
            errors.push(ValidationError::EmptyStrategyName);
            continue;
        }
        if !seen.insert(strategy.name.as_str()) {
            errors.push(ValidationError::DuplicateStrategyName(strategy.name.clone()));
        }
    }

    for strategy in &catalog.strategies {
        errors.extend(validate_strategy(strategy));
    }

    errors
}

fn validate_strategy(strategy: &RawStrategy) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let error = |message: String| ValidationError::StrategyError {
        strategy: strategy.name.clone(),
        message,
    };

    if StopMode::parse(&strategy.stop_mode).is_none() {
        errors.push(error(format!(
            "unknown stop_mode '{}' (expected 'stop_at_puzzles_completed' or 'stop_at_rating')",
            strategy.stop_mode
        )));
    }

    if SubmitMode::parse(&strategy.submit_mode).is_none() {
        errors.push(error(format!(
            "unknown submit_mode '{}' (expected 'asap' or 'legit')",
            strategy.submit_mode
        )));
    }

    errors
}

/// Validate raw application settings
pub fn validate_app_config(config: &RawAppConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    // A malformed webhook URL is not fatal; the notifier warns and skips it
    if let Some(base) = &config.api_base_url
        && !base.starts_with("http://")
        && !base.starts_with("https://")
    {
        errors.push(ValidationError::GlobalError(format!(
            "api_base_url must be an http(s) URL, got '{}'",
            base
        )));
    }

    if config.request_timeout_secs == 0 {
        errors.push(ValidationError::GlobalError(
            "request_timeout_secs must be greater than zero".into(),
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(name: &str) -> RawStrategy {
        RawStrategy {
            name: name.into(),
            stop_mode: "stop_at_puzzles_completed".into(),
            puzzles_per_day: 3,
            target_rating: 0,
            time_mode: "legit".into(),
            submit_mode: "asap".into(),
        }
    }

    #[test]
    fn test_default_catalog_is_valid() {
        let catalog = RawStrategyCatalog::with_default_strategy();
        assert!(validate_strategies(&catalog).is_empty());
    }

    #[test]
    fn test_duplicate_name_detection() {
        let catalog = RawStrategyCatalog {
            strategies: vec![strategy("daily"), strategy("daily")],
        };

        let errors = validate_strategies(&catalog);
        assert_eq!(errors, vec![ValidationError::DuplicateStrategyName("daily".into())]);
    }

    #[test]
    fn test_unknown_modes_are_all_reported() {
        let mut bad = strategy("bad");
        bad.stop_mode = "never".into();
        bad.submit_mode = "whenever".into();

        let errors = validate_strategies(&RawStrategyCatalog { strategies: vec![bad] });
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().all(|e| matches!(e, ValidationError::StrategyError { .. })));
    }

    #[test]
    fn test_unknown_time_mode_is_accepted() {
        let mut odd = strategy("odd");
        odd.time_mode = "glacial".into();
        assert!(validate_strategies(&RawStrategyCatalog { strategies: vec![odd] }).is_empty());
    }

    #[test]
    fn test_empty_name_rejected() {
        let errors = validate_strategies(&RawStrategyCatalog {
            strategies: vec![strategy("  ")],
        });
        assert!(errors.contains(&ValidationError::EmptyStrategyName));
    }

    #[test]
    fn test_non_http_webhook_is_not_a_config_error() {
        let config = RawAppConfig {
            notification_webhook_url: "discord.com/api/webhooks/1".into(),
            ..Default::default()
        };
        assert!(validate_app_config(&config).is_empty());

        let config = RawAppConfig {
            api_base_url: Some("puzzles.example".into()),
            ..Default::default()
        };
        assert_eq!(validate_app_config(&config).len(), 1);
    }
}
