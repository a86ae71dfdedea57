//! Validated strategy catalog and application settings

use crate::schema::{RawAppConfig, RawStrategy, RawStrategyCatalog};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use tactician_api::{ReportedTimeMode, StopMode, SubmitMode};

/// Pacing and termination policy for one account's run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Strategy {
    pub name: String,
    pub stop_mode: StopMode,
    pub puzzles_per_day: i32,
    pub target_rating: i32,
    pub time_mode: ReportedTimeMode,
    pub submit_mode: SubmitMode,
}

impl Strategy {
    /// Convert from a raw strategy (after validation)
    ///
    /// Unknown stop or submit modes fall back to puzzle-count and paced, but
    /// validation rejects them before this point.
    pub fn from_raw(raw: RawStrategy) -> Self {
        Self {
            stop_mode: StopMode::parse(&raw.stop_mode).unwrap_or(StopMode::PuzzleCount),
            time_mode: ReportedTimeMode::parse(&raw.time_mode),
            submit_mode: SubmitMode::parse(&raw.submit_mode).unwrap_or(SubmitMode::Paced),
            name: raw.name,
            puzzles_per_day: raw.puzzles_per_day,
            target_rating: raw.target_rating,
        }
    }

    /// Stop predicate evaluated after every successful puzzle.
    ///
    /// A target of zero or less never triggers a stop.
    pub fn should_stop(&self, solved: u32, last_rating: i32) -> bool {
        match self.stop_mode {
            StopMode::PuzzleCount => {
                self.puzzles_per_day > 0 && i64::from(solved) >= i64::from(self.puzzles_per_day)
            }
            StopMode::TargetRating => self.target_rating > 0 && last_rating >= self.target_rating,
        }
    }

    /// Whether a successful run stamps `last_run` and so starts a cooldown
    pub fn marks_cooldown(&self) -> bool {
        self.puzzles_per_day > 0
    }

    pub fn is_paced(&self) -> bool {
        self.submit_mode == SubmitMode::Paced
    }
}

/// Strategies by name, loaded once per run and read-only afterwards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StrategyCatalog {
    strategies: BTreeMap<String, Strategy>,
}

impl StrategyCatalog {
    pub fn from_raw(raw: RawStrategyCatalog) -> Self {
        Self::from_strategies(raw.strategies.into_iter().map(Strategy::from_raw))
    }

    pub fn from_strategies(strategies: impl IntoIterator<Item = Strategy>) -> Self {
        Self {
            strategies: strategies
                .into_iter()
                .map(|s| (s.name.clone(), s))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Strategy> {
        self.strategies.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.strategies.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Strategy> {
        self.strategies.values()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

/// Validated application settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `None` disables notifications
    pub webhook_url: Option<String>,
    /// Always at least 1
    pub max_concurrent_accounts: usize,
    pub api_base_url: Option<String>,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_raw(raw: RawAppConfig) -> Self {
        let webhook = raw.notification_webhook_url.trim();
        Self {
            webhook_url: (!webhook.is_empty()).then(|| webhook.to_string()),
            max_concurrent_accounts: usize::try_from(raw.max_concurrent_accounts)
                .ok()
                .filter(|n| *n > 0)
                .unwrap_or(1),
            api_base_url: raw
                .api_base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .filter(|u| !u.is_empty()),
            request_timeout: Duration::from_secs(raw.request_timeout_secs),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_raw(RawAppConfig::default())
    }
}
