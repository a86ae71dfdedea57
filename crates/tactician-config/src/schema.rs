//! Raw configuration schema (as parsed from JSON)

use serde::{Deserialize, Serialize};
use tactician_api::{DEFAULT_STRATEGY_NAME, ReportedTimeMode, StopMode, SubmitMode};

/// Raw `config.json`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawAppConfig {
    /// Webhook receiving run notifications; empty disables them
    #[serde(default, alias = "discord_webhook_url")]
    pub notification_webhook_url: String,

    /// Upper bound on accounts processed in parallel (<= 0 means 1)
    #[serde(default = "default_max_concurrent_accounts")]
    pub max_concurrent_accounts: i64,

    /// Base URL of the remote puzzle service
    #[serde(default)]
    pub api_base_url: Option<String>,

    /// Per-request timeout for the remote service
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_concurrent_accounts() -> i64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for RawAppConfig {
    fn default() -> Self {
        Self {
            notification_webhook_url: String::new(),
            max_concurrent_accounts: default_max_concurrent_accounts(),
            api_base_url: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Raw `strategies.json`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawStrategyCatalog {
    #[serde(default)]
    pub strategies: Vec<RawStrategy>,
}

/// Raw strategy entry
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RawStrategy {
    pub name: String,

    /// `stop_at_puzzles_completed` or `stop_at_rating`
    pub stop_mode: String,

    /// Count target; <= 0 never stops on count
    #[serde(default)]
    pub puzzles_per_day: i32,

    /// Rating target; <= 0 never stops on rating
    #[serde(default)]
    pub target_rating: i32,

    /// `legit`, `hour` or `zero`; anything else reports a fixed duration
    #[serde(default = "default_time_mode")]
    pub time_mode: String,

    /// `asap` or `legit`
    #[serde(default = "default_submit_mode")]
    pub submit_mode: String,
}

fn default_time_mode() -> String {
    ReportedTimeMode::Legit.as_str().to_string()
}

fn default_submit_mode() -> String {
    SubmitMode::Paced.as_str().to_string()
}

impl RawStrategyCatalog {
    /// Catalog written when `strategies.json` does not exist yet
    pub fn with_default_strategy() -> Self {
        Self {
            strategies: vec![RawStrategy {
                name: DEFAULT_STRATEGY_NAME.to_string(),
                stop_mode: StopMode::PuzzleCount.as_str().to_string(),
                puzzles_per_day: 3,
                target_rating: 4000,
                time_mode: default_time_mode(),
                submit_mode: default_submit_mode(),
            }],
        }
    }
}
