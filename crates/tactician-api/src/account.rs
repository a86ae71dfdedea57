//! Account records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tactician_util::Username;

/// Strategy assigned to freshly onboarded accounts
pub const DEFAULT_STRATEGY_NAME: &str = "default";

/// One automated identity on the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub username: Username,

    /// Opaque session token; empty once the remote rejected it
    #[serde(alias = "cookie")]
    pub token: String,

    #[serde(default)]
    pub is_premium: bool,

    #[serde(default)]
    pub premium_expiry: Option<DateTime<Utc>>,

    #[serde(default = "default_strategy_name")]
    pub strategy_name: String,

    /// End of the last successful run that counts towards the cooldown
    #[serde(default)]
    pub last_run: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_rating: i32,
}

fn default_strategy_name() -> String {
    DEFAULT_STRATEGY_NAME.to_string()
}

impl Account {
    /// New account with only a token; the username is filled in by a profile refresh
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            username: Username::new(""),
            token: token.into(),
            is_premium: false,
            premium_expiry: None,
            strategy_name: default_strategy_name(),
            last_run: None,
            last_rating: 0,
        }
    }

    pub fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Clear the token so that `accounts prune` removes the account
    pub fn invalidate_token(&mut self) {
        self.token.clear();
    }

    pub fn membership_label(&self) -> &'static str {
        if self.is_premium { "Premium" } else { "Free" }
    }
}
