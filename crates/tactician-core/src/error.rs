//! Run outcomes and errors

use chrono::{DateTime, Utc};
use tactician_remote_api::RemoteError;
use tactician_store::StoreError;
use tactician_util::{Username, format_timestamp};
use thiserror::Error;

/// Why an account's run ended without completing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("on cooldown until {}", format_timestamp(until))]
    Cooldown { until: DateTime<Utc> },

    #[error("strategy not found: {0}")]
    StrategyNotFound(String),

    /// The remote rejected the token; the account's token has been cleared
    #[error("token rejected, consider running `accounts prune`: {0}")]
    Unauthorized(RemoteError),

    #[error(transparent)]
    Remote(RemoteError),
}

impl From<RemoteError> for RunError {
    fn from(e: RemoteError) -> Self {
        if e.is_unauthorized() {
            RunError::Unauthorized(e)
        } else {
            RunError::Remote(e)
        }
    }
}

impl RunError {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            RunError::Cooldown { .. } => OutcomeKind::Cooldown,
            RunError::StrategyNotFound(_) => OutcomeKind::Resolution,
            RunError::Unauthorized(_) => OutcomeKind::Authorization,
            RunError::Remote(_) => OutcomeKind::Transport,
        }
    }
}

/// Classification of one account's run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutcomeKind {
    Success,
    Cooldown,
    Resolution,
    Authorization,
    Transport,
}

/// Summary bucket an outcome is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bucket {
    Success,
    Cooldown,
    Error,
}

impl OutcomeKind {
    pub fn bucket(self) -> Bucket {
        match self {
            OutcomeKind::Success => Bucket::Success,
            OutcomeKind::Cooldown => Bucket::Cooldown,
            OutcomeKind::Resolution | OutcomeKind::Authorization | OutcomeKind::Transport => {
                Bucket::Error
            }
        }
    }
}

/// Errors that abort a whole orchestrated run
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("account store error: {0}")]
    Store(#[from] StoreError),

    #[error("account '{0}' not found")]
    UnknownAccount(String),

    #[error("worker for '{0}' did not report a result")]
    WorkerLost(String),
}

pub type OrchestratorResult<T> = Result<T, OrchestratorError>;

/// Remote lookup performed by an account refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStep {
    Membership,
    Profile,
    Stats,
}

impl std::fmt::Display for RefreshStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RefreshStep::Membership => "membership status",
            RefreshStep::Profile => "user profile",
            RefreshStep::Stats => "tactics stats",
        })
    }
}

/// Errors from account management commands
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("account store error: {0}")]
    Store(#[from] StoreError),

    #[error("failed to get {step}: {source}")]
    Refresh { step: RefreshStep, source: RemoteError },

    #[error("could not find a cookie in the cURL command")]
    TokenNotFound,

    #[error("remote profile has no username")]
    MissingUsername,

    #[error("strategy '{0}' not found")]
    UnknownStrategy(String),

    #[error("profile reports username '{to}', which another stored account uses; kept as '{from}'")]
    RenameConflict { from: Username, to: Username },
}

impl AccountError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, AccountError::Refresh { source, .. } if source.is_unauthorized())
    }
}

pub type AccountResult<T> = Result<T, AccountError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_remote_errors_are_promoted() {
        let err = RunError::from(RemoteError::Unauthorized { status: 403 });
        assert_eq!(err.kind(), OutcomeKind::Authorization);
        assert_eq!(err.kind().bucket(), Bucket::Error);

        let err = RunError::from(RemoteError::Transport("timeout".into()));
        assert_eq!(err.kind(), OutcomeKind::Transport);
    }

    #[test]
    fn test_cooldown_has_its_own_bucket() {
        let err = RunError::Cooldown { until: Utc::now() };
        assert_eq!(err.kind().bucket(), Bucket::Cooldown);
        assert!(err.to_string().starts_with("on cooldown until"));
    }

    #[test]
    fn test_missing_strategy_is_a_resolution_error() {
        let err = RunError::StrategyNotFound("speedrun".into());
        assert_eq!(err.kind(), OutcomeKind::Resolution);
        assert_eq!(err.to_string(), "strategy not found: speedrun");
    }
}
