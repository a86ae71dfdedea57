//! Collaborator traits

use async_trait::async_trait;
use tactician_api::{
    Membership, Notification, Profile, Puzzle, Submission, SubmitOutcome, TacticsStats,
};
use thiserror::Error;

/// Errors from the remote puzzle service
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),

    /// The token was rejected; callers clear it so the account can be pruned
    #[error("authorization rejected (HTTP {status})")]
    Unauthorized { status: u16 },

    #[error("unexpected HTTP status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },

    #[error("remote returned a puzzle without an id")]
    EmptyPuzzle,
}

impl RemoteError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Classify an HTTP status that is not a success
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            _ => Self::Status {
                status,
                body: body.into(),
            },
        }
    }
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// The remote puzzle service, addressed with an account's token
#[async_trait]
pub trait PuzzleRemote: Send + Sync {
    /// Fetch the next rated puzzle
    async fn fetch_next_puzzle(&self, token: &str) -> RemoteResult<Puzzle>;

    /// Submit a solution with a reported attempt duration
    async fn submit_solution(&self, token: &str, submission: &Submission) -> RemoteResult<SubmitOutcome>;

    /// Profile of the token's owner
    async fn profile(&self, token: &str) -> RemoteResult<Profile>;

    /// Membership tier and expiry
    async fn membership(&self, token: &str) -> RemoteResult<Membership>;

    /// Current puzzle statistics
    async fn stats(&self, token: &str) -> RemoteResult<TacticsStats>;
}

/// Errors from the notification sink
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Transport(String),

    #[error("sink rejected the notification (HTTP {status})")]
    Rejected { status: u16 },
}

/// Best-effort notification sink
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Sink used when notifications are disabled
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn notify(&self, _notification: &Notification) -> Result<(), NotifyError> {
        Ok(())
    }
}
