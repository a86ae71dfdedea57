//! Mock collaborators for testing

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tactician_api::{
    Membership, Notification, Profile, Puzzle, PuzzleMove, Submission, SubmitOutcome,
    TacticsStats,
};
use tokio::time::Instant;

use crate::{Notifier, NotifyError, PuzzleRemote, RemoteError, RemoteResult};

/// Failure injected by the mock remote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    Transport,
    Unauthorized,
}

impl MockFailure {
    fn to_error(self) -> RemoteError {
        match self {
            MockFailure::Transport => RemoteError::Transport("connection reset by peer".into()),
            MockFailure::Unauthorized => RemoteError::Unauthorized { status: 403 },
        }
    }
}

/// Scripted behaviour of one account on the mock remote
#[derive(Debug, Clone)]
pub struct MockAccount {
    pub username: String,
    pub is_premium: bool,
    pub premium_expiry: Option<DateTime<Utc>>,

    /// Rating before the first submission
    pub start_rating: i32,

    /// Added to the rating by every submission
    pub rating_step: i32,

    /// Fail the fetch that would be the n-th (0-based) with the given failure
    pub fail_fetch_at: Option<(u32, MockFailure)>,

    /// Fail every stats lookup
    pub fail_stats: bool,
}

impl MockAccount {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_premium: false,
            premium_expiry: None,
            start_rating: 1200,
            rating_step: 10,
            fail_fetch_at: None,
            fail_stats: false,
        }
    }

    pub fn premium(mut self, expiry: Option<DateTime<Utc>>) -> Self {
        self.is_premium = true;
        self.premium_expiry = expiry;
        self
    }

    pub fn ratings(mut self, start: i32, step: i32) -> Self {
        self.start_rating = start;
        self.rating_step = step;
        self
    }

    pub fn fail_fetch_at(mut self, fetch: u32, failure: MockFailure) -> Self {
        self.fail_fetch_at = Some((fetch, failure));
        self
    }

    pub fn without_stats(mut self) -> Self {
        self.fail_stats = true;
        self
    }
}

/// Per-token call counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockCalls {
    pub fetches: u32,
    pub submits: u32,
    pub stats: u32,
    pub profiles: u32,
    pub memberships: u32,
}

impl MockCalls {
    pub fn total(&self) -> u32 {
        self.fetches + self.submits + self.stats + self.profiles + self.memberships
    }
}

#[derive(Debug)]
struct MockEntry {
    script: MockAccount,
    rating: i32,
    calls: MockCalls,
    submissions: Vec<Submission>,
    submitted_at: Vec<Instant>,
}

/// Mock remote puzzle service for unit/integration testing.
///
/// Tokens that were never registered are rejected as unauthorized.
#[derive(Debug, Default)]
pub struct MockRemote {
    entries: Mutex<HashMap<String, MockEntry>>,
    latency: Duration,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    next_puzzle: AtomicUsize,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an account reachable with `token`
    pub fn with_account(self, token: impl Into<String>, script: MockAccount) -> Self {
        let entry = MockEntry {
            rating: script.start_rating,
            script,
            calls: MockCalls::default(),
            submissions: Vec::new(),
            submitted_at: Vec::new(),
        };
        self.lock().insert(token.into(), entry);
        self
    }

    /// Delay every call, simulating network latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn calls(&self, token: &str) -> MockCalls {
        self.lock()
            .get(token)
            .map(|e| e.calls.clone())
            .unwrap_or_default()
    }

    pub fn submissions(&self, token: &str) -> Vec<Submission> {
        self.lock()
            .get(token)
            .map(|e| e.submissions.clone())
            .unwrap_or_default()
    }

    /// When each submission arrived, on the tokio clock
    pub fn submission_times(&self, token: &str) -> Vec<Instant> {
        self.lock()
            .get(token)
            .map(|e| e.submitted_at.clone())
            .unwrap_or_default()
    }

    /// Highest number of calls that were in progress at the same time
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, MockEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Account for one call, hold it open for the configured latency, then
    /// run `f` against the token's entry
    async fn call<T>(
        &self,
        token: &str,
        f: impl FnOnce(&mut MockEntry) -> RemoteResult<T>,
    ) -> RemoteResult<T> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let result = match self.lock().get_mut(token) {
            Some(entry) => f(entry),
            None => Err(RemoteError::Unauthorized { status: 403 }),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl PuzzleRemote for MockRemote {
    async fn fetch_next_puzzle(&self, token: &str) -> RemoteResult<Puzzle> {
        let id = self.next_puzzle.fetch_add(1, Ordering::SeqCst);
        self.call(token, |entry| {
            let attempt = entry.calls.fetches;
            entry.calls.fetches += 1;
            if let Some((at, failure)) = entry.script.fail_fetch_at
                && at == attempt
            {
                return Err(failure.to_error());
            }
            Ok(Puzzle {
                id: format!("mock-{}", id),
                moves: vec![PuzzleMove {
                    from: "e2".into(),
                    to: "e4".into(),
                }],
            })
        })
        .await
    }

    async fn submit_solution(&self, token: &str, submission: &Submission) -> RemoteResult<SubmitOutcome> {
        self.call(token, |entry| {
            entry.calls.submits += 1;
            entry.submissions.push(submission.clone());
            entry.submitted_at.push(Instant::now());
            entry.rating += entry.script.rating_step;
            Ok(SubmitOutcome {
                rating: entry.rating,
            })
        })
        .await
    }

    async fn profile(&self, token: &str) -> RemoteResult<Profile> {
        self.call(token, |entry| {
            entry.calls.profiles += 1;
            Ok(Profile {
                username: entry.script.username.clone(),
            })
        })
        .await
    }

    async fn membership(&self, token: &str) -> RemoteResult<Membership> {
        self.call(token, |entry| {
            entry.calls.memberships += 1;
            Ok(Membership {
                level: if entry.script.is_premium { "gold" } else { "basic" }.to_string(),
                is_premium: entry.script.is_premium,
                expires_at: entry.script.premium_expiry,
            })
        })
        .await
    }

    async fn stats(&self, token: &str) -> RemoteResult<TacticsStats> {
        self.call(token, |entry| {
            entry.calls.stats += 1;
            if entry.script.fail_stats {
                return Err(RemoteError::Decode {
                    what: "stats",
                    message: "unexpected end of input".into(),
                });
            }
            Ok(TacticsStats {
                rating: entry.rating,
                highest_rating: entry.rating.max(entry.script.start_rating),
                today_attempted: entry.calls.submits,
            })
        })
        .await
    }
}

/// Notifier that records every notification it receives
#[derive(Debug, Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,

    /// Reject every notification after recording it
    pub fail: Arc<AtomicBool>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        let notifier = Self::default();
        notifier.fail.store(true, Ordering::SeqCst);
        notifier
    }

    pub fn sent(&self) -> Vec<Notification> {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(notification.clone());

        if self.fail.load(Ordering::SeqCst) {
            return Err(NotifyError::Rejected { status: 500 });
        }
        Ok(())
    }
}
