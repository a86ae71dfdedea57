//! Per-account run loop
//!
//! ```text
//! CheckCooldown -> Solve -> (Delay -> Solve)* -> Stop
//! ```
//!
//! The runner owns a working copy of the account. Nothing here touches the
//! account store; the final copy travels back inside the [`RunResult`].

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tactician_api::{Account, StopMode};
use tactician_config::{Strategy, StrategyCatalog};
use tactician_remote_api::PuzzleRemote;
use tactician_util::{Username, format_duration};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cooldown::{self, CooldownVerdict};
use crate::session;
use crate::status::{StatusBoard, progress_bar};
use crate::{OutcomeKind, RunError};

/// Outcome of one account's run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunResult {
    /// Key of the account in the store when the run started
    pub username: Username,
    /// Final working copy, written back by the orchestrator
    pub account: Account,
    pub solved: u32,
    /// `None` when the strategy could not be resolved
    pub strategy: Option<Strategy>,
    pub error: Option<RunError>,
    pub initial_rating: Option<i32>,
    pub final_rating: Option<i32>,
}

impl RunResult {
    pub fn kind(&self) -> OutcomeKind {
        self.error
            .as_ref()
            .map(RunError::kind)
            .unwrap_or(OutcomeKind::Success)
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// `solved/puzzles_per_day`, or just the count without a strategy
    pub fn attempted_label(&self) -> String {
        match &self.strategy {
            Some(strategy) => format!("{}/{}", self.solved, strategy.puzzles_per_day),
            None => self.solved.to_string(),
        }
    }
}

enum Step {
    CheckCooldown,
    Solve,
    Delay(f64),
    Stop(Option<RunError>),
}

/// Aborts the countdown ticker when the delay it decorates ends
struct TickerGuard(JoinHandle<()>);

impl Drop for TickerGuard {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Drives sessions for one account until its strategy says stop
#[derive(Clone)]
pub struct AccountRunner {
    remote: Arc<dyn PuzzleRemote>,
    strategies: Arc<StrategyCatalog>,
    status: Arc<StatusBoard>,
}

impl AccountRunner {
    pub fn new(
        remote: Arc<dyn PuzzleRemote>,
        strategies: Arc<StrategyCatalog>,
        status: Arc<StatusBoard>,
    ) -> Self {
        Self {
            remote,
            strategies,
            status,
        }
    }

    pub fn status(&self) -> &Arc<StatusBoard> {
        &self.status
    }

    /// Run `account` (stored under `key`) to completion.
    ///
    /// `now` is the instant the cooldown gate is evaluated against.
    pub async fn run(&self, key: Username, mut account: Account, now: DateTime<Utc>) -> RunResult {
        let Some(strategy) = self.strategies.get(&account.strategy_name) else {
            let error = RunError::StrategyNotFound(account.strategy_name.clone());
            warn!(error = %error, "Cannot start run");
            self.status.set_line(key.as_str(), format!("[{}] {}", key, error));
            return RunResult {
                username: key,
                account,
                solved: 0,
                strategy: None,
                error: Some(error),
                initial_rating: None,
                final_rating: None,
            };
        };

        let mut solved: u32 = 0;
        let mut initial_rating = None;
        let mut passed_gate = false;
        let mut step = Step::CheckCooldown;

        let error = loop {
            step = match step {
                Step::CheckCooldown => match cooldown::check(&account, now) {
                    CooldownVerdict::Blocked { until } => {
                        info!(until = %until, "Account on cooldown");
                        Step::Stop(Some(RunError::Cooldown { until }))
                    }
                    CooldownVerdict::Runnable => {
                        passed_gate = true;
                        self.status.set_line(
                            key.as_str(),
                            format!("[{}] Starting with strategy '{}'", key, strategy.name),
                        );
                        initial_rating = self.read_rating(&account, "initial").await;
                        if let Some(rating) = initial_rating {
                            account.last_rating = rating;
                        }
                        Step::Solve
                    }
                },

                Step::Solve => {
                    self.status
                        .set_line(key.as_str(), solving_line(&key, strategy, solved, account.last_rating));

                    match session::solve_one(self.remote.as_ref(), &account.token, strategy.time_mode).await {
                        Ok(puzzle) => {
                            solved += 1;
                            // A submit that reported no rating leaves the last known one
                            if puzzle.rating_after > 0 {
                                account.last_rating = puzzle.rating_after;
                            }
                            info!(
                                puzzle_id = %puzzle.puzzle_id,
                                solved,
                                rating = account.last_rating,
                                reported_secs = puzzle.reported_duration_secs,
                                "Puzzle solved"
                            );

                            if strategy.should_stop(solved, account.last_rating) {
                                Step::Stop(None)
                            } else if strategy.is_paced() {
                                Step::Delay(puzzle.reported_duration_secs)
                            } else {
                                Step::Solve
                            }
                        }
                        Err(e) => {
                            let error = RunError::from(e);
                            if error.kind() == OutcomeKind::Authorization {
                                warn!(error = %error, "Token rejected, clearing it");
                                account.invalidate_token();
                            } else {
                                warn!(error = %error, solved, "Session failed");
                            }
                            self.status
                                .set_line(key.as_str(), format!("[{}] Error solving puzzle: {}", key, error));
                            Step::Stop(Some(error))
                        }
                    }
                }

                Step::Delay(secs) => {
                    let prefix = progress_prefix(&key, strategy, solved, account.last_rating);
                    self.delay(key.as_str(), prefix, secs).await;
                    Step::Solve
                }

                Step::Stop(error) => break error,
            };
        };

        let final_rating = if passed_gate && account.has_token() {
            self.read_rating(&account, "final").await
        } else {
            None
        };
        if let Some(rating) = final_rating {
            account.last_rating = rating;
        }

        if error.is_none() && strategy.marks_cooldown() {
            account.last_run = Some(tactician_util::now());
        }

        RunResult {
            username: key,
            account,
            solved,
            strategy: Some(strategy.clone()),
            error,
            initial_rating,
            final_rating,
        }
    }

    async fn read_rating(&self, account: &Account, which: &'static str) -> Option<i32> {
        match self.remote.stats(&account.token).await {
            Ok(stats) => Some(stats.rating),
            Err(e) => {
                debug!(which, error = %e, "Could not read rating");
                None
            }
        }
    }

    /// Sleep for the reported duration while a ticker counts down on the status line
    async fn delay(&self, key: &str, prefix: String, secs: f64) {
        let duration = Duration::try_from_secs_f64(secs).unwrap_or_default();
        if duration.is_zero() {
            return;
        }

        let _ticker = TickerGuard(tokio::spawn(countdown(
            self.status.clone(),
            key.to_string(),
            prefix,
            duration,
        )));
        tokio::time::sleep(duration).await;
    }
}

async fn countdown(status: Arc<StatusBoard>, key: String, prefix: String, total: Duration) {
    let deadline = Instant::now() + total;
    let mut tick = tokio::time::interval(Duration::from_secs(1));
    loop {
        tick.tick().await;
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        let shown = Duration::from_secs(remaining.as_secs_f64().ceil() as u64);
        status.set_line(&key, format!("{} Waiting {}...", prefix, format_duration(shown)));
    }
}

fn solving_line(key: &Username, strategy: &Strategy, solved: u32, rating: i32) -> String {
    match strategy.stop_mode {
        StopMode::PuzzleCount => format!(
            "[{}] {} Solving puzzle {}/{}...",
            key,
            progress_bar(i64::from(solved) + 1, i64::from(strategy.puzzles_per_day)),
            solved + 1,
            strategy.puzzles_per_day
        ),
        StopMode::TargetRating => format!(
            "[{}] {} Solving puzzle, rating {}/{}...",
            key,
            progress_bar(i64::from(rating), i64::from(strategy.target_rating)),
            rating,
            strategy.target_rating
        ),
    }
}

fn progress_prefix(key: &Username, strategy: &Strategy, solved: u32, rating: i32) -> String {
    match strategy.stop_mode {
        StopMode::PuzzleCount => format!(
            "[{}] {} {}/{}",
            key,
            progress_bar(i64::from(solved), i64::from(strategy.puzzles_per_day)),
            solved,
            strategy.puzzles_per_day
        ),
        StopMode::TargetRating => format!(
            "[{}] {} rating {}/{}",
            key,
            progress_bar(i64::from(rating), i64::from(strategy.target_rating)),
            rating,
            strategy.target_rating
        ),
    }
}
