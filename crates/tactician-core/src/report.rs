//! Outcome reporting
//!
//! Notifications are best-effort: delivery failures are logged and never
//! change the outcome of a run.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tactician_api::{Notification, colors};
use tactician_remote_api::Notifier;
use tactician_util::{Username, format_timestamp};
use tracing::{debug, warn};

use crate::{Bucket, RunError, RunResult};

pub const FIELD_ACCOUNTS: &str = "Accounts";
pub const FIELD_SUCCESS: &str = "✅ Success";
pub const FIELD_COOLDOWN: &str = "⚠️ Cooldown";
pub const FIELD_ERRORS: &str = "❌ Errors";

/// Results split by summary bucket, in input order
#[derive(Debug, Default)]
pub struct Summary<'a> {
    pub success: Vec<&'a RunResult>,
    pub cooldown: Vec<&'a RunResult>,
    pub errors: Vec<&'a RunResult>,
}

impl<'a> Summary<'a> {
    pub fn of(results: &'a [RunResult]) -> Self {
        let mut summary = Summary::default();
        for result in results {
            match result.kind().bucket() {
                Bucket::Success => summary.success.push(result),
                Bucket::Cooldown => summary.cooldown.push(result),
                Bucket::Error => summary.errors.push(result),
            }
        }
        summary
    }
}

fn rating_text(rating: Option<i32>) -> String {
    rating
        .map(|r| r.to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

fn success_line(result: &RunResult) -> String {
    format!(
        "{} ({} puzzles, {} → {})",
        result.username,
        result.attempted_label(),
        rating_text(result.initial_rating),
        rating_text(result.final_rating)
    )
}

fn cooldown_line(result: &RunResult) -> String {
    match &result.error {
        Some(RunError::Cooldown { until }) => {
            format!("{} (until {})", result.username, format_timestamp(until))
        }
        _ => result.username.to_string(),
    }
}

fn error_line(result: &RunResult) -> String {
    match &result.error {
        Some(e) => format!("{}: {}", result.username, e),
        None => result.username.to_string(),
    }
}

/// Announces the accounts about to run
pub fn start_notification(usernames: &[Username], now: DateTime<Utc>) -> Notification {
    let accounts = if usernames.is_empty() {
        "(none)".to_string()
    } else {
        usernames
            .iter()
            .map(Username::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    };

    Notification::new(
        "Puzzle run starting",
        "Starting processing for the following accounts:",
        colors::BLUE,
        now,
    )
    .field(FIELD_ACCOUNTS, accounts, false)
}

/// Per-account report sent as each worker finishes
pub fn account_notification(result: &RunResult, now: DateTime<Utc>) -> Notification {
    let (description, color) = match &result.error {
        None => ("Completed successfully.".to_string(), colors::GREEN),
        Some(e @ RunError::Cooldown { .. }) => (format!("Skipped: {}", e), colors::YELLOW),
        Some(e) => (format!("Completed with issue: {}", e), colors::RED),
    };

    Notification::new(format!("Report for {}", result.username), description, color, now)
        .field("Strategy", result.account.strategy_name.clone(), true)
        .field("Puzzles Attempted", result.attempted_label(), true)
        .field("Initial Rating", rating_text(result.initial_rating), true)
        .field("Final Rating", rating_text(result.final_rating), true)
}

/// Bucketed summary of a finished run
pub fn summary_notification(results: &[RunResult], now: DateTime<Utc>) -> Notification {
    let summary = Summary::of(results);
    let color = if !summary.errors.is_empty() {
        colors::RED
    } else if !summary.cooldown.is_empty() {
        colors::YELLOW
    } else {
        colors::GREEN
    };

    let mut notification = Notification::new(
        "Puzzle run summary",
        format!("Summary of the execution for {} account(s).", results.len()),
        color,
        now,
    );

    let buckets = [
        (FIELD_SUCCESS, summary.success.iter().map(|r| success_line(r)).collect::<Vec<_>>()),
        (FIELD_COOLDOWN, summary.cooldown.iter().map(|r| cooldown_line(r)).collect()),
        (FIELD_ERRORS, summary.errors.iter().map(|r| error_line(r)).collect()),
    ];
    for (name, lines) in buckets {
        if !lines.is_empty() {
            notification = notification.field(name, lines.join("\n"), false);
        }
    }

    notification
}

/// Sends run notifications through the configured sink
#[derive(Clone)]
pub struct Reporter {
    notifier: Arc<dyn Notifier>,
}

impl Reporter {
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self { notifier }
    }

    pub async fn run_started(&self, usernames: &[Username]) {
        self.send(start_notification(usernames, tactician_util::now()))
            .await;
    }

    pub async fn account_finished(&self, result: &RunResult) {
        self.send(account_notification(result, tactician_util::now()))
            .await;
    }

    pub async fn run_finished(&self, results: &[RunResult]) {
        self.send(summary_notification(results, tactician_util::now()))
            .await;
    }

    async fn send(&self, notification: Notification) {
        debug!(title = %notification.title, "Sending notification");
        if let Err(e) = self.notifier.notify(&notification).await {
            warn!(title = %notification.title, error = %e, "Notification delivery failed");
        }
    }
}
