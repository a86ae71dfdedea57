//! Bounded-concurrency orchestration across accounts

use std::sync::Arc;
use tactician_api::Account;
use tactician_config::StrategyCatalog;
use tactician_remote_api::{Notifier, PuzzleRemote};
use tactician_store::{AccountBook, AccountStore};
use tactician_util::{RunId, Username};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{Instrument, error, info, info_span, warn};

use crate::{
    AccountRunner, OrchestratorError, OrchestratorResult, Reporter, RunResult, StatusBoard,
    Summary,
};

/// Outcome of one orchestrated invocation
#[derive(Debug)]
pub struct RunReport {
    pub run_id: RunId,
    /// One entry per account whose worker reported back, sorted by username
    pub results: Vec<RunResult>,
}

impl RunReport {
    pub fn summary(&self) -> Summary<'_> {
        Summary::of(&self.results)
    }

    pub fn get(&self, username: &str) -> Option<&RunResult> {
        self.results.iter().find(|r| r.username.as_str() == username)
    }
}

/// Fans the run loop out over the account store
pub struct Orchestrator {
    store: Arc<dyn AccountStore>,
    runner: AccountRunner,
    reporter: Reporter,
    max_concurrent: usize,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn AccountStore>,
        remote: Arc<dyn PuzzleRemote>,
        notifier: Arc<dyn Notifier>,
        strategies: Arc<StrategyCatalog>,
        status: Arc<StatusBoard>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            store,
            runner: AccountRunner::new(remote, strategies, status),
            reporter: Reporter::new(notifier),
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Run every account in the store and save the store once at the end
    pub async fn run_all(&self) -> OrchestratorResult<RunReport> {
        let mut book = self.store.load()?;
        let accounts: Vec<(Username, Account)> = book
            .iter()
            .map(|(name, account)| (name.clone(), account.clone()))
            .collect();

        let run_id = RunId::new();
        info!(
            run_id = %run_id,
            accounts = accounts.len(),
            max_concurrent = self.max_concurrent,
            "Starting run"
        );

        let usernames: Vec<Username> = accounts.iter().map(|(name, _)| name.clone()).collect();
        self.reporter.run_started(&usernames).await;

        let results = self.execute(run_id, accounts).await;
        self.finalize(&mut book, &results)?;

        self.reporter.run_finished(&results).await;
        self.runner.status().clear();

        info!(run_id = %run_id, reported = results.len(), "Run finished");
        Ok(RunReport { run_id, results })
    }

    /// Run a single account and write it back
    pub async fn run_one(&self, username: &str) -> OrchestratorResult<RunResult> {
        let mut book = self.store.load()?;
        let account = book
            .get(username)
            .cloned()
            .ok_or_else(|| OrchestratorError::UnknownAccount(username.to_string()))?;
        let key = Username::new(username);

        let run_id = RunId::new();
        self.reporter.run_started(std::slice::from_ref(&key)).await;

        let results = self.execute(run_id, vec![(key, account)]).await;
        self.finalize(&mut book, &results)?;

        self.reporter.run_finished(&results).await;
        self.runner.status().clear();

        results
            .into_iter()
            .next()
            .ok_or_else(|| OrchestratorError::WorkerLost(username.to_string()))
    }

    /// Write every reported copy back and persist exactly once
    fn finalize(&self, book: &mut AccountBook, results: &[RunResult]) -> OrchestratorResult<()> {
        for result in results {
            book.put(result.username.clone(), result.account.clone());
        }
        self.store.save(book)?;
        Ok(())
    }

    async fn execute(&self, run_id: RunId, accounts: Vec<(Username, Account)>) -> Vec<RunResult> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let (tx, mut rx) = mpsc::channel::<RunResult>(accounts.len().max(1));
        let mut workers = JoinSet::new();

        for (key, account) in accounts {
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(e) => {
                    error!(error = %e, "Worker semaphore closed, not launching remaining accounts");
                    break;
                }
            };

            let runner = self.runner.clone();
            let reporter = self.reporter.clone();
            let tx = tx.clone();
            let span = info_span!("account", username = %key, run_id = %run_id);

            workers.spawn(
                async move {
                    let _permit = permit;
                    let result = runner.run(key.clone(), account, tactician_util::now()).await;

                    reporter.account_finished(&result).await;

                    let status = runner.status();
                    status.remove_line(key.as_str());
                    match &result.error {
                        None => status.print(format!(
                            "[{}] Finished successfully after solving {} puzzles.",
                            key, result.solved
                        )),
                        Some(e) => status.print(format!("[{}] Finished with error: {}", key, e)),
                    }

                    if tx.send(result).await.is_err() {
                        warn!("Result channel closed before the worker reported");
                    }
                }
                .instrument(span),
            );
        }
        drop(tx);

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Account worker failed, its account is left unchanged");
            }
        }

        let mut results = Vec::new();
        while let Some(result) = rx.recv().await {
            results.push(result);
        }
        results.sort_by(|a, b| a.username.cmp(&b.username));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::sync::atomic::Ordering;
    use std::time::Duration;
    use tactician_api::{ReportedTimeMode, StopMode, SubmitMode};
    use tactician_config::Strategy;
    use tactician_remote_api::{MockAccount, MockFailure, MockRemote, RecordingNotifier};
    use tactician_store::MemoryStore;

    use crate::{FIELD_COOLDOWN, FIELD_ERRORS, FIELD_SUCCESS, OutcomeKind};

    fn catalog() -> StrategyCatalog {
        StrategyCatalog::from_strategies([
            Strategy {
                name: "default".into(),
                stop_mode: StopMode::PuzzleCount,
                puzzles_per_day: 3,
                target_rating: 4000,
                time_mode: ReportedTimeMode::NearZero,
                submit_mode: SubmitMode::Immediate,
            },
            Strategy {
                name: "one".into(),
                stop_mode: StopMode::PuzzleCount,
                puzzles_per_day: 1,
                target_rating: 0,
                time_mode: ReportedTimeMode::NearZero,
                submit_mode: SubmitMode::Immediate,
            },
        ])
    }

    fn account(name: &str, token: &str) -> Account {
        let mut account = Account::with_token(token);
        account.username = Username::new(name);
        account
    }

    fn book(accounts: impl IntoIterator<Item = Account>) -> AccountBook {
        let mut book = AccountBook::new();
        for account in accounts {
            book.add(account).unwrap();
        }
        book
    }

    struct Harness {
        store: Arc<MemoryStore>,
        remote: Arc<MockRemote>,
        notifier: RecordingNotifier,
        orchestrator: Orchestrator,
    }

    fn harness(book: AccountBook, remote: MockRemote, max_concurrent: usize) -> Harness {
        let store = Arc::new(MemoryStore::new(book));
        let remote = Arc::new(remote);
        let notifier = RecordingNotifier::new();
        let orchestrator = Orchestrator::new(
            store.clone(),
            remote.clone(),
            Arc::new(notifier.clone()),
            Arc::new(catalog()),
            Arc::new(StatusBoard::hidden()),
            max_concurrent,
        );
        Harness {
            store,
            remote,
            notifier,
            orchestrator,
        }
    }

    #[tokio::test]
    async fn test_concurrency_never_exceeds_limit() {
        let mut remote = MockRemote::new();
        let mut accounts = Vec::new();
        for i in 0..5 {
            let token = format!("t{}", i);
            remote = remote.with_account(token.clone(), MockAccount::new(format!("u{}", i)));
            let mut a = account(&format!("u{}", i), &token);
            a.strategy_name = "one".into();
            accounts.push(a);
        }
        let h = harness(book(accounts), remote.with_latency(Duration::from_millis(30)), 2);

        let report = h.orchestrator.run_all().await.unwrap();
        assert_eq!(report.results.len(), 5);
        assert!(h.remote.peak_in_flight() <= 2, "peak {}", h.remote.peak_in_flight());
        assert!(h.remote.peak_in_flight() >= 1);
    }

    #[tokio::test]
    async fn test_each_account_keeps_only_its_own_outputs() {
        let remote = MockRemote::new()
            .with_account("ta", MockAccount::new("a").ratings(1000, 5))
            .with_account("tb", MockAccount::new("b").ratings(1500, 20))
            .with_account("tc", MockAccount::new("c").ratings(2000, -3));
        let h = harness(
            book([account("a", "ta"), account("b", "tb"), account("c", "tc")]),
            remote,
            3,
        );

        let report = h.orchestrator.run_all().await.unwrap();
        assert_eq!(report.results.len(), 3);
        assert_eq!(h.store.save_count(), 1);

        let stored = h.store.snapshot();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored.get("a").unwrap().last_rating, 1015);
        assert_eq!(stored.get("b").unwrap().last_rating, 1560);
        assert_eq!(stored.get("c").unwrap().last_rating, 1991);
        for name in ["a", "b", "c"] {
            assert!(stored.get(name).unwrap().last_run.is_some());
        }
        assert_eq!(h.remote.calls("ta").submits, 3);
    }

    #[tokio::test]
    async fn test_summary_and_store_reflect_mixed_outcomes() {
        let mut cooling = account("cooling", "tc");
        cooling.last_run = Some(Utc::now() - ChronoDuration::hours(2));
        let mut lost = account("lost", "tl");
        lost.strategy_name = "ghost".into();

        let remote = MockRemote::new()
            .with_account("tg", MockAccount::new("good"))
            .with_account("tc", MockAccount::new("cooling"))
            .with_account("tl", MockAccount::new("lost"))
            .with_account("tr", MockAccount::new("revoked").fail_fetch_at(0, MockFailure::Unauthorized));
        let h = harness(
            book([account("good", "tg"), cooling, lost, account("revoked", "tr")]),
            remote,
            2,
        );

        let report = h.orchestrator.run_all().await.unwrap();
        assert_eq!(report.get("good").unwrap().kind(), OutcomeKind::Success);
        assert_eq!(report.get("cooling").unwrap().kind(), OutcomeKind::Cooldown);
        assert_eq!(report.get("lost").unwrap().kind(), OutcomeKind::Resolution);
        assert_eq!(report.get("revoked").unwrap().kind(), OutcomeKind::Authorization);

        let summary = report.summary();
        assert_eq!(summary.success.len(), 1);
        assert_eq!(summary.cooldown.len(), 1);
        assert_eq!(summary.errors.len(), 2);

        // Revoked token persisted so that prune can remove it
        let stored = h.store.snapshot();
        assert!(!stored.get("revoked").unwrap().has_token());
        assert_eq!(h.store.save_count(), 1);

        // start + one report per account + summary
        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 6);
        let last = sent.last().unwrap();
        assert!(last.field_value(FIELD_SUCCESS).unwrap().starts_with("good (3/3"));
        assert!(last.field_value(FIELD_COOLDOWN).unwrap().starts_with("cooling"));
        assert!(last.field_value(FIELD_ERRORS).unwrap().contains("lost: strategy not found: ghost"));
    }

    #[tokio::test]
    async fn test_failing_notifier_does_not_fail_the_run() {
        let store = Arc::new(MemoryStore::new(book([account("a", "t")])));
        let remote = Arc::new(MockRemote::new().with_account("t", MockAccount::new("a")));
        let orchestrator = Orchestrator::new(
            store.clone(),
            remote,
            Arc::new(RecordingNotifier::failing()),
            Arc::new(catalog()),
            Arc::new(StatusBoard::hidden()),
            1,
        );

        let report = orchestrator.run_all().await.unwrap();
        assert!(report.results[0].is_success());
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_save_failure_is_fatal() {
        let h = harness(
            book([account("a", "t")]),
            MockRemote::new().with_account("t", MockAccount::new("a")),
            1,
        );
        h.store.fail_saves.store(true, Ordering::SeqCst);

        assert!(matches!(
            h.orchestrator.run_all().await,
            Err(OrchestratorError::Store(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_store_still_saves_once() {
        let h = harness(AccountBook::new(), MockRemote::new(), 5);
        let report = h.orchestrator.run_all().await.unwrap();
        assert!(report.results.is_empty());
        assert_eq!(h.store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_run_one_writes_the_account_back() {
        let h = harness(
            book([account("a", "ta"), account("b", "tb")]),
            MockRemote::new()
                .with_account("ta", MockAccount::new("a"))
                .with_account("tb", MockAccount::new("b")),
            5,
        );

        let result = h.orchestrator.run_one("a").await.unwrap();
        assert_eq!(result.solved, 3);

        let stored = h.store.snapshot();
        assert!(stored.get("a").unwrap().last_run.is_some());
        assert!(stored.get("b").unwrap().last_run.is_none());
        assert_eq!(h.remote.calls("tb").total(), 0);
        assert_eq!(h.store.save_count(), 1);
    }

    #[tokio::test]
    async fn test_run_one_unknown_account() {
        let h = harness(AccountBook::new(), MockRemote::new(), 1);
        assert!(matches!(
            h.orchestrator.run_one("nobody").await,
            Err(OrchestratorError::UnknownAccount(_))
        ));
        assert_eq!(h.store.save_count(), 0);
    }
}
