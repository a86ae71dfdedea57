//! Integration tests for tactician
//!
//! These tests drive the orchestrator and account commands against real
//! files in a temporary data directory, with a scripted remote.

use chrono::{Duration as ChronoDuration, Utc};
use std::sync::Arc;
use tactician_api::Account;
use tactician_config::{load_app_config, load_strategies, parse_strategies};
use tactician_core::{
    FIELD_COOLDOWN, FIELD_SUCCESS, OutcomeKind, Orchestrator, StatusBoard, prune, refresh_all,
};
use tactician_remote_api::{MockAccount, MockFailure, MockRemote, RecordingNotifier};
use tactician_store::{AccountBook, AccountStore, JsonStore};
use tactician_util::{DataPaths, Username};

const STRATEGIES: &str = r#"{
    "strategies": [
        {
            "name": "default",
            "stop_mode": "stop_at_puzzles_completed",
            "puzzles_per_day": 2,
            "target_rating": 4000,
            "time_mode": "zero",
            "submit_mode": "asap"
        },
        {
            "name": "climb",
            "stop_mode": "stop_at_rating",
            "puzzles_per_day": 0,
            "target_rating": 1530,
            "time_mode": "hour",
            "submit_mode": "asap"
        }
    ]
}"#;

fn account(name: &str, token: &str, strategy: &str) -> Account {
    let mut account = Account::with_token(token);
    account.username = Username::new(name);
    account.strategy_name = strategy.into();
    account
}

struct Env {
    _dir: tempfile::TempDir,
    paths: DataPaths,
}

impl Env {
    fn new(accounts: impl IntoIterator<Item = Account>) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let paths = DataPaths::new(dir.path());
        std::fs::write(&paths.strategies, STRATEGIES).unwrap();

        let mut book = AccountBook::new();
        for a in accounts {
            book.add(a).unwrap();
        }
        JsonStore::new(&paths.accounts).save(&book).unwrap();

        Self { _dir: dir, paths }
    }

    fn store(&self) -> JsonStore {
        JsonStore::new(&self.paths.accounts)
    }

    fn orchestrator(&self, remote: &Arc<MockRemote>, notifier: &RecordingNotifier) -> Orchestrator {
        let config = load_app_config(&self.paths.config).unwrap();
        let strategies = load_strategies(&self.paths.strategies).unwrap();
        Orchestrator::new(
            Arc::new(self.store()),
            remote.clone(),
            Arc::new(notifier.clone()),
            Arc::new(strategies),
            Arc::new(StatusBoard::hidden()),
            config.max_concurrent_accounts,
        )
    }
}

#[tokio::test]
async fn test_run_persists_results_to_disk() {
    let env = Env::new([
        account("alice", "ta", "default"),
        account("bob", "tb", "climb"),
    ]);
    let remote = Arc::new(
        MockRemote::new()
            .with_account("ta", MockAccount::new("alice").ratings(1100, 7))
            .with_account("tb", MockAccount::new("bob").ratings(1500, 10)),
    );
    let notifier = RecordingNotifier::new();

    let report = env.orchestrator(&remote, &notifier).run_all().await.unwrap();
    assert_eq!(report.results.len(), 2);
    assert!(report.results.iter().all(|r| r.is_success()));

    let book = env.store().load().unwrap();
    let alice = book.get("alice").unwrap();
    assert_eq!(alice.last_rating, 1114);
    assert!(alice.last_run.is_some());

    // Rating-bound strategy with no daily count never starts a cooldown
    let bob = book.get("bob").unwrap();
    assert_eq!(bob.last_rating, 1530);
    assert!(bob.last_run.is_none());

    // Reported durations follow each strategy's time mode
    assert!(remote
        .submissions("ta")
        .iter()
        .all(|s| (0.1..0.4).contains(&s.reported_duration_secs)));
    assert!(remote
        .submissions("tb")
        .iter()
        .all(|s| (3600.0..5400.0).contains(&s.reported_duration_secs)));

    let summary = notifier.sent().pop().unwrap();
    assert!(summary.field_value(FIELD_SUCCESS).unwrap().contains("alice (2/2 puzzles"));
}

#[tokio::test]
async fn test_second_run_is_held_by_cooldown() {
    let env = Env::new([account("alice", "ta", "default")]);
    let remote = Arc::new(MockRemote::new().with_account("ta", MockAccount::new("alice")));
    let notifier = RecordingNotifier::new();

    env.orchestrator(&remote, &notifier).run_all().await.unwrap();
    let calls_after_first = remote.calls("ta").total();
    let stamped = env.store().load().unwrap().get("alice").unwrap().last_run;

    let report = env.orchestrator(&remote, &notifier).run_all().await.unwrap();
    assert_eq!(report.results[0].kind(), OutcomeKind::Cooldown);
    assert_eq!(remote.calls("ta").total(), calls_after_first);
    assert_eq!(env.store().load().unwrap().get("alice").unwrap().last_run, stamped);

    let summary = notifier.sent().pop().unwrap();
    assert!(summary.field_value(FIELD_COOLDOWN).unwrap().starts_with("alice"));
}

#[tokio::test]
async fn test_premium_account_runs_again_immediately() {
    let mut premium = account("vip", "tv", "default");
    premium.is_premium = true;
    premium.last_run = Some(Utc::now() - ChronoDuration::minutes(10));
    let env = Env::new([premium]);
    let remote = Arc::new(MockRemote::new().with_account("tv", MockAccount::new("vip")));

    let report = env
        .orchestrator(&remote, &RecordingNotifier::new())
        .run_all()
        .await
        .unwrap();
    assert!(report.results[0].is_success());
    assert_eq!(remote.calls("tv").submits, 2);
}

#[tokio::test]
async fn test_rejected_token_is_persisted_then_pruned() {
    let env = Env::new([
        account("alice", "ta", "default"),
        account("mallory", "tm", "default"),
    ]);
    let remote = Arc::new(
        MockRemote::new()
            .with_account("ta", MockAccount::new("alice"))
            .with_account("tm", MockAccount::new("mallory").fail_fetch_at(0, MockFailure::Unauthorized)),
    );

    let report = env
        .orchestrator(&remote, &RecordingNotifier::new())
        .run_all()
        .await
        .unwrap();
    assert_eq!(report.get("mallory").unwrap().kind(), OutcomeKind::Authorization);
    assert!(!env.store().load().unwrap().get("mallory").unwrap().has_token());

    let pruned = prune(&env.store()).unwrap();
    assert_eq!(pruned.removed, vec![Username::new("mallory")]);
    assert_eq!(pruned.remaining, vec![Username::new("alice")]);
    assert!(!env.store().load().unwrap().contains("mallory"));
}

#[tokio::test]
async fn test_refresh_rekeys_renamed_account_on_disk() {
    let env = Env::new([account("old-name", "tok", "climb")]);
    let remote = MockRemote::new().with_account("tok", MockAccount::new("new-name").premium(None));

    let reports = refresh_all(&remote, &env.store()).await.unwrap();
    assert!(reports[0].renamed());

    let book = env.store().load().unwrap();
    assert_eq!(book.usernames(), vec![Username::new("new-name")]);
    let refreshed = book.get("new-name").unwrap();
    assert!(refreshed.is_premium);
    assert_eq!(refreshed.strategy_name, "climb");
}

#[test]
fn test_legacy_account_file_loads() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accounts.json");
    let legacy = serde_json::json!({
        "accounts": {
            "magnus": {
                "username": "magnus",
                "cookie": "session=1",
                "is_premium": false,
                "strategy_name": "default",
                "last_rating": 1234
            }
        }
    });
    std::fs::write(&path, legacy.to_string()).unwrap();

    let book = JsonStore::new(&path).load().unwrap();
    let magnus = book.get("magnus").unwrap();
    assert_eq!(magnus.token, "session=1");
    assert_eq!(magnus.last_rating, 1234);
}

#[test]
fn test_default_files_are_created_on_first_use() {
    let dir = tempfile::tempdir().unwrap();
    let paths = DataPaths::new(dir.path());

    let config = load_app_config(&paths.config).unwrap();
    let catalog = load_strategies(&paths.strategies).unwrap();
    let book = JsonStore::new(&paths.accounts).load().unwrap();

    assert_eq!(config.max_concurrent_accounts, 5);
    assert_eq!(config.api_base_url, None);
    assert!(catalog.contains("default"));
    assert!(book.is_empty());
    assert!(paths.config.exists());
    assert!(paths.strategies.exists());

    // The written catalog parses back to the same strategies
    let written = std::fs::read_to_string(&paths.strategies).unwrap();
    assert_eq!(parse_strategies(&written).unwrap(), catalog);
}
