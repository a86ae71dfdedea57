//! tactician - multi-account rated puzzle runner
//!
//! This is the command-line entry point. It wires together:
//! - Data directory and configuration loading
//! - The JSON account store
//! - The HTTP remote and webhook notifier
//! - The orchestrator and account management commands

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tactician_config::{AppConfig, StrategyCatalog, load_app_config, load_strategies};
use tactician_core::{
    AccountError, Orchestrator, StatusBoard, add_account, change_strategy, extract_token, prune,
    refresh_all,
};
use tactician_remote_api::{NoopNotifier, Notifier};
use tactician_remote_http::{HttpRemote, WebhookNotifier};
use tactician_store::{AccountStore, JsonStore};
use tactician_util::{DataPaths, Username, default_data_dir, format_timestamp, is_mock_time_active};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// tactician - run rated puzzles across several accounts
#[derive(Parser, Debug)]
#[command(name = "tactician", version)]
#[command(about = "Run rated puzzles across several accounts with per-account strategies", long_about = None)]
struct Args {
    /// Data directory holding config.json, strategies.json and accounts.json
    #[arg(short, long, env = "TACTICIAN_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run every stored account according to its strategy
    Run,

    /// Run a single account
    RunOne {
        /// Username of the stored account
        username: String,
    },

    /// Manage stored accounts
    #[command(subcommand)]
    Accounts(AccountsCommand),

    /// Assign a strategy to one or more accounts
    #[command(visible_alias = "cs", alias = "changestrategy")]
    ChangeStrategy {
        /// Strategy name from strategies.json
        strategy: String,

        /// Accounts to update
        #[arg(required = true)]
        accounts: Vec<String>,
    },
}

#[derive(Subcommand, Debug)]
enum AccountsCommand {
    /// Add an account from an authenticated cURL command pasted on stdin
    Add {
        /// Use this session token instead of reading a cURL command
        #[arg(long)]
        token: Option<String>,
    },

    /// List stored accounts and their membership
    List,

    /// Remove accounts whose token was rejected
    Prune,

    /// Refresh membership, username and rating of every account
    Refresh,
}

/// Resolved data directory and application settings
struct Workspace {
    paths: DataPaths,
    config: AppConfig,
}

impl Workspace {
    fn open(data_dir: Option<PathBuf>) -> Result<Self> {
        let root = data_dir.unwrap_or_else(default_data_dir);
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create data directory {:?}", root))?;

        let paths = DataPaths::new(&root);
        let config = load_app_config(&paths.config)
            .with_context(|| format!("Failed to load config from {:?}", paths.config))?;

        info!(
            data_dir = %root.display(),
            max_concurrent = config.max_concurrent_accounts,
            notifications = config.webhook_url.is_some(),
            "Configuration loaded"
        );

        Ok(Self { paths, config })
    }

    fn store(&self) -> JsonStore {
        JsonStore::new(&self.paths.accounts)
    }

    fn strategies(&self) -> Result<StrategyCatalog> {
        load_strategies(&self.paths.strategies)
            .with_context(|| format!("Failed to load strategies from {:?}", self.paths.strategies))
    }

    fn remote(&self) -> Result<HttpRemote> {
        let Some(base_url) = &self.config.api_base_url else {
            bail!(
                "api_base_url is not set in {:?}; it is required for commands that contact the puzzle service",
                self.paths.config
            );
        };
        HttpRemote::new(base_url.clone(), self.config.request_timeout)
            .context("Failed to create HTTP client")
    }

    fn notifier(&self) -> Result<Arc<dyn Notifier>> {
        match &self.config.webhook_url {
            Some(url) => Ok(Arc::new(
                WebhookNotifier::new(url.clone(), self.config.request_timeout)
                    .context("Failed to create webhook client")?,
            )),
            None => Ok(Arc::new(NoopNotifier)),
        }
    }

    fn orchestrator(&self) -> Result<Orchestrator> {
        Ok(Orchestrator::new(
            Arc::new(self.store()),
            Arc::new(self.remote()?),
            self.notifier()?,
            Arc::new(self.strategies()?),
            Arc::new(StatusBoard::stdout()),
            self.config.max_concurrent_accounts,
        ))
    }
}

async fn run_all(workspace: &Workspace) -> Result<()> {
    let orchestrator = workspace.orchestrator()?;
    let report = orchestrator.run_all().await.context("Run failed")?;

    let summary = report.summary();
    println!(
        "All accounts processed: {} succeeded, {} on cooldown, {} failed.",
        summary.success.len(),
        summary.cooldown.len(),
        summary.errors.len()
    );
    Ok(())
}

async fn run_one(workspace: &Workspace, username: &str) -> Result<()> {
    let orchestrator = workspace.orchestrator()?;
    let result = orchestrator.run_one(username).await?;

    match &result.error {
        None => println!(
            "Account {} solved {} puzzles.",
            result.username,
            result.attempted_label()
        ),
        Some(e) => println!("Account {} finished with error: {}", result.username, e),
    }
    Ok(())
}

fn read_token_from_stdin() -> Result<String> {
    println!("Please paste the authenticated cURL command from your browser's devtools.");
    println!("Press Ctrl+D when you are finished:");

    let mut curl = String::new();
    std::io::stdin()
        .read_to_string(&mut curl)
        .context("Failed to read cURL command from input")?;

    extract_token(&curl).ok_or_else(|| AccountError::TokenNotFound.into())
}

async fn accounts_add(workspace: &Workspace, token: Option<String>) -> Result<()> {
    let token = match token {
        Some(token) => token,
        None => read_token_from_stdin()?,
    };
    let remote = workspace.remote()?;

    let account = add_account(&remote, &workspace.store(), &token).await?;
    println!();
    println!("Successfully added account: {}", account.username);
    println!(
        "This account has a {} membership.",
        account.membership_label().to_lowercase()
    );
    Ok(())
}

fn accounts_list(workspace: &Workspace) -> Result<()> {
    let book = workspace.store().load()?;
    if book.is_empty() {
        println!("No accounts found.");
        return Ok(());
    }

    println!("Accounts:");
    for (name, account) in book.iter() {
        let last_run = account
            .last_run
            .as_ref()
            .map(format_timestamp)
            .unwrap_or_else(|| "never".to_string());
        let token = if account.has_token() { "" } else { ", token invalid" };
        println!(
            "- {} ({}, strategy '{}', rating {}, last run {}{})",
            name,
            account.membership_label(),
            account.strategy_name,
            account.last_rating,
            last_run,
            token
        );
    }
    Ok(())
}

fn accounts_prune(workspace: &Workspace) -> Result<()> {
    let report = prune(&workspace.store())?;
    for name in &report.removed {
        println!("Removed account '{}' with empty token.", name);
    }
    println!("Pruning complete. Remaining accounts:");
    for name in &report.remaining {
        println!("- {}", name);
    }
    Ok(())
}

async fn accounts_refresh(workspace: &Workspace) -> Result<()> {
    let store = workspace.store();
    if store.load()?.is_empty() {
        println!("No accounts found. Add one first with `tactician accounts add`.");
        return Ok(());
    }

    let remote = workspace.remote()?;
    let reports = refresh_all(&remote, &store).await?;

    let mut rejected = false;
    for report in &reports {
        match &report.error {
            None if report.renamed() => println!(
                "{}: refreshed (now {}, {}, rating {})",
                report.previous,
                report.account.username,
                report.account.membership_label(),
                report.account.last_rating
            ),
            None => println!(
                "{}: refreshed ({}, rating {})",
                report.previous,
                report.account.membership_label(),
                report.account.last_rating
            ),
            Some(e) => {
                rejected |= e.is_unauthorized();
                println!("{}: {}", report.previous, e);
            }
        }
    }
    if rejected {
        println!("Some tokens were rejected. Consider running `tactician accounts prune`.");
    }
    Ok(())
}

fn change_account_strategy(workspace: &Workspace, strategy: &str, accounts: &[String]) -> Result<()> {
    let usernames: Vec<Username> = accounts.iter().map(Username::new).collect();
    let strategies = workspace.strategies()?;

    change_strategy(&workspace.store(), &strategies, strategy, &usernames)?;
    for name in &usernames {
        println!("Changed strategy for account '{}' to '{}'.", name, strategy);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so they do not tear the status board on stdout
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    debug!(version = env!("CARGO_PKG_VERSION"), command = ?args.command, "tactician starting");

    if is_mock_time_active() {
        warn!(
            now = %format_timestamp(&tactician_util::now()),
            "Mock time is active, cooldowns are checked against the shifted clock"
        );
    }

    let workspace = Workspace::open(args.data_dir)?;

    match args.command {
        Command::Run => run_all(&workspace).await,
        Command::RunOne { username } => run_one(&workspace, &username).await,
        Command::Accounts(AccountsCommand::Add { token }) => accounts_add(&workspace, token).await,
        Command::Accounts(AccountsCommand::List) => accounts_list(&workspace),
        Command::Accounts(AccountsCommand::Prune) => accounts_prune(&workspace),
        Command::Accounts(AccountsCommand::Refresh) => accounts_refresh(&workspace).await,
        Command::ChangeStrategy {
            strategy,
            accounts,
        } => change_account_strategy(&workspace, &strategy, &accounts),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_change_strategy_needs_at_least_one_account() {
        assert!(Args::try_parse_from(["tactician", "change-strategy", "climb"]).is_err());

        let args = Args::try_parse_from(["tactician", "cs", "climb", "a", "b"]).unwrap();
        match args.command {
            Command::ChangeStrategy { strategy, accounts } => {
                assert_eq!(strategy, "climb");
                assert_eq!(accounts, vec!["a", "b"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = Args::try_parse_from([
            "tactician",
            "accounts",
            "list",
            "--data-dir",
            "/tmp/tactician-test",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(args.data_dir, Some(PathBuf::from("/tmp/tactician-test")));
        assert_eq!(args.log_level, "debug");
    }
}
