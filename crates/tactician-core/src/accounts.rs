//! Account management: onboarding, refresh, prune and strategy assignment
//!
//! Every command loads the whole account store and saves it once.

use regex::Regex;
use tactician_api::Account;
use tactician_config::StrategyCatalog;
use tactician_remote_api::{PuzzleRemote, RemoteError};
use tactician_store::AccountStore;
use tactician_util::Username;
use tracing::{info, warn};

use crate::{AccountError, AccountResult, RefreshStep};

/// Pull the session cookie out of a "copy as cURL" command line
pub fn extract_token(curl: &str) -> Option<String> {
    let cookie_flag = Regex::new(r"(?:-b|--cookie)\s+'([^']+)'").ok()?;
    if let Some(caps) = cookie_flag.captures(curl) {
        return Some(caps[1].to_string());
    }

    let cookie_header = Regex::new(r"(?i)-H\s+'cookie:\s*([^']*)'").ok()?;
    cookie_header
        .captures(curl)
        .map(|caps| caps[1].trim().to_string())
        .filter(|token| !token.is_empty())
}

fn refresh_failed(account: &mut Account, step: RefreshStep, source: RemoteError) -> AccountError {
    if source.is_unauthorized() {
        warn!(
            username = %account.username,
            %step,
            "Token rejected, invalidating it; consider running `accounts prune`"
        );
        account.invalidate_token();
    }
    AccountError::Refresh { step, source }
}

/// Refresh membership, username and rating from the remote.
///
/// Stops at the first failed lookup; fields updated before it are kept.
pub async fn refresh_account(remote: &dyn PuzzleRemote, account: &mut Account) -> AccountResult<()> {
    let membership = match remote.membership(&account.token).await {
        Ok(m) => m,
        Err(e) => return Err(refresh_failed(account, RefreshStep::Membership, e)),
    };
    account.is_premium = membership.is_premium;
    account.premium_expiry = membership.expires_at;
    info!(
        username = %account.username,
        level = %membership.level,
        premium = account.is_premium,
        "Membership refreshed"
    );

    let profile = match remote.profile(&account.token).await {
        Ok(p) => p,
        Err(e) => return Err(refresh_failed(account, RefreshStep::Profile, e)),
    };
    account.username = Username::new(profile.username);

    let stats = match remote.stats(&account.token).await {
        Ok(s) => s,
        Err(e) => return Err(refresh_failed(account, RefreshStep::Stats, e)),
    };
    account.last_rating = stats.rating;
    info!(username = %account.username, rating = stats.rating, "Stats refreshed");

    Ok(())
}

/// Result of refreshing one stored account
#[derive(Debug)]
pub struct RefreshReport {
    pub previous: Username,
    pub account: Account,
    pub error: Option<AccountError>,
}

impl RefreshReport {
    pub fn renamed(&self) -> bool {
        !self.account.username.is_empty() && self.account.username != self.previous
    }
}

/// Refresh every stored account in turn; failures are reported, not fatal
pub async fn refresh_all(
    remote: &dyn PuzzleRemote,
    store: &dyn AccountStore,
) -> AccountResult<Vec<RefreshReport>> {
    let mut book = store.load()?;
    let mut reports = Vec::with_capacity(book.len());

    for key in book.usernames() {
        let Some(mut account) = book.get(key.as_str()).cloned() else {
            continue;
        };
        let mut error = refresh_account(remote, &mut account).await.err();
        if let Some(e) = &error {
            warn!(username = %key, error = %e, "Refresh failed");
        }
        if book.replace(&key, account.clone()).is_err() {
            warn!(
                username = %key,
                reported = %account.username,
                "Refreshed username belongs to another stored account, keeping the old key"
            );
            let reported = std::mem::replace(&mut account.username, key.clone());
            book.put(key.clone(), account.clone());
            error.get_or_insert(AccountError::RenameConflict {
                from: key.clone(),
                to: reported,
            });
        }
        reports.push(RefreshReport {
            previous: key,
            account,
            error,
        });
    }

    store.save(&book)?;
    Ok(reports)
}

/// Create an account from a token, named after its remote profile
pub async fn onboard(remote: &dyn PuzzleRemote, token: &str) -> AccountResult<Account> {
    let mut account = Account::with_token(token.trim());
    refresh_account(remote, &mut account).await?;
    if account.username.is_empty() {
        return Err(AccountError::MissingUsername);
    }
    Ok(account)
}

/// Onboard a token and add the account, refusing usernames already stored
pub async fn add_account(
    remote: &dyn PuzzleRemote,
    store: &dyn AccountStore,
    token: &str,
) -> AccountResult<Account> {
    let mut book = store.load()?;
    let account = onboard(remote, token).await?;
    book.add(account.clone())?;
    store.save(&book)?;
    info!(username = %account.username, premium = account.is_premium, "Account added");
    Ok(account)
}

/// Accounts removed and kept by a prune
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneReport {
    pub removed: Vec<Username>,
    pub remaining: Vec<Username>,
}

/// Remove every account whose token was invalidated
pub fn prune(store: &dyn AccountStore) -> AccountResult<PruneReport> {
    let mut book = store.load()?;
    let removed = book.prune_without_token();
    store.save(&book)?;
    for name in &removed {
        info!(username = %name, "Removed account with empty token");
    }
    Ok(PruneReport {
        removed,
        remaining: book.usernames(),
    })
}

/// Assign `strategy` to every named account; nothing is saved if any name is unknown
pub fn change_strategy(
    store: &dyn AccountStore,
    strategies: &StrategyCatalog,
    strategy: &str,
    usernames: &[Username],
) -> AccountResult<()> {
    if !strategies.contains(strategy) {
        return Err(AccountError::UnknownStrategy(strategy.to_string()));
    }
    let mut book = store.load()?;
    book.assign_strategy(strategy, usernames)?;
    store.save(&book)?;
    info!(strategy, accounts = usernames.len(), "Strategy changed");
    Ok(())
}
