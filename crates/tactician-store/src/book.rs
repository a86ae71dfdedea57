//! The account map as persisted

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tactician_api::Account;
use tactician_util::Username;

use crate::{StoreError, StoreResult};

/// Every known account, keyed by username
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBook {
    #[serde(default)]
    pub accounts: BTreeMap<Username, Account>,
}

impl AccountBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn get(&self, username: &str) -> Option<&Account> {
        self.accounts.get(username)
    }

    pub fn contains(&self, username: &str) -> bool {
        self.accounts.contains_key(username)
    }

    pub fn usernames(&self) -> Vec<Username> {
        self.accounts.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Username, &Account)> {
        self.accounts.iter()
    }

    /// Insert or overwrite the record stored under `key`
    pub fn put(&mut self, key: Username, account: Account) {
        self.accounts.insert(key, account);
    }

    /// Add a new account under its own username, refusing duplicates
    pub fn add(&mut self, account: Account) -> StoreResult<()> {
        if self.accounts.contains_key(&account.username) {
            return Err(StoreError::AlreadyExists(account.username.to_string()));
        }
        self.accounts.insert(account.username.clone(), account);
        Ok(())
    }

    /// Store `account` after a refresh, moving it if its username changed.
    ///
    /// A rename onto a username held by another account is refused and the
    /// book is left untouched.
    pub fn replace(&mut self, old_key: &Username, account: Account) -> StoreResult<()> {
        if &account.username == old_key || account.username.is_empty() {
            self.accounts.insert(old_key.clone(), account);
            return Ok(());
        }
        if self.accounts.contains_key(&account.username) {
            return Err(StoreError::AlreadyExists(account.username.to_string()));
        }
        self.accounts.remove(old_key);
        self.accounts.insert(account.username.clone(), account);
        Ok(())
    }

    /// Remove every account whose token has been invalidated
    pub fn prune_without_token(&mut self) -> Vec<Username> {
        let removed: Vec<Username> = self
            .accounts
            .iter()
            .filter(|(_, account)| !account.has_token())
            .map(|(name, _)| name.clone())
            .collect();

        for name in &removed {
            self.accounts.remove(name);
        }

        removed
    }

    /// Point each named account at `strategy`; nothing changes if any name is unknown
    pub fn assign_strategy(&mut self, strategy: &str, usernames: &[Username]) -> StoreResult<()> {
        if let Some(missing) = usernames.iter().find(|u| !self.accounts.contains_key(*u)) {
            return Err(StoreError::NotFound(format!("account '{}'", missing)));
        }

        for name in usernames {
            if let Some(account) = self.accounts.get_mut(name) {
                account.strategy_name = strategy.to_string();
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(name: &str, token: &str) -> Account {
        let mut account = Account::with_token(token);
        account.username = Username::new(name);
        account
    }

    #[test]
    fn test_add_refuses_duplicates() {
        let mut book = AccountBook::new();
        book.add(account("magnus", "a")).unwrap();
        assert!(matches!(
            book.add(account("magnus", "b")),
            Err(StoreError::AlreadyExists(_))
        ));
        assert_eq!(book.get("magnus").unwrap().token, "a");
    }

    #[test]
    fn test_prune_removes_only_empty_tokens() {
        let mut book = AccountBook::new();
        book.add(account("keep", "token")).unwrap();
        book.add(account("drop", "")).unwrap();

        let removed = book.prune_without_token();
        assert_eq!(removed, vec![Username::new("drop")]);
        assert_eq!(book.usernames(), vec![Username::new("keep")]);
    }

    #[test]
    fn test_replace_rekeys_renamed_account() {
        let mut book = AccountBook::new();
        book.add(account("old", "t")).unwrap();

        book.replace(&Username::new("old"), account("new", "t")).unwrap();
        assert!(!book.contains("old"));
        assert!(book.contains("new"));
    }

    #[test]
    fn test_replace_refuses_rename_onto_existing_account() {
        let mut book = AccountBook::new();
        book.add(account("alice", "ta")).unwrap();
        book.add(account("bob", "tb")).unwrap();

        let result = book.replace(&Username::new("alice"), account("bob", "ta"));
        assert!(matches!(result, Err(StoreError::AlreadyExists(_))));
        assert_eq!(book.len(), 2);
        assert_eq!(book.get("alice").unwrap().token, "ta");
        assert_eq!(book.get("bob").unwrap().token, "tb");
    }

    #[test]
    fn test_assign_strategy_is_all_or_nothing() {
        let mut book = AccountBook::new();
        book.add(account("a", "t")).unwrap();

        let result = book.assign_strategy("climb", &[Username::new("a"), Username::new("ghost")]);
        assert!(matches!(result, Err(StoreError::NotFound(_))));
        assert_eq!(book.get("a").unwrap().strategy_name, "default");

        book.assign_strategy("climb", &[Username::new("a")]).unwrap();
        assert_eq!(book.get("a").unwrap().strategy_name, "climb");
    }
}
