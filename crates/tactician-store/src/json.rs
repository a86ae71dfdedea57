//! JSON file store

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::{AccountBook, AccountStore, StoreResult};

/// Account store backed by a single pretty-printed JSON file
#[derive(Debug, Clone)]
pub struct JsonStore {
    path: PathBuf,
}

impl JsonStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, book: &AccountBook) -> StoreResult<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        // Write beside the target, then rename over it
        let json = serde_json::to_string_pretty(book)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl AccountStore for JsonStore {
    fn load(&self) -> StoreResult<AccountBook> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let book: AccountBook = serde_json::from_str(&content)?;
                debug!(path = %self.path.display(), accounts = book.len(), "Account store loaded");
                Ok(book)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let book = AccountBook::new();
                self.write(&book)?;
                info!(path = %self.path.display(), "Created empty account store");
                Ok(book)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, book: &AccountBook) -> StoreResult<()> {
        self.write(book)?;
        debug!(path = %self.path.display(), accounts = book.len(), "Account store saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;
    use chrono::{TimeZone, Utc};
    use tactician_api::Account;
    use tactician_util::Username;

    #[test]
    fn test_missing_file_is_created_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("accounts.json"));

        let book = store.load().unwrap();
        assert!(book.is_empty());
        assert!(store.path().exists());
    }

    #[test]
    fn test_save_then_load_preserves_accounts() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::new(dir.path().join("accounts.json"));

        let mut account = Account::with_token("session=abc");
        account.username = Username::new("magnus");
        account.is_premium = true;
        account.last_run = Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap());
        account.last_rating = 1834;

        let mut book = AccountBook::new();
        book.add(account.clone()).unwrap();
        store.save(&book).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.get("magnus"), Some(&account));
        assert!(!dir.path().join("accounts.json.tmp").exists());
    }

    #[test]
    fn test_legacy_layout_is_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        std::fs::write(
            &path,
            r#"{ "accounts": { "magnus": { "username": "magnus", "cookie": "c", "strategy_name": "default" } } }"#,
        )
        .unwrap();

        let book = JsonStore::new(&path).load().unwrap();
        assert_eq!(book.get("magnus").unwrap().token, "c");
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("accounts.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            JsonStore::new(&path).load(),
            Err(StoreError::Serialization(_))
        ));
    }
}
