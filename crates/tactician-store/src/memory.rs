//! In-memory store for tests and dry runs

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crate::{AccountBook, AccountStore, StoreError, StoreResult};

/// Account store that keeps the book in memory and counts writes
#[derive(Debug, Default)]
pub struct MemoryStore {
    book: Mutex<AccountBook>,
    saves: AtomicUsize,

    /// Make every save fail with an IO error
    pub fail_saves: AtomicBool,
}

impl MemoryStore {
    pub fn new(book: AccountBook) -> Self {
        Self {
            book: Mutex::new(book),
            saves: AtomicUsize::new(0),
            fail_saves: AtomicBool::new(false),
        }
    }

    /// Number of successful saves so far
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Copy of the currently stored book
    pub fn snapshot(&self) -> AccountBook {
        self.book.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl AccountStore for MemoryStore {
    fn load(&self) -> StoreResult<AccountBook> {
        Ok(self.snapshot())
    }

    fn save(&self, book: &AccountBook) -> StoreResult<()> {
        if self.fail_saves.load(Ordering::SeqCst) {
            return Err(StoreError::Io(std::io::Error::other("save disabled")));
        }
        *self.book.lock().unwrap_or_else(|e| e.into_inner()) = book.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
