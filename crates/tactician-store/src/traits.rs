//! Store trait definitions

use crate::{AccountBook, StoreResult};

/// Whole-map account persistence.
///
/// A run reads the full book once before any work starts and writes it back
/// once after every worker has finished; there are no partial updates.
pub trait AccountStore: Send + Sync {
    /// Load every account, creating an empty store if none exists yet
    fn load(&self) -> StoreResult<AccountBook>;

    /// Replace the persisted accounts with `book`
    fn save(&self, book: &AccountBook) -> StoreResult<()>;
}
