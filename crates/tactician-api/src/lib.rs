//! Shared domain types for tactician
//!
//! This crate defines the vocabulary shared by every other crate:
//! - Accounts as persisted in the account store
//! - Strategy mode enums
//! - Puzzle, submission and profile records exchanged with the remote service
//! - Notification payloads

mod account;
mod modes;
mod notification;
mod puzzle;

pub use account::*;
pub use modes::*;
pub use notification::*;
pub use puzzle::*;
