//! Collaborator interfaces for tactician
//!
//! This crate defines the boundary between the orchestration core and the
//! outside world. It contains no network code itself:
//! - `PuzzleRemote`: the remote puzzle service
//! - `Notifier`: the notification sink
//! - Scriptable mocks of both for tests

mod mock;
mod traits;

pub use mock::*;
pub use traits::*;
