//! Persistence layer for tactician
//!
//! Provides:
//! - The in-memory account map (`AccountBook`)
//! - The `AccountStore` trait: whole-map load and save
//! - A JSON file store and an in-memory store for tests

mod book;
mod json;
mod memory;
mod traits;

pub use book::*;
pub use json::*;
pub use memory::*;
pub use traits::*;

use thiserror::Error;

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
