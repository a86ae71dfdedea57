//! Shared utilities for tactician
//!
//! This crate provides:
//! - ID types (Username, RunId)
//! - Wall-clock time with a debug-only mock override, duration formatting
//! - Default paths for the data directory and its files

mod ids;
mod paths;
mod time;

pub use ids::*;
pub use paths::*;
pub use time::*;
