//! Run loop and orchestration core for tactician
//!
//! This crate is the heart of tactician, containing:
//! - The cooldown gate for free-tier accounts
//! - The puzzle session (fetch, then submit with a reported duration)
//! - The per-account run loop (CheckCooldown -> Solve -> Delay -> Solve | Stop)
//! - The bounded-concurrency orchestrator and its single terminal save
//! - Outcome reporting and the live status board
//! - Account management: onboarding, refresh, prune, strategy assignment

mod accounts;
pub mod cooldown;
mod error;
mod orchestrator;
mod report;
mod runner;
mod session;
mod status;

pub use accounts::*;
pub use error::*;
pub use orchestrator::*;
pub use report::*;
pub use runner::*;
pub use session::*;
pub use status::*;
