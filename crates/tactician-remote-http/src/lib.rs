//! HTTP adapters for tactician
//!
//! Implements the collaborator traits from `tactician-remote-api` with
//! `reqwest`:
//! - `HttpRemote`: the remote puzzle service, rooted at a configured base URL
//! - `WebhookNotifier`: posts notifications as chat-webhook embeds

mod remote;
mod webhook;
mod wire;

pub use remote::*;
pub use webhook::*;
