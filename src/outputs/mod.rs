//! Output stages: turning extracted lines into a message and delivering it.
//!
//! # Submodules
//!
//! - [`message`]: Composes the alert, manual-check, or heartbeat text
//! - [`webhook`]: Posts the message to a Discord-compatible webhook, with retry

pub mod message;
pub mod webhook;
