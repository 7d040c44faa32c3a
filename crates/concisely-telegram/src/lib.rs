//! Telegram Bot API adapter for concisely.
//!
//! - [`TelegramClient`] implements the core `ChatGateway` port and exposes
//!   `getUpdates` for polling
//! - [`into_incoming`] maps wire messages to core `IncomingMessage`s
//! - [`Poller`] runs the long-polling loop and dispatches messages

#![deny(unsafe_code)]

mod client;
mod convert;
mod poller;
pub mod wire;

pub use client::{DEFAULT_API_BASE, TelegramClient, TelegramConfig};
pub use convert::into_incoming;
pub use poller::{MessageHandler, Poller, PollerConfig, UpdateSource};
