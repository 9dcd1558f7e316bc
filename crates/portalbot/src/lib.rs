//! Portalbot - Telegram front end for the portal setup wizard
//!
//! # Module Structure
//!
//! - `cli`: command line arguments
//! - `telegram`: bot bootstrap, chat transport, dispatcher schema and
//!   notifications

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod cli;
pub mod telegram;

pub use telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, TeloxideTransport};
