//! Telegram bot handler tree configuration
//!
//! This module provides the dispatcher schema for the bot. The wizard
//! branches sit ahead of the generic command handler so a user with a setup
//! in progress has their input routed to it first.

mod commands;
mod schema;
mod types;

pub use commands::{format_portal_list, help_text, no_session_text, portal_usage_text, start_text};
pub use schema::schema;
pub use types::{HandlerDeps, HandlerError};
