//! Portalcore - the Telegram-free half of the portal bot
//!
//! # Module Structure
//!
//! - `core`: configuration, errors and logging setup
//! - `storage`: SQLite pool, migrations and the portal store
//! - `wizard`: the setup wizard state machine, session registry and
//!   chat admin verification

#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod core;
pub mod storage;
pub mod wizard;

// Re-export commonly used types for convenience
pub use crate::core::{config, init_logger, AppError, AppResult};
pub use storage::{create_pool, InMemoryPortalStore, NewPortal, Portal, PortalId, PortalStore, SqlitePortalStore};
pub use wizard::{ChatAdminVerifier, Dispatch, IncomingMessage, OwnerId, Prompt, WizardConfig, WizardOrchestrator};
