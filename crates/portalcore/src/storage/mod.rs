//! Database and portal persistence

pub mod db;
pub mod memory;
pub mod migrations;
pub mod portals;

// Re-exports for convenience
pub use db::{create_pool, get_connection, DbConnection, DbPool};
pub use memory::InMemoryPortalStore;
pub use portals::{NewPortal, PersistenceError, Portal, PortalId, PortalStore, SqlitePortalStore};
