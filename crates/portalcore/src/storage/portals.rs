//! Portal records and their persistence.
//!
//! [`PortalStore`] is the seam the wizard writes through. [`SqlitePortalStore`]
//! is the production implementation on top of the r2d2 pool; blocking
//! rusqlite calls run on the blocking thread pool.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use super::db::{get_connection, DbConnection, DbPool};
use crate::core::error::{AppError, AppResult};
use crate::wizard::types::{ChatKind, OwnerId, ResolvedChat};

/// Primary key of a stored portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PortalId(pub i64);

impl fmt::Display for PortalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted link between a public channel and a private group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portal {
    pub id: PortalId,
    pub channel: ResolvedChat,
    pub group: ResolvedChat,
    pub welcome_text: Option<String>,
    pub created_by: OwnerId,
    pub created_at: DateTime<Utc>,
    pub active: bool,
}

/// Everything needed to create a portal; produced by a completed wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPortal {
    pub channel: ResolvedChat,
    pub group: ResolvedChat,
    pub welcome_text: Option<String>,
    pub created_by: OwnerId,
}

/// Storage failures surfaced to the wizard.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("portal storage failed: {0}")]
    Storage(#[from] AppError),

    #[error("portal storage unavailable: {0}")]
    Unavailable(String),
}

/// Create/read/update operations on portal records.
#[async_trait]
pub trait PortalStore: Send + Sync {
    async fn create_portal(&self, portal: NewPortal) -> Result<PortalId, PersistenceError>;

    async fn get_portal(&self, id: PortalId) -> Result<Option<Portal>, PersistenceError>;

    async fn portals_for_owner(&self, owner: OwnerId) -> Result<Vec<Portal>, PersistenceError>;

    /// Returns `false` when no portal has that id.
    async fn update_welcome_text(&self, id: PortalId, welcome_text: Option<String>) -> Result<bool, PersistenceError>;

    /// Returns `false` when no portal has that id.
    async fn set_active(&self, id: PortalId, active: bool) -> Result<bool, PersistenceError>;
}

/// SQLite-backed [`PortalStore`].
#[derive(Clone)]
pub struct SqlitePortalStore {
    pool: Arc<DbPool>,
}

impl SqlitePortalStore {
    pub fn new(pool: Arc<DbPool>) -> Self {
        Self { pool }
    }

    async fn with_connection<T, F>(&self, op: F) -> Result<T, PersistenceError>
    where
        T: Send + 'static,
        F: FnOnce(&DbConnection) -> AppResult<T> + Send + 'static,
    {
        let pool = Arc::clone(&self.pool);
        let result = tokio::task::spawn_blocking(move || {
            let conn = get_connection(&pool)?;
            op(&conn)
        })
        .await
        .map_err(AppError::from)?;
        Ok(result?)
    }
}

const SELECT_COLUMNS: &str = "id, channel_id, channel_kind, channel_title, channel_username, \
     group_id, group_kind, group_title, group_username, welcome_text, created_by, created_at, active";

fn parse_kind(raw: &str, column: usize) -> rusqlite::Result<ChatKind> {
    raw.parse::<ChatKind>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn portal_from_row(row: &Row<'_>) -> rusqlite::Result<Portal> {
    let channel_kind: String = row.get(2)?;
    let group_kind: String = row.get(6)?;
    let created_at: String = row.get(11)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(11, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(Portal {
        id: PortalId(row.get(0)?),
        channel: ResolvedChat {
            id: row.get(1)?,
            kind: parse_kind(&channel_kind, 2)?,
            title: row.get(3)?,
            username: row.get(4)?,
        },
        group: ResolvedChat {
            id: row.get(5)?,
            kind: parse_kind(&group_kind, 6)?,
            title: row.get(7)?,
            username: row.get(8)?,
        },
        welcome_text: row.get(9)?,
        created_by: OwnerId(row.get(10)?),
        created_at,
        active: row.get::<_, i64>(12)? != 0,
    })
}

/// Inserts a portal row and returns its id.
pub fn insert_portal(conn: &DbConnection, portal: &NewPortal, created_at: DateTime<Utc>) -> AppResult<PortalId> {
    conn.execute(
        "INSERT INTO portals (channel_id, channel_kind, channel_title, channel_username, \
         group_id, group_kind, group_title, group_username, welcome_text, created_by, created_at, active) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 1)",
        params![
            portal.channel.id,
            portal.channel.kind.as_ref(),
            portal.channel.title,
            portal.channel.username,
            portal.group.id,
            portal.group.kind.as_ref(),
            portal.group.title,
            portal.group.username,
            portal.welcome_text,
            portal.created_by.0,
            created_at.to_rfc3339(),
        ],
    )?;
    Ok(PortalId(conn.last_insert_rowid()))
}

/// Loads a single portal.
pub fn load_portal(conn: &DbConnection, id: PortalId) -> AppResult<Option<Portal>> {
    let sql = format!("SELECT {} FROM portals WHERE id = ?1", SELECT_COLUMNS);
    Ok(conn.query_row(&sql, params![id.0], portal_from_row).optional()?)
}

/// Lists the portals created by one user, oldest first.
pub fn load_portals_for_owner(conn: &DbConnection, owner: OwnerId) -> AppResult<Vec<Portal>> {
    let sql = format!("SELECT {} FROM portals WHERE created_by = ?1 ORDER BY id", SELECT_COLUMNS);
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![owner.0], portal_from_row)?;
    let mut portals = Vec::new();
    for row in rows {
        portals.push(row?);
    }
    Ok(portals)
}

#[async_trait]
impl PortalStore for SqlitePortalStore {
    async fn create_portal(&self, portal: NewPortal) -> Result<PortalId, PersistenceError> {
        let id = self
            .with_connection(move |conn| insert_portal(conn, &portal, Utc::now()))
            .await?;
        log::info!("Portal {} stored", id);
        Ok(id)
    }

    async fn get_portal(&self, id: PortalId) -> Result<Option<Portal>, PersistenceError> {
        self.with_connection(move |conn| load_portal(conn, id)).await
    }

    async fn portals_for_owner(&self, owner: OwnerId) -> Result<Vec<Portal>, PersistenceError> {
        self.with_connection(move |conn| load_portals_for_owner(conn, owner))
            .await
    }

    async fn update_welcome_text(&self, id: PortalId, welcome_text: Option<String>) -> Result<bool, PersistenceError> {
        self.with_connection(move |conn| {
            let changed = conn.execute(
                "UPDATE portals SET welcome_text = ?1 WHERE id = ?2",
                params![welcome_text, id.0],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn set_active(&self, id: PortalId, active: bool) -> Result<bool, PersistenceError> {
        self.with_connection(move |conn| {
            let changed = conn.execute(
                "UPDATE portals SET active = ?1 WHERE id = ?2",
                params![i64::from(active), id.0],
            )?;
            Ok(changed > 0)
        })
        .await
    }
}
