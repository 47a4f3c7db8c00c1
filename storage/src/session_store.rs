//! Conversation sessions persisted in SQLite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use pathe_core::{HistoryEntry, HistoryRole, Result, Session, SessionKey, SessionStore};
use tracing::debug;

use crate::error::StorageError;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct SqliteSessionStore {
    pool_manager: SqlitePoolManager,
}

impl SqliteSessionStore {
    pub async fn new(database_url: &str) -> std::result::Result<Self, StorageError> {
        Ok(Self::from_pool(SqlitePoolManager::new(database_url).await?))
    }

    pub fn from_pool(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }
}

#[async_trait]
impl SessionStore for SqliteSessionStore {
    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>> {
        let row: Option<(DateTime<Utc>,)> = sqlx::query_as(
            "SELECT created_at FROM sessions WHERE app_name = ? AND user_id = ? AND session_id = ?",
        )
        .bind(&key.app_name)
        .bind(&key.user_id)
        .bind(&key.session_id)
        .fetch_optional(self.pool_manager.pool())
        .await
        .map_err(StorageError::from)?;

        Ok(row.map(|(created_at,)| Session {
            key: key.clone(),
            created_at,
        }))
    }

    async fn create_session(&self, key: &SessionKey) -> Result<Session> {
        sqlx::query(
            r#"
            INSERT INTO sessions (app_name, user_id, session_id, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(app_name, user_id, session_id) DO NOTHING
            "#,
        )
        .bind(&key.app_name)
        .bind(&key.user_id)
        .bind(&key.session_id)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await
        .map_err(StorageError::from)?;
        debug!(session = %key, "Session ensured");

        self.get_session(key)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("session {}", key)).into())
    }

    async fn append_history(&self, key: &SessionKey, entry: HistoryEntry) -> Result<()> {
        self.ensure_session(key).await?;
        sqlx::query(
            r#"
            INSERT INTO session_history (app_name, user_id, session_id, role, text, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&key.app_name)
        .bind(&key.user_id)
        .bind(&key.session_id)
        .bind(entry.role.as_str())
        .bind(&entry.text)
        .bind(Utc::now())
        .execute(self.pool_manager.pool())
        .await
        .map_err(StorageError::from)?;
        Ok(())
    }

    async fn history(&self, key: &SessionKey, limit: usize) -> Result<Vec<HistoryEntry>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT role, text FROM (
                SELECT id, role, text FROM session_history
                WHERE app_name = ? AND user_id = ? AND session_id = ?
                ORDER BY id DESC
                LIMIT ?
            )
            ORDER BY id ASC
            "#,
        )
        .bind(&key.app_name)
        .bind(&key.user_id)
        .bind(&key.session_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(self.pool_manager.pool())
        .await
        .map_err(StorageError::from)?;

        rows.into_iter()
            .map(|(role, text)| -> Result<HistoryEntry> {
                let role = HistoryRole::parse(&role)
                    .ok_or_else(|| StorageError::InvalidValue(format!("history role {}", role)))?;
                Ok(HistoryEntry { role, text })
            })
            .collect()
    }
}
