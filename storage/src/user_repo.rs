//! User repository: one row per Telegram user, refreshed when profile fields change.

use chrono::Utc;
use tracing::{debug, info};

use crate::error::StorageError;
use crate::models::UserRecord;
use crate::sqlite_pool::SqlitePoolManager;

#[derive(Clone)]
pub struct UserRepository {
    pool_manager: SqlitePoolManager,
}

impl UserRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::from_pool(SqlitePoolManager::new(database_url).await?))
    }

    pub fn from_pool(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub async fn get_user(&self, user_id: i64) -> Result<Option<UserRecord>, StorageError> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(user)
    }

    /// Inserts the user if unknown. For a known user, fields passed as `Some` that differ from the
    /// stored value are updated and `updated_at` is bumped; `None` never clears a field.
    pub async fn get_or_create_user(
        &self,
        user_id: i64,
        first_name: Option<&str>,
        last_name: Option<&str>,
        username: Option<&str>,
    ) -> Result<UserRecord, StorageError> {
        let pool = self.pool_manager.pool();

        let Some(existing) = self.get_user(user_id).await? else {
            let now = Utc::now();
            sqlx::query(
                r#"
                INSERT INTO users (user_id, username, first_name, last_name, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?)
                ON CONFLICT(user_id) DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(username)
            .bind(first_name)
            .bind(last_name)
            .bind(now)
            .bind(now)
            .execute(pool)
            .await?;
            info!(user_id, "Created user");
            return self
                .get_user(user_id)
                .await?
                .ok_or_else(|| StorageError::NotFound(format!("user {}", user_id)));
        };

        let changed = |new: Option<&str>, old: &Option<String>| match new {
            Some(value) => old.as_deref() != Some(value),
            None => false,
        };
        if !changed(first_name, &existing.first_name)
            && !changed(last_name, &existing.last_name)
            && !changed(username, &existing.username)
        {
            return Ok(existing);
        }

        sqlx::query(
            r#"
            UPDATE users SET
                first_name = COALESCE(?, first_name),
                last_name = COALESCE(?, last_name),
                username = COALESCE(?, username),
                updated_at = ?
            WHERE user_id = ?
            "#,
        )
        .bind(first_name)
        .bind(last_name)
        .bind(username)
        .bind(Utc::now())
        .bind(user_id)
        .execute(pool)
        .await?;
        debug!(user_id, "Updated user profile");

        self.get_user(user_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("user {}", user_id)))
    }
}
