//! Message repository: the chat log of user messages and bot responses.

use crate::error::StorageError;
use crate::models::{MessageRecord, MessageRole};
use crate::sqlite_pool::SqlitePoolManager;
use tracing::{debug, info};

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;

#[derive(Clone)]
pub struct MessageRepository {
    pool_manager: SqlitePoolManager,
}

impl MessageRepository {
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::from_pool(SqlitePoolManager::new(database_url).await?))
    }

    pub fn from_pool(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub async fn save(&self, message: &MessageRecord) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO messages (id, user_id, chat_id, message_id, role, content, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&message.id)
        .bind(message.user_id)
        .bind(message.chat_id)
        .bind(&message.message_id)
        .bind(&message.role)
        .bind(&message.content)
        .bind(message.created_at)
        .execute(self.pool_manager.pool())
        .await?;

        debug!(
            id = %message.id,
            user_id = message.user_id,
            chat_id = message.chat_id,
            role = %message.role,
            "Saved message"
        );
        Ok(())
    }

    pub async fn append_user_message(
        &self,
        user_id: i64,
        chat_id: i64,
        message_id: Option<String>,
        text: &str,
    ) -> Result<MessageRecord, StorageError> {
        let record = MessageRecord::new(user_id, chat_id, message_id, MessageRole::User, text);
        self.save(&record).await?;
        Ok(record)
    }

    pub async fn append_bot_response(
        &self,
        user_id: i64,
        chat_id: i64,
        message_id: Option<String>,
        text: &str,
    ) -> Result<MessageRecord, StorageError> {
        let record =
            MessageRecord::new(user_id, chat_id, message_id, MessageRole::Assistant, text);
        self.save(&record).await?;
        Ok(record)
    }

    /// Latest `limit` messages of a user (optionally in one chat), oldest first.
    pub async fn get_user_chat_history(
        &self,
        user_id: i64,
        chat_id: Option<i64>,
        limit: Option<i64>,
    ) -> Result<Vec<MessageRecord>, StorageError> {
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        let messages = sqlx::query_as::<_, MessageRecord>(
            r#"
            SELECT id, user_id, chat_id, message_id, role, content, created_at FROM (
                SELECT rowid AS seq, * FROM messages
                WHERE user_id = ? AND (? IS NULL OR chat_id = ?)
                ORDER BY created_at DESC, seq DESC
                LIMIT ?
            )
            ORDER BY created_at ASC, seq ASC
            "#,
        )
        .bind(user_id)
        .bind(chat_id)
        .bind(chat_id)
        .bind(limit)
        .fetch_all(self.pool_manager.pool())
        .await?;

        info!(user_id, count = messages.len(), "Retrieved chat history");
        Ok(messages)
    }
}
