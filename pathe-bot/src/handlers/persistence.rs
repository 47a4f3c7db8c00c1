//! Middleware that records the sender and every inbound message before routing.

use async_trait::async_trait;
use pathe_core::{HandlerResponse, Message, Middleware, Result};
use storage::{MessageRepository, UserRepository};
use tracing::{error, info, instrument};

#[derive(Clone)]
pub struct PersistenceMiddleware {
    users: UserRepository,
    messages: MessageRepository,
}

impl PersistenceMiddleware {
    pub fn new(users: UserRepository, messages: MessageRepository) -> Self {
        Self { users, messages }
    }
}

/// Text stored for a message: its body or caption, or the media kind in brackets.
fn logged_content(message: &Message) -> String {
    if !message.content.is_empty() || !message.has_attachment() {
        message.content.clone()
    } else {
        format!("[{}]", message.message_type)
    }
}

#[async_trait]
impl Middleware for PersistenceMiddleware {
    #[instrument(skip(self, message))]
    async fn before(&self, message: &Message) -> Result<bool> {
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            message_id = %message.id,
            message_type = %message.message_type,
            "step: PersistenceMiddleware before, saving message"
        );

        self.users
            .get_or_create_user(
                message.user.id,
                message.user.first_name.as_deref(),
                message.user.last_name.as_deref(),
                message.user.username.as_deref(),
            )
            .await
            .map_err(|e| {
                error!(error = %e, user_id = message.user.id, "Failed to save user");
                e
            })?;

        self.messages
            .append_user_message(
                message.user.id,
                message.chat.id,
                Some(message.id.clone()),
                &logged_content(message),
            )
            .await
            .map_err(|e| {
                error!(error = %e, user_id = message.user.id, "Failed to save message");
                e
            })?;

        Ok(true)
    }

    #[instrument(skip(self, message, response))]
    async fn after(&self, message: &Message, response: &HandlerResponse) -> Result<()> {
        info!(
            user_id = message.user.id,
            chat_id = message.chat.id,
            response = ?response,
            "step: PersistenceMiddleware after"
        );
        Ok(())
    }
}
