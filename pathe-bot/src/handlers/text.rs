use std::sync::Arc;

use async_trait::async_trait;
use pathe_core::{ConversationTurn, Handler, HandlerResponse, Message, Result};

use crate::relay::TurnRelay;

/// Plain text (not commands, not media) becomes a text-only agent turn.
pub struct TextHandler {
    relay: Arc<TurnRelay>,
}

impl TextHandler {
    pub fn new(relay: Arc<TurnRelay>) -> Self {
        Self { relay }
    }
}

#[async_trait]
impl Handler for TextHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.message_type != "text" || message.content.trim().is_empty() {
            return Ok(HandlerResponse::Continue);
        }
        let summary = self
            .relay
            .run(message, ConversationTurn::text(message.content.clone()))
            .await?;
        Ok(HandlerResponse::Reply(summary.reply))
    }
}
