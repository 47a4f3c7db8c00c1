use std::sync::Arc;

use async_trait::async_trait;
use pathe_core::{Bot, Handler, HandlerResponse, Message, Result};
use tracing::info;

pub const GREETING: &str = "Kya Hua Pathe? (Whats up bro?)";

/// Answers `/start`.
pub struct StartHandler {
    bot: Arc<dyn Bot>,
}

impl StartHandler {
    pub fn new(bot: Arc<dyn Bot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Handler for StartHandler {
    async fn handle(&self, message: &Message) -> Result<HandlerResponse> {
        if message.command() != Some("start") {
            return Ok(HandlerResponse::Continue);
        }
        info!(user_id = message.user.id, "step: /start");
        self.bot.reply_to(message, GREETING).await?;
        Ok(HandlerResponse::Reply(GREETING.to_string()))
    }
}
