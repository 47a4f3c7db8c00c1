//! Bot abstraction for sending messages.
//!
//! [`Bot`] is transport-agnostic; pathe-telegram implements it over teloxide and tests use recording mocks.

use crate::error::{PatheError, Result};
use crate::types::{Chat, Message};
use async_trait::async_trait;

/// Abstraction for sending messages. Implementations map to a transport (e.g. Telegram).
#[async_trait]
pub trait Bot: Send + Sync {
    /// Sends a plain text message to the given chat.
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()>;

    /// Sends a plain text reply threaded to the given message.
    async fn reply_to(&self, message: &Message, text: &str) -> Result<()>;

    /// Sends text already escaped for the transport's markup dialect and returns the sent message id.
    /// `reply_to_message_id` threads the message to an earlier one when present.
    async fn send_markup(
        &self,
        chat: &Chat,
        text: &str,
        reply_to_message_id: Option<&str>,
    ) -> Result<String>;
}

/// Parses a transport message id string into an i32.
pub fn parse_message_id(s: &str) -> Result<i32> {
    s.parse()
        .map_err(|_| PatheError::Bot(format!("Invalid message_id: {}", s)))
}
