//! Wraps teloxide::Bot and implements [`pathe_core::Bot`] and [`pathe_media::MediaFetcher`].
//! Production code talks to the Bot API; tests substitute recording implementations.

use async_trait::async_trait;
use pathe_core::{parse_message_id, Bot as CoreBot, Chat, Message, PatheError, Result};
use pathe_media::{FileHandle, MediaError, MediaFetcher};
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatId, FileId, MessageId, ParseMode, ReplyParameters};
use tracing::{debug, warn};

use crate::markdown::strip_markdown_v2_escapes;

/// Thin wrapper around teloxide::Bot.
#[derive(Clone)]
pub struct TelegramBotAdapter {
    bot: teloxide::Bot,
}

impl TelegramBotAdapter {
    pub fn new(bot: teloxide::Bot) -> Self {
        Self { bot }
    }

    fn reply_parameters(reply_to_message_id: Option<&str>) -> Result<Option<ReplyParameters>> {
        reply_to_message_id
            .map(|id| parse_message_id(id).map(|id| ReplyParameters::new(MessageId(id))))
            .transpose()
    }
}

#[async_trait]
impl CoreBot for TelegramBotAdapter {
    async fn send_message(&self, chat: &Chat, text: &str) -> Result<()> {
        self.bot
            .send_message(ChatId(chat.id), text.to_string())
            .await
            .map_err(|e| PatheError::Bot(e.to_string()))?;
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        let mut request = self.bot.send_message(ChatId(message.chat.id), text.to_string());
        if let Some(params) = Self::reply_parameters(Some(&message.id))? {
            request = request.reply_parameters(params);
        }
        request
            .await
            .map_err(|e| PatheError::Bot(e.to_string()))?;
        Ok(())
    }

    /// Sends MarkdownV2; if Telegram rejects the markup the same segment goes out as plain text.
    async fn send_markup(
        &self,
        chat: &Chat,
        text: &str,
        reply_to_message_id: Option<&str>,
    ) -> Result<String> {
        let params = Self::reply_parameters(reply_to_message_id)?;

        let mut request = self
            .bot
            .send_message(ChatId(chat.id), text.to_string())
            .parse_mode(ParseMode::MarkdownV2);
        if let Some(params) = params.clone() {
            request = request.reply_parameters(params);
        }
        match request.await {
            Ok(sent) => Ok(sent.id.to_string()),
            Err(e) => {
                warn!(error = %e, chat_id = chat.id, "MarkdownV2 send failed, falling back to plain text");
                let mut plain = self
                    .bot
                    .send_message(ChatId(chat.id), strip_markdown_v2_escapes(text));
                if let Some(params) = params {
                    plain = plain.reply_parameters(params);
                }
                let sent = plain.await.map_err(|e| PatheError::Bot(e.to_string()))?;
                Ok(sent.id.to_string())
            }
        }
    }
}

#[async_trait]
impl MediaFetcher for TelegramBotAdapter {
    async fn resolve(&self, file_id: &str) -> std::result::Result<FileHandle, MediaError> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .map_err(|e| MediaError::Resolve {
                file_id: file_id.to_string(),
                reason: e.to_string(),
            })?;
        debug!(file_id = %file_id, file_path = %file.path, "Resolved file");
        Ok(FileHandle {
            file_id: file_id.to_string(),
            file_path: file.path,
        })
    }

    async fn download(&self, handle: &FileHandle) -> std::result::Result<Vec<u8>, MediaError> {
        let mut bytes = Vec::new();
        self.bot
            .download_file(&handle.file_path, &mut bytes)
            .await
            .map_err(|e| MediaError::Download {
                file_path: handle.file_path.clone(),
                reason: e.to_string(),
            })?;
        debug!(file_path = %handle.file_path, size = bytes.len(), "Downloaded file");
        Ok(bytes)
    }
}
