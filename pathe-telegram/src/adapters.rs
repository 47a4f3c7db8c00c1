//! Adapters from Telegram (teloxide) types to pathe_core types.
//! Depends only on teloxide and pathe_core type definitions.

use pathe_core::{
    Attachment, Chat, FileRef, Message, MessageDirection, ToCoreMessage, ToCoreUser, User,
};

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
        }
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let (message_type, attachment) = self.attachment();
        let caption = self.0.caption().map(str::to_string);
        let content = self
            .0
            .text()
            .map(str::to_string)
            .or_else(|| caption.clone())
            .unwrap_or_default();
        let message_type = match message_type {
            Some(kind) => kind.to_string(),
            None if content.starts_with('/') => "command".to_string(),
            None if self.0.text().is_some() => "text".to_string(),
            None => "other".to_string(),
        };

        Message {
            id: self.0.id.to_string(),
            user: self
                .0
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(|| User {
                    id: 0,
                    username: None,
                    first_name: None,
                    last_name: None,
                }),
            chat: Chat {
                id: self.0.chat.id.0,
                chat_type: format!("{:?}", self.0.chat.kind),
            },
            content,
            message_type,
            direction: MessageDirection::Incoming,
            created_at: chrono::Utc::now(),
            attachment,
            caption,
            media_group_id: self.0.media_group_id().map(|id| id.0.clone()),
        }
    }
}

impl<'a> TelegramMessageWrapper<'a> {
    /// Media kind name and attachment, if the message carries one of the supported media kinds.
    fn attachment(&self) -> (Option<&'static str>, Option<Attachment>) {
        let msg = self.0;
        if let Some(sizes) = msg.photo() {
            let variants = sizes
                .iter()
                .map(|ps| FileRef::new(ps.file.id.to_string()))
                .collect();
            return (Some("photo"), Some(Attachment::MultiVariant(variants)));
        }
        if let Some(video) = msg.video() {
            let file = file_ref(
                video.file.id.to_string(),
                video.mime_type.as_ref().map(|m| m.essence_str()),
                video.file_name.as_deref(),
            );
            return (Some("video"), Some(Attachment::Single(file)));
        }
        if let Some(audio) = msg.audio() {
            let file = file_ref(
                audio.file.id.to_string(),
                audio.mime_type.as_ref().map(|m| m.essence_str()),
                audio.file_name.as_deref(),
            );
            return (Some("audio"), Some(Attachment::Single(file)));
        }
        if let Some(voice) = msg.voice() {
            let file = file_ref(
                voice.file.id.to_string(),
                voice.mime_type.as_ref().map(|m| m.essence_str()),
                None,
            );
            return (Some("voice"), Some(Attachment::Single(file)));
        }
        if let Some(note) = msg.video_note() {
            // Video notes are always MPEG-4 but never declare it.
            let file = file_ref(note.file.id.to_string(), Some("video/mp4"), None);
            return (Some("video_note"), Some(Attachment::Single(file)));
        }
        if let Some(document) = msg.document() {
            let file = file_ref(
                document.file.id.to_string(),
                document.mime_type.as_ref().map(|m| m.essence_str()),
                document.file_name.as_deref(),
            );
            return (Some("document"), Some(Attachment::Single(file)));
        }
        (None, None)
    }
}

fn file_ref(file_id: String, mime_type: Option<&str>, file_name: Option<&str>) -> FileRef {
    let mut file = FileRef::new(file_id);
    if let Some(mime_type) = mime_type {
        file = file.with_mime_type(mime_type);
    }
    if let Some(file_name) = file_name {
        file = file.with_file_name(file_name);
    }
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Test: TelegramUserWrapper converts teloxide User to core User with correct id, username, first_name, last_name.**
    #[test]
    fn test_telegram_user_wrapper_to_core() {
        let user = teloxide::types::User {
            id: teloxide::types::UserId(123),
            is_bot: false,
            first_name: "Test".to_string(),
            last_name: Some("User".to_string()),
            username: Some("testuser".to_string()),
            language_code: Some("en".to_string()),
            is_premium: false,
            added_to_attachment_menu: false,
        };

        let core_user = TelegramUserWrapper(&user).to_core();

        assert_eq!(core_user.id, 123);
        assert_eq!(core_user.username, Some("testuser".to_string()));
        assert_eq!(core_user.first_name, Some("Test".to_string()));
        assert_eq!(core_user.last_name, Some("User".to_string()));
    }
}
