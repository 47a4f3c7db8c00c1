//! The unit handed to the agent: text plus downloaded attachments.

/// Downloaded attachment bytes with their content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnAttachment {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationTurn {
    /// Empty when the user sent media without any caption.
    pub text: String,
    pub attachments: Vec<TurnAttachment>,
}

impl ConversationTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachments(text: impl Into<String>, attachments: Vec<TurnAttachment>) -> Self {
        Self {
            text: text.into(),
            attachments,
        }
    }

    pub fn has_attachments(&self) -> bool {
        !self.attachments.is_empty()
    }
}

/// First non-empty caption in arrival order, or an empty string.
pub fn resolve_caption<'a, I>(captions: I) -> String
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    captions
        .into_iter()
        .flatten()
        .find(|caption| !caption.is_empty())
        .unwrap_or_default()
        .to_string()
}
