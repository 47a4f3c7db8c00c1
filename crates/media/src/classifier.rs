//! Media classification: one inbound message in, an accepted [`MediaDescriptor`] or an explicit
//! unsupported verdict out.

use std::sync::Arc;

use pathe_core::{Attachment, FileRef, Message};
use tracing::{debug, instrument};

use crate::descriptor::{MediaDescriptor, MediaFetcher};
use crate::error::MediaError;

/// Content type of a multi-size image, which never declares one (plain photos are always JPEG).
pub const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

/// Reported for a single file that declares no content type. Such files are rejected.
pub const UNDECLARED_CONTENT_TYPE: &str = "application/octet-stream";

/// Content types the agent accepts. Anything else is rejected.
pub const SUPPORTED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
    "image/heif",
    "video/mp4",
    "video/mpeg",
    "video/mov",
    "video/avi",
    "video/x-flv",
    "video/mpg",
    "video/webm",
    "video/wmv",
    "video/3gpp",
    "application/pdf",
    "audio/wav",
    "audio/mp3",
    "audio/aiff",
    "audio/aac",
    "audio/ogg",
    "audio/flac",
];

pub fn is_supported_content_type(content_type: &str) -> bool {
    SUPPORTED_CONTENT_TYPES
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(content_type))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    Supported(MediaDescriptor),
    Unsupported { content_type: String },
}

/// Picks the file that represents the attachment: the last (largest) variant of a multi-size image.
pub fn select_file(attachment: &Attachment) -> Option<&FileRef> {
    match attachment {
        Attachment::Single(file) => Some(file),
        Attachment::MultiVariant(variants) => variants.last(),
    }
}

/// Last segment of a transport file path; falls back to the file id when the path has none.
pub fn file_name_from_path(file_path: &str, file_id: &str) -> String {
    file_path
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .unwrap_or(file_id)
        .to_string()
}

pub struct MediaClassifier {
    fetcher: Arc<dyn MediaFetcher>,
}

impl MediaClassifier {
    pub fn new(fetcher: Arc<dyn MediaFetcher>) -> Self {
        Self { fetcher }
    }

    /// Classifies the attachment of `message`.
    ///
    /// Unsupported content is an `Ok` outcome. A failure to acquire the retrieval handle is an error.
    #[instrument(skip(self, message), fields(message_id = %message.id))]
    pub async fn classify(&self, message: &Message) -> Result<Classification, MediaError> {
        let attachment = message.attachment.as_ref().ok_or(MediaError::NoAttachment)?;
        let file = select_file(attachment).ok_or(MediaError::NoAttachment)?;

        let declared = file
            .mime_type
            .as_deref()
            .map(|m| m.trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty());
        let content_type = match (declared, attachment) {
            (Some(declared), _) => declared,
            (None, Attachment::MultiVariant(_)) => DEFAULT_CONTENT_TYPE.to_string(),
            (None, Attachment::Single(_)) => {
                debug!("attachment declares no content type");
                return Ok(Classification::Unsupported {
                    content_type: UNDECLARED_CONTENT_TYPE.to_string(),
                });
            }
        };

        if !is_supported_content_type(&content_type) {
            debug!(content_type = %content_type, "unsupported content type");
            return Ok(Classification::Unsupported { content_type });
        }

        let handle = self.fetcher.resolve(&file.file_id).await?;
        let file_name = match file.file_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => file_name_from_path(&handle.file_path, &handle.file_id),
        };

        debug!(
            content_type = %content_type,
            file_name = %file_name,
            group_id = ?message.media_group_id,
            "media classified"
        );

        Ok(Classification::Supported(
            MediaDescriptor::new(content_type, file_name, handle)
                .with_caption(message.caption.clone())
                .with_group_id(message.media_group_id.clone()),
        ))
    }
}
