//! Normalized description of one accepted attachment and the fetch seam to the transport.

use async_trait::async_trait;

use crate::error::MediaError;

/// Retrieval handle for a transport-hosted file. Holds the location, never the bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHandle {
    pub file_id: String,
    /// Transport-side path, e.g. `photos/file_12.jpg`.
    pub file_path: String,
}

/// Access to transport-hosted files.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    /// Acquires a retrieval handle without downloading anything.
    async fn resolve(&self, file_id: &str) -> Result<FileHandle, MediaError>;

    async fn download(&self, handle: &FileHandle) -> Result<Vec<u8>, MediaError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDescriptor {
    content_type: String,
    file_name: String,
    caption: Option<String>,
    group_id: Option<String>,
    handle: FileHandle,
}

impl MediaDescriptor {
    pub fn new(
        content_type: impl Into<String>,
        file_name: impl Into<String>,
        handle: FileHandle,
    ) -> Self {
        Self {
            content_type: content_type.into(),
            file_name: file_name.into(),
            caption: None,
            group_id: None,
            handle,
        }
    }

    pub fn with_caption(mut self, caption: Option<String>) -> Self {
        self.caption = caption;
        self
    }

    pub fn with_group_id(mut self, group_id: Option<String>) -> Self {
        self.group_id = group_id;
        self
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn group_id(&self) -> Option<&str> {
        self.group_id.as_deref()
    }

    pub fn handle(&self) -> &FileHandle {
        &self.handle
    }
}
