use pathe_core::PatheError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("message has no attachment")]
    NoAttachment,

    #[error("failed to resolve file {file_id}: {reason}")]
    Resolve { file_id: String, reason: String },

    #[error("failed to download {file_path}: {reason}")]
    Download { file_path: String, reason: String },
}

impl From<MediaError> for PatheError {
    fn from(err: MediaError) -> Self {
        PatheError::Media(err.to_string())
    }
}
