//! Storage error types.

use pathe_core::PatheError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

impl From<StorageError> for PatheError {
    fn from(err: StorageError) -> Self {
        PatheError::Database(err.to_string())
    }
}
