//! Storage crate: SQLite persistence for the bot.
//!
//! ## Modules
//!
//! - [`error`] – Storage error types
//! - [`models`] – UserRecord, MessageRecord, MessageRole
//! - [`sqlite_pool`] – SqlitePoolManager (pool + schema)
//! - [`user_repo`] – UserRepository
//! - [`message_repo`] – MessageRepository (chat log)
//! - [`session_store`] – SqliteSessionStore (conversation sessions and history)

mod error;
mod message_repo;
mod models;
mod session_store;
mod sqlite_pool;
mod user_repo;

pub use error::StorageError;
pub use message_repo::{MessageRepository, DEFAULT_HISTORY_LIMIT};
pub use models::{MessageRecord, MessageRole, UserRecord};
pub use session_store::SqliteSessionStore;
pub use sqlite_pool::SqlitePoolManager;
pub use user_repo::UserRepository;
