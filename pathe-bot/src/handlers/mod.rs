//! Chat handlers and middleware of the bot's chain.

mod media;
mod persistence;
mod start;
mod text;

pub use media::{MediaHandler, UNSUPPORTED_MEDIA_MESSAGE};
pub use persistence::PersistenceMiddleware;
pub use start::{StartHandler, GREETING};
pub use text::TextHandler;
