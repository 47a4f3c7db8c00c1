//! # pathe-telegram
//!
//! Telegram transport layer: converts teloxide updates into [`pathe_core::Message`], implements
//! [`pathe_core::Bot`] and [`pathe_media::MediaFetcher`] over the Bot API, formats agent output as
//! MarkdownV2 segments and runs the update REPL.

mod adapters;
mod bot_adapter;
mod config;
mod format;
mod markdown;
mod runner;

pub use adapters::{TelegramMessageWrapper, TelegramUserWrapper};
pub use bot_adapter::TelegramBotAdapter;
pub use config::TelegramConfig;
pub use format::{
    format_response, send_segments, split_segments, MAX_MESSAGE_LENGTH, NO_RESPONSE,
};
pub use markdown::{escape_markdown_v2, strip_markdown_v2_escapes, to_markdown_v2};
pub use runner::run_repl;
