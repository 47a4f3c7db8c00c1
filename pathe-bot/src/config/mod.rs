//! Bot configuration: BaseConfig (Telegram, logging, storage, media, health) + agent settings.

mod base;
mod bot_config;


pub use base::{BaseConfig, SessionStoreKind};
pub use bot_config::BotConfig;
