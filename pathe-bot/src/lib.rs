//! Kya Hua Pathe: a Telegram bot that relays chat text and media albums to a hosted Gemini agent and
//! streams the answer back as formatted replies.
//!
//! Updates flow through a [`handler_chain::HandlerChain`]: persistence middleware first, then the
//! `/start`, media and text handlers. Media albums are debounced by [`pathe_media::MediaGroupAggregator`]
//! before one turn goes to the agent through [`relay::TurnRelay`].

pub mod cli;
pub mod components;
pub mod config;
pub mod handlers;
pub mod health;
pub mod relay;
pub mod runner;

pub use cli::{load_config, Cli, Commands};
pub use components::{build_bot_components, build_handler_chain, BotComponents};
pub use config::{BaseConfig, BotConfig, SessionStoreKind};
pub use handlers::{
    MediaHandler, PersistenceMiddleware, StartHandler, TextHandler, GREETING,
    UNSUPPORTED_MEDIA_MESSAGE,
};
pub use health::{health_router, serve_health, shutdown_signal};
pub use relay::{TurnRelay, RETRIEVAL_FAILURE_MESSAGE};
pub use runner::{run_bot, PatheBot};
