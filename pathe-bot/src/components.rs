//! Wiring: storage, agent, Telegram adapter, media pipeline and the handler chain built from them.

use std::sync::Arc;
use std::time::Duration;

use agent_gateway::{AgentService, GeminiGateway, InMemorySessionStore};
use anyhow::Result;
use handler_chain::HandlerChain;
use pathe_core::{Bot, SessionStore};
use pathe_media::{MediaClassifier, MediaFetcher, MediaGroupAggregator, TokioScheduler};
use pathe_telegram::{TelegramBotAdapter, TelegramConfig};
use storage::{MessageRepository, SqlitePoolManager, SqliteSessionStore, UserRepository};
use tracing::info;

use crate::config::{BotConfig, SessionStoreKind};
use crate::handlers::{MediaHandler, PersistenceMiddleware, StartHandler, TextHandler};
use crate::relay::TurnRelay;

/// Everything the handler chain needs. The trait objects let tests swap in mocks.
#[derive(Clone)]
pub struct BotComponents {
    pub bot: Arc<dyn Bot>,
    pub fetcher: Arc<dyn MediaFetcher>,
    pub users: UserRepository,
    pub messages: MessageRepository,
    pub agent: Arc<AgentService>,
    pub media_window: Duration,
}

/// Builds the teloxide bot and the components around it from `config`.
pub async fn build_bot_components(config: &BotConfig) -> Result<(teloxide::Bot, BotComponents)> {
    let telegram = TelegramConfig {
        bot_token: config.bot_token().to_string(),
        telegram_api_url: config.telegram_api_url().map(str::to_string),
        log_file: Some(config.log_file().to_string()),
    };
    let teloxide_bot = telegram.build_bot()?;
    let adapter = TelegramBotAdapter::new(teloxide_bot.clone());

    let pool = SqlitePoolManager::new(config.database_url()).await?;
    info!(database_url = %config.database_url(), "Database ready");
    let users = UserRepository::from_pool(pool.clone());
    let messages = MessageRepository::from_pool(pool.clone());

    let sessions: Arc<dyn SessionStore> = match config.session_store() {
        SessionStoreKind::Memory => Arc::new(InMemorySessionStore::new()),
        SessionStoreKind::Sqlite => Arc::new(SqliteSessionStore::from_pool(pool)),
    };

    let agent_config = config.agent();
    let gateway = Arc::new(GeminiGateway::from_config(agent_config));
    info!(
        model = %gateway.model(),
        session_store = ?config.session_store(),
        "Agent gateway ready"
    );
    let agent = Arc::new(AgentService::new(
        agent_config.app_name(),
        gateway,
        sessions,
        agent_config.history_limit(),
    ));

    let components = BotComponents {
        bot: Arc::new(adapter.clone()),
        fetcher: Arc::new(adapter),
        users,
        messages,
        agent,
        media_window: config.media_group_window(),
    };
    Ok((teloxide_bot, components))
}

/// Chain order: persistence middleware, then /start, media, text.
pub fn build_handler_chain(components: &BotComponents) -> HandlerChain {
    let relay = Arc::new(TurnRelay::new(
        components.bot.clone(),
        components.agent.clone(),
        components.messages.clone(),
    ));
    let aggregator = Arc::new(
        MediaGroupAggregator::new(
            Arc::new(TokioScheduler::new()),
            components.fetcher.clone(),
            relay.clone(),
        )
        .with_window(components.media_window),
    );

    HandlerChain::new()
        .add_middleware(Arc::new(PersistenceMiddleware::new(
            components.users.clone(),
            components.messages.clone(),
        )))
        .add_handler(Arc::new(StartHandler::new(components.bot.clone())))
        .add_handler(Arc::new(MediaHandler::new(
            components.bot.clone(),
            MediaClassifier::new(components.fetcher.clone()),
            aggregator,
        )))
        .add_handler(Arc::new(TextHandler::new(relay)))
}
