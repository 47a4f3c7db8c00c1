use anyhow::{Context, Result};
use handler_chain::HandlerChain;
use pathe_core::{init_tracing, HandlerResponse, Message};
use pathe_telegram::run_repl;
use std::path::Path;
use tokio::net::TcpListener;
use tracing::{error, info, instrument};

use crate::components::{build_bot_components, build_handler_chain, BotComponents};
use crate::config::BotConfig;
use crate::health::{serve_health, shutdown_signal};

/// Components plus the handler chain built from them. Drives core messages directly, without Telegram.
pub struct PatheBot {
    pub components: BotComponents,
    pub handler_chain: HandlerChain,
}

impl PatheBot {
    pub fn from_components(components: BotComponents) -> Self {
        let handler_chain = build_handler_chain(&components);
        Self {
            components,
            handler_chain,
        }
    }

    /// Runs one message through the chain. Failures are logged and returned.
    pub async fn handle_core_message(
        &self,
        message: &Message,
    ) -> pathe_core::Result<HandlerResponse> {
        self.handler_chain.handle(message).await.map_err(|e| {
            error!(error = %e, user_id = message.user.id, "Handler chain failed");
            e
        })
    }
}

fn ensure_log_dir(log_file: &str) -> Result<()> {
    if let Some(dir) = Path::new(log_file).parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
        }
    }
    Ok(())
}

/// Main entry: validate config, init logging, build components, then run the REPL next to the health
/// server until either stops or a shutdown signal arrives.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    config.validate()?;
    ensure_log_dir(config.log_file())?;
    init_tracing(config.log_file())?;

    info!(
        database_url = %config.database_url(),
        session_store = ?config.session_store(),
        media_group_window = ?config.media_group_window(),
        "Initializing bot"
    );

    let (teloxide_bot, components) = build_bot_components(&config).await?;
    let bot = PatheBot::from_components(components);

    let health_addr = config.base().health_addr()?;
    let listener = TcpListener::bind(health_addr)
        .await
        .with_context(|| format!("binding health server to {}", health_addr))?;

    info!("Bot started successfully");

    tokio::select! {
        result = run_repl(teloxide_bot, bot.handler_chain.clone()) => {
            info!("REPL stopped");
            result?;
        }
        result = serve_health(listener, std::future::pending()) => {
            result?;
        }
        _ = shutdown_signal() => {}
    }

    info!("Bot stopped");
    Ok(())
}
