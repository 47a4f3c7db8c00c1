//! Base config: Telegram Bot connection, logging, database, media window, health server. Loaded from env.

use anyhow::{bail, Context, Result};
use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:./pathe.db";
pub const DEFAULT_LOG_FILE: &str = "logs/pathe.log";
pub const DEFAULT_HEALTH_BIND: &str = "0.0.0.0:7347";
pub const DEFAULT_MEDIA_GROUP_WINDOW_SECS: u64 = 3;

/// Where conversation sessions live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStoreKind {
    Memory,
    Sqlite,
}

impl FromStr for SessionStoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(SessionStoreKind::Memory),
            "sqlite" => Ok(SessionStoreKind::Sqlite),
            other => bail!("SESSION_STORE must be memory or sqlite, got {}", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct BaseConfig {
    /// BOT_TOKEN or TELEGRAM_BOT_TOKEN
    pub bot_token: String,
    /// TELEGRAM_API_URL or TELOXIDE_API_URL
    pub telegram_api_url: Option<String>,
    pub log_file: String,
    /// Users, message log and (optionally) sessions.
    pub database_url: String,
    pub session_store: SessionStoreKind,
    /// Quiescence window for media albums.
    pub media_group_window: Duration,
    pub health_bind: String,
}

impl BaseConfig {
    /// Load from environment variables. `token` overrides BOT_TOKEN if provided.
    pub fn load(token: Option<String>) -> Result<Self> {
        let bot_token = match token {
            Some(token) => token,
            None => env::var("BOT_TOKEN")
                .or_else(|_| env::var("TELEGRAM_BOT_TOKEN"))
                .context("BOT_TOKEN not set")?,
        };
        let telegram_api_url = env::var("TELEGRAM_API_URL")
            .or_else(|_| env::var("TELOXIDE_API_URL"))
            .ok();
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let session_store = match env::var("SESSION_STORE") {
            Ok(value) => value.parse()?,
            Err(_) => SessionStoreKind::Memory,
        };
        let media_group_window = Duration::from_secs(
            env::var("MEDIA_GROUP_WINDOW_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MEDIA_GROUP_WINDOW_SECS),
        );
        let health_bind =
            env::var("HEALTH_BIND").unwrap_or_else(|_| DEFAULT_HEALTH_BIND.to_string());

        Ok(Self {
            bot_token,
            telegram_api_url,
            log_file,
            database_url,
            session_store,
            media_group_window,
            health_bind,
        })
    }

    /// Validate config (API URL and health address must parse).
    pub fn validate(&self) -> Result<()> {
        if self.bot_token.trim().is_empty() {
            bail!("BOT_TOKEN is empty");
        }
        if let Some(ref url_str) = self.telegram_api_url {
            if reqwest::Url::parse(url_str).is_err() {
                bail!(
                    "TELEGRAM_API_URL (or TELOXIDE_API_URL) is set but not a valid URL: {}",
                    url_str
                );
            }
        }
        self.health_addr()?;
        Ok(())
    }

    pub fn health_addr(&self) -> Result<SocketAddr> {
        self.health_bind
            .parse()
            .with_context(|| format!("HEALTH_BIND is not a socket address: {}", self.health_bind))
    }
}
