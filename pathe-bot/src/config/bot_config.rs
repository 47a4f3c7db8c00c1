//! BotConfig: BaseConfig + agent settings. Use load() for env-based loading.

use agent_gateway::{AgentConfig, EnvAgentConfig};
use anyhow::Result;
use std::time::Duration;

use super::{BaseConfig, SessionStoreKind};

pub struct BotConfig {
    pub base: BaseConfig,
    pub agent: EnvAgentConfig,
}

impl BotConfig {
    /// Load full config from environment variables. If `token` is provided it overrides BOT_TOKEN.
    /// Call validate() after load to check config before init.
    pub fn load(token: Option<String>) -> Result<Self> {
        let base = BaseConfig::load(token)?;
        let agent = EnvAgentConfig::from_env()?;
        Ok(Self { base, agent })
    }

    /// Validate config. Call after load() to fail fast before init.
    pub fn validate(&self) -> Result<()> {
        self.base.validate()?;
        if self.agent.api_key().trim().is_empty() {
            anyhow::bail!("GEMINI_API_KEY is empty");
        }
        Ok(())
    }

    pub fn base(&self) -> &BaseConfig {
        &self.base
    }
    pub fn agent(&self) -> &dyn AgentConfig {
        &self.agent
    }

    pub fn bot_token(&self) -> &str {
        &self.base.bot_token
    }
    pub fn telegram_api_url(&self) -> Option<&str> {
        self.base.telegram_api_url.as_deref()
    }
    pub fn log_file(&self) -> &str {
        &self.base.log_file
    }
    pub fn database_url(&self) -> &str {
        &self.base.database_url
    }
    pub fn session_store(&self) -> SessionStoreKind {
        self.base.session_store
    }
    pub fn media_group_window(&self) -> Duration {
        self.base.media_group_window
    }
}
