//! Agent configuration: trait and env-based implementation.

use anyhow::{Context, Result};
use std::env;

pub const DEFAULT_APP_NAME: &str = "KyaHuaPathe";
pub const DEFAULT_MODEL: &str = "gemini-3-pro-preview";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_INSTRUCTION: &str = "You are atom, my always on personal assistant.";
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

pub trait AgentConfig: Send + Sync {
    fn app_name(&self) -> &str;
    fn api_key(&self) -> &str;
    fn model(&self) -> &str;
    fn base_url(&self) -> &str;
    fn instruction(&self) -> &str;
    fn google_search(&self) -> bool;
    fn url_context(&self) -> bool;
    fn google_maps(&self) -> bool;
    fn history_limit(&self) -> usize;
}

/// Agent config loaded from environment variables.
#[derive(Debug, Clone)]
pub struct EnvAgentConfig {
    pub app_name: String,
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub agent_instruction: String,
    pub agent_google_search: bool,
    pub agent_url_context: bool,
    pub agent_google_maps: bool,
    pub agent_history_limit: usize,
}

impl AgentConfig for EnvAgentConfig {
    fn app_name(&self) -> &str {
        &self.app_name
    }
    fn api_key(&self) -> &str {
        &self.gemini_api_key
    }
    fn model(&self) -> &str {
        &self.gemini_model
    }
    fn base_url(&self) -> &str {
        &self.gemini_base_url
    }
    fn instruction(&self) -> &str {
        &self.agent_instruction
    }
    fn google_search(&self) -> bool {
        self.agent_google_search
    }
    fn url_context(&self) -> bool {
        self.agent_url_context
    }
    fn google_maps(&self) -> bool {
        self.agent_google_maps
    }
    fn history_limit(&self) -> usize {
        self.agent_history_limit
    }
}

impl EnvAgentConfig {
    /// Load from environment variables. GEMINI_API_KEY (or GOOGLE_API_KEY) is required.
    pub fn from_env() -> Result<Self> {
        let gemini_api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("GOOGLE_API_KEY"))
            .context("GEMINI_API_KEY (or GOOGLE_API_KEY) not set")?;
        let app_name = env::var("APP_NAME").unwrap_or_else(|_| DEFAULT_APP_NAME.to_string());
        let gemini_model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        let gemini_base_url = env::var("GEMINI_BASE_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let agent_instruction = env::var("AGENT_INSTRUCTION")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string());
        let agent_google_search = env_flag("AGENT_GOOGLE_SEARCH");
        let agent_url_context = env_flag("AGENT_URL_CONTEXT");
        let agent_google_maps = env_flag("AGENT_GOOGLE_MAPS");
        let agent_history_limit = env::var("AGENT_HISTORY_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HISTORY_LIMIT);
        Ok(Self {
            app_name,
            gemini_api_key,
            gemini_model,
            gemini_base_url,
            agent_instruction,
            agent_google_search,
            agent_url_context,
            agent_google_maps,
            agent_history_limit,
        })
    }
}

/// Tool switches are on unless set to something that parses as `false`.
fn env_flag(name: &str) -> bool {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_agent_env() {
        for var in [
            "GEMINI_API_KEY",
            "GOOGLE_API_KEY",
            "APP_NAME",
            "GEMINI_MODEL",
            "GEMINI_BASE_URL",
            "AGENT_INSTRUCTION",
            "AGENT_GOOGLE_SEARCH",
            "AGENT_URL_CONTEXT",
            "AGENT_GOOGLE_MAPS",
            "AGENT_HISTORY_LIMIT",
        ] {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_from_env_defaults() {
        clear_agent_env();
        env::set_var("GEMINI_API_KEY", "key");

        let config = EnvAgentConfig::from_env().unwrap();

        assert_eq!(config.api_key(), "key");
        assert_eq!(config.app_name(), "KyaHuaPathe");
        assert_eq!(config.model(), "gemini-3-pro-preview");
        assert_eq!(config.base_url(), DEFAULT_BASE_URL);
        assert_eq!(config.instruction(), DEFAULT_INSTRUCTION);
        assert!(config.google_search());
        assert!(config.url_context());
        assert!(config.google_maps());
        assert_eq!(config.history_limit(), 50);
        clear_agent_env();
    }

    #[test]
    #[serial]
    fn test_from_env_custom_values() {
        clear_agent_env();
        env::set_var("GOOGLE_API_KEY", "google-key");
        env::set_var("GEMINI_MODEL", "gemini-2.5-pro");
        env::set_var("GEMINI_BASE_URL", "http://localhost:9999/");
        env::set_var("AGENT_GOOGLE_SEARCH", "false");
        env::set_var("AGENT_GOOGLE_MAPS", "false");
        env::set_var("AGENT_URL_CONTEXT", "not-a-bool");
        env::set_var("AGENT_HISTORY_LIMIT", "10");

        let config = EnvAgentConfig::from_env().unwrap();

        assert_eq!(config.api_key(), "google-key");
        assert_eq!(config.model(), "gemini-2.5-pro");
        assert_eq!(config.base_url(), "http://localhost:9999");
        assert!(!config.google_search());
        assert!(!config.google_maps());
        assert!(config.url_context());
        assert_eq!(config.history_limit(), 10);
        clear_agent_env();
    }

    #[test]
    #[serial]
    fn test_from_env_requires_key() {
        clear_agent_env();
        assert!(EnvAgentConfig::from_env().is_err());
    }
}
