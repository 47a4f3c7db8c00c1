//! Conversation store contract: sessions keyed by (app name, user id, session id) plus the turn history
//! replayed to the agent.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionKey {
    pub app_name: String,
    pub user_id: String,
    pub session_id: String,
}

impl SessionKey {
    pub fn new(
        app_name: impl Into<String>,
        user_id: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.app_name, self.user_id, self.session_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub key: SessionKey,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HistoryRole {
    User,
    Model,
}

impl HistoryRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryRole::User => "user",
            HistoryRole::Model => "model",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "user" => Some(HistoryRole::User),
            "model" => Some(HistoryRole::Model),
            _ => None,
        }
    }
}

/// One remembered turn of a session. Attachments are not kept, only text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub text: String,
}

impl HistoryEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: HistoryRole::Model,
            text: text.into(),
        }
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>>;

    async fn create_session(&self, key: &SessionKey) -> Result<Session>;

    /// Returns the existing session or creates it. Calling it twice yields the same session.
    async fn ensure_session(&self, key: &SessionKey) -> Result<Session> {
        match self.get_session(key).await? {
            Some(session) => Ok(session),
            None => self.create_session(key).await,
        }
    }

    async fn append_history(&self, key: &SessionKey, entry: HistoryEntry) -> Result<()>;

    /// Most recent `limit` entries, oldest first.
    async fn history(&self, key: &SessionKey, limit: usize) -> Result<Vec<HistoryEntry>>;
}
