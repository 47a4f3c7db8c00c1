//! Process-local conversation store. Sessions are lost on restart.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use pathe_core::{HistoryEntry, Result, Session, SessionKey, SessionStore};

struct SessionState {
    session: Session,
    history: Vec<HistoryEntry>,
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<SessionKey, SessionState>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_session(&self, key: &SessionKey) -> Result<Option<Session>> {
        Ok(self.sessions.get(key).map(|state| state.session.clone()))
    }

    async fn create_session(&self, key: &SessionKey) -> Result<Session> {
        let state = self.sessions.entry(key.clone()).or_insert_with(|| SessionState {
            session: Session {
                key: key.clone(),
                created_at: Utc::now(),
            },
            history: Vec::new(),
        });
        Ok(state.session.clone())
    }

    async fn append_history(&self, key: &SessionKey, entry: HistoryEntry) -> Result<()> {
        self.create_session(key).await?;
        if let Some(mut state) = self.sessions.get_mut(key) {
            state.history.push(entry);
        }
        Ok(())
    }

    async fn history(&self, key: &SessionKey, limit: usize) -> Result<Vec<HistoryEntry>> {
        Ok(self
            .sessions
            .get(key)
            .map(|state| {
                let skip = state.history.len().saturating_sub(limit);
                state.history[skip..].to_vec()
            })
            .unwrap_or_default())
    }
}
