//! Session-aware turn execution.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use pathe_core::{ConversationTurn, HistoryEntry, Result, SessionKey, SessionStore};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument};

use crate::event::render_event;
use crate::AgentGateway;

pub type FragmentFuture = Pin<Box<dyn Future<Output = Result<()>> + Send>>;

/// Receives each rendered fragment of the answer, in order. An error stops the turn.
pub type FragmentCallback = Box<dyn FnMut(String) -> FragmentFuture + Send>;

/// Who a turn belongs to. For Telegram both ids are the sender's user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnIdentity {
    pub user_id: String,
    pub session_id: String,
}

impl TurnIdentity {
    pub fn new(user_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            session_id: session_id.into(),
        }
    }

    /// Identity whose session is the user itself.
    pub fn for_user(user_id: impl Into<String>) -> Self {
        let user_id = user_id.into();
        Self {
            session_id: user_id.clone(),
            user_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnSummary {
    /// Fragments handed to the callback.
    pub fragments: usize,
    /// Concatenated answer text, without tool call blocks.
    pub reply: String,
}

pub struct AgentService {
    app_name: String,
    gateway: Arc<dyn AgentGateway>,
    sessions: Arc<dyn SessionStore>,
    history_limit: usize,
}

impl AgentService {
    pub fn new(
        app_name: impl Into<String>,
        gateway: Arc<dyn AgentGateway>,
        sessions: Arc<dyn SessionStore>,
        history_limit: usize,
    ) -> Self {
        Self {
            app_name: app_name.into(),
            gateway,
            sessions,
            history_limit,
        }
    }

    pub fn app_name(&self) -> &str {
        &self.app_name
    }

    pub fn session_key(&self, identity: &TurnIdentity) -> SessionKey {
        SessionKey::new(
            self.app_name.clone(),
            identity.user_id.clone(),
            identity.session_id.clone(),
        )
    }

    /// Runs one turn: ensures the session, replays history, streams the answer through `on_fragment`
    /// and records the exchange. Gateway and store failures propagate.
    #[instrument(skip(self, turn, on_fragment), fields(user_id = %identity.user_id, session_id = %identity.session_id))]
    pub async fn run_turn(
        &self,
        identity: &TurnIdentity,
        turn: ConversationTurn,
        mut on_fragment: FragmentCallback,
    ) -> Result<TurnSummary> {
        let key = self.session_key(identity);
        self.sessions.ensure_session(&key).await?;
        let history = self.sessions.history(&key, self.history_limit).await?;
        debug!(session = %key, history_len = history.len(), "step: history loaded");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let producer = self.gateway.stream_turn(&history, &turn, tx);
        let consumer = async {
            let mut summary = TurnSummary::default();
            while let Some(event) = rx.recv().await {
                let rendered = render_event(&event);
                if rendered.is_empty() {
                    continue;
                }
                if let Some(text) = event.text.as_deref() {
                    summary.reply.push_str(text);
                }
                on_fragment(rendered).await?;
                summary.fragments += 1;
            }
            Ok::<_, pathe_core::PatheError>(summary)
        };

        let (produced, consumed) = tokio::join!(producer, consumer);
        let summary = consumed?;
        produced?;

        self.sessions
            .append_history(&key, HistoryEntry::user(history_text(&turn)))
            .await?;
        if !summary.reply.is_empty() {
            self.sessions
                .append_history(&key, HistoryEntry::model(summary.reply.clone()))
                .await?;
        }

        info!(
            session = %key,
            fragments = summary.fragments,
            "step: turn complete"
        );
        Ok(summary)
    }
}

/// Text remembered for the user's side of a turn. Attachment bytes are not replayed.
fn history_text(turn: &ConversationTurn) -> String {
    match turn.attachments.len() {
        0 => turn.text.clone(),
        n => {
            let note = format!("[{} attachment{}]", n, if n == 1 { "" } else { "s" });
            if turn.text.is_empty() {
                note
            } else {
                format!("{}\n{}", turn.text, note)
            }
        }
    }
}
