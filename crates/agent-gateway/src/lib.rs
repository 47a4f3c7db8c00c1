//! Agent gateway: submits conversation turns to the hosted model and streams its answer back as events.
//!
//! [`AgentGateway`] is the seam; [`GeminiGateway`] talks to the Gemini REST API. [`AgentService`] adds
//! conversation identity on top: it makes sure a session exists, replays its history and records the
//! new exchange.

pub mod config;
pub mod error;
pub mod event;
pub mod gemini;
pub mod service;
pub mod session;
pub mod youtube;

use async_trait::async_trait;
use pathe_core::{ConversationTurn, HistoryEntry};
use tokio::sync::mpsc;

pub use config::{
    AgentConfig, EnvAgentConfig, DEFAULT_APP_NAME, DEFAULT_BASE_URL, DEFAULT_HISTORY_LIMIT,
    DEFAULT_INSTRUCTION, DEFAULT_MODEL,
};
pub use error::GatewayError;
pub use event::{render_event, AgentEvent, FunctionCall, FunctionResponse};
pub use gemini::{GeminiGateway, SseDecoder};
pub use service::{
    AgentService, FragmentCallback, FragmentFuture, TurnIdentity, TurnSummary,
};
pub use session::InMemorySessionStore;
pub use youtube::extract_youtube_links;

/// Channel on which a gateway delivers the events of one answer, in order.
pub type EventSender = mpsc::UnboundedSender<AgentEvent>;

#[async_trait]
pub trait AgentGateway: Send + Sync {
    /// Streams the answer to `turn`, given the earlier `history`, into `events`. Returns once the
    /// answer is complete or the receiver is dropped.
    async fn stream_turn(
        &self,
        history: &[HistoryEntry],
        turn: &ConversationTurn,
        events: EventSender,
    ) -> Result<(), GatewayError>;
}
