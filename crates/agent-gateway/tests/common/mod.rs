//! Shared mocks for agent-gateway integration tests.

use std::sync::{Arc, Mutex};

use agent_gateway::{AgentEvent, AgentGateway, EventSender, GatewayError};
use async_trait::async_trait;
use pathe_core::{ConversationTurn, HistoryEntry};

/// One recorded call to [`MockGateway::stream_turn`].
#[derive(Debug, Clone)]
pub struct GatewayCall {
    pub history: Vec<HistoryEntry>,
    pub turn: ConversationTurn,
}

/// Gateway that replays a scripted answer and records what it was asked.
#[derive(Clone, Default)]
pub struct MockGateway {
    events: Arc<Mutex<Vec<AgentEvent>>>,
    fail_with_status: Arc<Mutex<Option<u16>>>,
    calls: Arc<Mutex<Vec<GatewayCall>>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answering(events: Vec<AgentEvent>) -> Self {
        let gateway = Self::new();
        *gateway.events.lock().unwrap() = events;
        gateway
    }

    /// Sends the scripted events, then fails with an API error of `status`.
    pub fn fail_after_events(&self, status: u16) {
        *self.fail_with_status.lock().unwrap() = Some(status);
    }

    pub fn calls(&self) -> Vec<GatewayCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AgentGateway for MockGateway {
    async fn stream_turn(
        &self,
        history: &[HistoryEntry],
        turn: &ConversationTurn,
        events: EventSender,
    ) -> Result<(), GatewayError> {
        self.calls.lock().unwrap().push(GatewayCall {
            history: history.to_vec(),
            turn: turn.clone(),
        });
        let scripted = self.events.lock().unwrap().clone();
        for event in scripted {
            if events.send(event).is_err() {
                return Ok(());
            }
        }
        match *self.fail_with_status.lock().unwrap() {
            Some(status) => Err(GatewayError::Api {
                status,
                body: "scripted failure".to_string(),
            }),
            None => Ok(()),
        }
    }
}
