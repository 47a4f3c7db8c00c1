//! Mocks for pathe-bot integration tests: recording bot, scripted gateway, in-memory fetcher.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use agent_gateway::{
    AgentEvent, AgentGateway, AgentService, EventSender, GatewayError, InMemorySessionStore,
};
use async_trait::async_trait;
use chrono::Utc;
use pathe_bot::{BotComponents, PatheBot};
use pathe_core::{
    Attachment, Bot, Chat, ConversationTurn, FileRef, HistoryEntry, Message, MessageDirection,
    PatheError, Result, User,
};
use pathe_media::{FileHandle, MediaError, MediaFetcher};
use storage::{MessageRepository, SqlitePoolManager, UserRepository};

pub const USER_ID: i64 = 1001;
pub const CHAT_ID: i64 = 42;

fn base_message(id: &str, message_type: &str, content: &str) -> Message {
    Message {
        id: id.to_string(),
        user: User {
            id: USER_ID,
            username: Some("asha".to_string()),
            first_name: Some("Asha".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: CHAT_ID,
            chat_type: "private".to_string(),
        },
        content: content.to_string(),
        message_type: message_type.to_string(),
        direction: MessageDirection::Incoming,
        created_at: Utc::now(),
        attachment: None,
        caption: None,
        media_group_id: None,
    }
}

pub fn text_message(id: &str, text: &str) -> Message {
    base_message(id, "text", text)
}

pub fn command_message(id: &str, text: &str) -> Message {
    base_message(id, "command", text)
}

pub fn photo_message(id: &str, group: Option<&str>, caption: Option<&str>) -> Message {
    let mut message = base_message(id, "photo", caption.unwrap_or_default());
    message.attachment = Some(Attachment::MultiVariant(vec![
        FileRef::new(format!("{}-small", id)),
        FileRef::new(format!("{}-large", id)),
    ]));
    message.caption = caption.map(str::to_string);
    message.media_group_id = group.map(str::to_string);
    message
}

pub fn document_message(id: &str, mime_type: &str, file_name: &str) -> Message {
    let mut message = base_message(id, "document", "");
    message.attachment = Some(Attachment::Single(
        FileRef::new(format!("{}-doc", id))
            .with_mime_type(mime_type)
            .with_file_name(file_name),
    ));
    message
}

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Reply { to: String, text: String },
    Markup { text: String, reply_to: Option<String> },
}

/// Bot that records every outgoing message.
#[derive(Clone, Default)]
pub struct MockBot {
    sent: Arc<Mutex<Vec<Sent>>>,
    failing_replies: Arc<AtomicBool>,
}

impl MockBot {
    /// Every later `reply_to` fails without recording anything.
    pub fn fail_replies(&self) {
        self.failing_replies.store(true, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn replies(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Reply { text, .. } => Some(text),
                Sent::Markup { .. } => None,
            })
            .collect()
    }

    pub fn markups(&self) -> Vec<(String, Option<String>)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Markup { text, reply_to } => Some((text, reply_to)),
                Sent::Reply { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl Bot for MockBot {
    async fn send_message(&self, _chat: &Chat, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push(Sent::Markup {
            text: text.to_string(),
            reply_to: None,
        });
        Ok(())
    }

    async fn reply_to(&self, message: &Message, text: &str) -> Result<()> {
        if self.failing_replies.load(Ordering::SeqCst) {
            return Err(PatheError::Bot("reply rejected".to_string()));
        }
        self.sent.lock().unwrap().push(Sent::Reply {
            to: message.id.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_markup(
        &self,
        _chat: &Chat,
        text: &str,
        reply_to_message_id: Option<&str>,
    ) -> Result<String> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(Sent::Markup {
            text: text.to_string(),
            reply_to: reply_to_message_id.map(str::to_string),
        });
        Ok(format!("{}", 700 + sent.len()))
    }
}

/// Gateway that answers every turn with the same scripted events and records the turns.
#[derive(Clone, Default)]
pub struct MockGateway {
    events: Arc<Mutex<Vec<AgentEvent>>>,
    fail_with_status: Arc<Mutex<Option<u16>>>,
    turns: Arc<Mutex<Vec<(Vec<HistoryEntry>, ConversationTurn)>>>,
}

impl MockGateway {
    pub fn answering(events: Vec<AgentEvent>) -> Self {
        let gateway = Self::default();
        *gateway.events.lock().unwrap() = events;
        gateway
    }

    pub fn failing(status: u16) -> Self {
        let gateway = Self::default();
        *gateway.fail_with_status.lock().unwrap() = Some(status);
        gateway
    }

    pub fn turns(&self) -> Vec<ConversationTurn> {
        self.turns
            .lock()
            .unwrap()
            .iter()
            .map(|(_, turn)| turn.clone())
            .collect()
    }

    pub fn histories(&self) -> Vec<Vec<HistoryEntry>> {
        self.turns
            .lock()
            .unwrap()
            .iter()
            .map(|(history, _)| history.clone())
            .collect()
    }
}

#[async_trait]
impl AgentGateway for MockGateway {
    async fn stream_turn(
        &self,
        history: &[HistoryEntry],
        turn: &ConversationTurn,
        events: EventSender,
    ) -> std::result::Result<(), GatewayError> {
        self.turns
            .lock()
            .unwrap()
            .push((history.to_vec(), turn.clone()));
        if let Some(status) = *self.fail_with_status.lock().unwrap() {
            return Err(GatewayError::Api {
                status,
                body: "scripted failure".to_string(),
            });
        }
        let scripted = self.events.lock().unwrap().clone();
        for event in scripted {
            if events.send(event).is_err() {
                break;
            }
        }
        Ok(())
    }
}

/// Resolves every file id to `photos/<id>.jpg` and downloads the id as bytes.
#[derive(Default)]
pub struct MockFetcher {
    failing_downloads: Mutex<HashSet<String>>,
    resolve_delays: Mutex<HashMap<String, Duration>>,
}

impl MockFetcher {
    /// Holds `resolve` of `file_id` for `delay` before answering.
    pub fn delay_resolve(&self, file_id: &str, delay: Duration) {
        self.resolve_delays
            .lock()
            .unwrap()
            .insert(file_id.to_string(), delay);
    }

    pub fn fail_download(&self, file_id: &str) {
        self.failing_downloads
            .lock()
            .unwrap()
            .insert(file_id.to_string());
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn resolve(&self, file_id: &str) -> std::result::Result<FileHandle, MediaError> {
        let delay = self.resolve_delays.lock().unwrap().get(file_id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(FileHandle {
            file_id: file_id.to_string(),
            file_path: format!("photos/{}.jpg", file_id),
        })
    }

    async fn download(&self, handle: &FileHandle) -> std::result::Result<Vec<u8>, MediaError> {
        if self
            .failing_downloads
            .lock()
            .unwrap()
            .contains(&handle.file_id)
        {
            return Err(MediaError::Download {
                file_path: handle.file_path.clone(),
                reason: "expired".to_string(),
            });
        }
        Ok(handle.file_id.clone().into_bytes())
    }
}

pub const TEST_WINDOW: Duration = Duration::from_millis(300);

pub struct Harness {
    pub app: PatheBot,
    pub bot: MockBot,
    pub gateway: MockGateway,
    pub fetcher: Arc<MockFetcher>,
    pub messages: MessageRepository,
}

/// Full handler chain over an in-memory database, with the given gateway.
pub async fn harness(gateway: MockGateway) -> Harness {
    let pool = SqlitePoolManager::new("sqlite::memory:").await.unwrap();
    let users = UserRepository::from_pool(pool.clone());
    let messages = MessageRepository::from_pool(pool);
    let bot = MockBot::default();
    let fetcher = Arc::new(MockFetcher::default());
    let agent = Arc::new(AgentService::new(
        "KyaHuaPathe",
        Arc::new(gateway.clone()),
        Arc::new(InMemorySessionStore::new()),
        50,
    ));

    let components = BotComponents {
        bot: Arc::new(bot.clone()),
        fetcher: fetcher.clone(),
        users,
        messages: messages.clone(),
        agent,
        media_window: TEST_WINDOW,
    };

    Harness {
        app: PatheBot::from_components(components),
        bot,
        gateway,
        fetcher,
        messages,
    }
}

/// Polls `check` until it holds or two seconds pass.
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
