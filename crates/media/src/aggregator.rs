//! Media-group debounce.
//!
//! Telegram delivers an album as one message per attachment, all sharing a media group id. The
//! aggregator buffers descriptors per group and dispatches the group once no sibling has arrived for
//! the quiescence window. Every arrival restarts the window. Ungrouped attachments get a group of their
//! own and dispatch immediately.
//!
//! The buffer holds only retrieval handles; bytes are downloaded at dispatch, concurrently, and items
//! whose download fails are dropped from the turn.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use pathe_core::{resolve_caption, ConversationTurn, Message, Result, TurnAttachment};
use tracing::{debug, error, info, instrument, warn};

use crate::descriptor::{MediaDescriptor, MediaFetcher};
use crate::scheduler::Scheduler;

pub const DEFAULT_QUIESCENCE_WINDOW: Duration = Duration::from_secs(3);

/// Receives the outcome of a dispatched group.
#[async_trait]
pub trait TurnSink: Send + Sync {
    /// Called once per group that has at least one downloaded attachment.
    async fn submit_turn(&self, origin: &Message, turn: ConversationTurn) -> Result<()>;

    /// Called when every attachment of a group failed to download.
    async fn media_unavailable(&self, origin: &Message) -> Result<()>;
}

/// Descriptors buffered for one group, ordered by the transport's message order. The group's timer
/// lives in the [`Scheduler`] under the same key.
#[derive(Debug, Clone)]
pub struct PendingGroup {
    pub key: String,
    pub items: Vec<MediaDescriptor>,
    /// Message order of each item, parallel to `items`.
    order: Vec<i64>,
    /// Most recent message of the group; replies are threaded to it.
    pub origin: Message,
}

impl PendingGroup {
    fn new(key: String, origin: &Message) -> Self {
        Self {
            key,
            items: Vec::new(),
            order: Vec::new(),
            origin: origin.clone(),
        }
    }

    /// Inserts after every item that came earlier (or at the same position) in the chat.
    fn insert(&mut self, descriptor: MediaDescriptor, origin: &Message) {
        let position = message_order(origin);
        let index = self.order.partition_point(|&p| p <= position);
        self.items.insert(index, descriptor);
        self.order.insert(index, position);
        if position >= message_order(&self.origin) {
            self.origin = origin.clone();
        }
    }
}

/// Telegram message ids grow within a chat, so they give the arrival order even when handling
/// finishes out of order. Ids that do not parse sort last.
fn message_order(message: &Message) -> i64 {
    message.id.parse().unwrap_or(i64::MAX)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub key: String,
    pub delay: Duration,
    /// Items buffered for the group after this submission.
    pub buffered: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The group was already dispatched (or never existed).
    Missing,
    /// Every download failed; the user was told and the agent was not called.
    Unavailable { dropped: usize },
    Submitted { attachments: usize, dropped: usize },
}

pub struct MediaGroupAggregator {
    groups: Mutex<HashMap<String, PendingGroup>>,
    scheduler: Arc<dyn Scheduler>,
    fetcher: Arc<dyn MediaFetcher>,
    sink: Arc<dyn TurnSink>,
    window: Duration,
}

impl MediaGroupAggregator {
    pub fn new(
        scheduler: Arc<dyn Scheduler>,
        fetcher: Arc<dyn MediaFetcher>,
        sink: Arc<dyn TurnSink>,
    ) -> Self {
        Self {
            groups: Mutex::new(HashMap::new()),
            scheduler,
            fetcher,
            sink,
            window: DEFAULT_QUIESCENCE_WINDOW,
        }
    }

    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Buffer key: the album id when present, otherwise one derived from the message itself.
    /// Both are scoped to the chat.
    pub fn group_key(descriptor: &MediaDescriptor, origin: &Message) -> String {
        match descriptor.group_id() {
            Some(group_id) => format!("group:{}:{}", origin.chat.id, group_id),
            None => format!("single:{}:{}", origin.chat.id, origin.id),
        }
    }

    /// Appends `descriptor` to its group and restarts the group's timer.
    #[instrument(skip(self, descriptor, origin), fields(message_id = %origin.id))]
    pub fn submit(self: &Arc<Self>, descriptor: MediaDescriptor, origin: &Message) -> Submission {
        let key = Self::group_key(&descriptor, origin);
        let delay = if descriptor.group_id().is_some() {
            self.window
        } else {
            Duration::ZERO
        };

        let mut groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
        let group = groups
            .entry(key.clone())
            .or_insert_with(|| PendingGroup::new(key.clone(), origin));
        group.insert(descriptor, origin);
        let buffered = group.items.len();

        // Rescheduling under the buffer lock keeps one live timer per key.
        if self.scheduler.cancel(&key) {
            debug!(group_key = %key, "previous timer cancelled");
        }
        let this = Arc::clone(self);
        let job_key = key.clone();
        self.scheduler.schedule(
            &key,
            delay,
            Box::pin(async move {
                if let Err(e) = this.dispatch(&job_key).await {
                    error!(group_key = %job_key, error = %e, "media group dispatch failed");
                }
            }),
        );
        drop(groups);

        info!(
            group_key = %key,
            buffered,
            delay_ms = delay.as_millis() as u64,
            "step: media buffered"
        );

        Submission {
            key,
            delay,
            buffered,
        }
    }

    /// Removes the group and sends it on. A key that is no longer buffered is a no-op.
    #[instrument(skip(self))]
    pub async fn dispatch(&self, key: &str) -> Result<DispatchOutcome> {
        let group = {
            let mut groups = self.groups.lock().unwrap_or_else(PoisonError::into_inner);
            let group = groups.remove(key);
            // Under the lock so a timer for a newer group with the same key is never touched.
            if group.is_some() {
                self.scheduler.cancel(key);
            }
            group
        };
        let Some(group) = group else {
            debug!(group_key = %key, "group already dispatched");
            return Ok(DispatchOutcome::Missing);
        };

        let PendingGroup { items, origin, .. } = group;
        let text = resolve_caption(items.iter().map(|d| d.caption()));

        let downloads = join_all(items.iter().map(|d| self.fetcher.download(d.handle()))).await;

        let total = items.len();
        let attachments: Vec<TurnAttachment> = items
            .into_iter()
            .zip(downloads)
            .filter_map(|(descriptor, result)| match result {
                Ok(bytes) => Some(TurnAttachment {
                    bytes,
                    content_type: descriptor.content_type().to_string(),
                    file_name: descriptor.file_name().to_string(),
                }),
                Err(e) => {
                    warn!(
                        group_key = %key,
                        file_name = %descriptor.file_name(),
                        error = %e,
                        "attachment download failed, dropping it"
                    );
                    None
                }
            })
            .collect();
        let dropped = total - attachments.len();

        if attachments.is_empty() {
            warn!(group_key = %key, dropped, "no attachment of the group could be retrieved");
            self.sink.media_unavailable(&origin).await?;
            return Ok(DispatchOutcome::Unavailable { dropped });
        }

        let count = attachments.len();
        info!(
            group_key = %key,
            attachments = count,
            dropped,
            has_text = !text.is_empty(),
            "step: media group dispatched"
        );
        self.sink
            .submit_turn(&origin, ConversationTurn::with_attachments(text, attachments))
            .await?;

        Ok(DispatchOutcome::Submitted {
            attachments: count,
            dropped,
        })
    }

    /// Whether a group is buffered and not yet dispatched.
    pub fn is_pending(&self, key: &str) -> bool {
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    pub fn pending_groups(&self) -> usize {
        self.groups
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
