//! Test doubles for the media pipeline: in-memory fetcher, recording sink, manual scheduler.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use pathe_core::{Attachment, Chat, FileRef, Message, MessageDirection, User};
use pathe_media::{
    ConversationTurn, FileHandle, Job, MediaDescriptor, MediaError, MediaFetcher, Scheduler,
    TurnSink,
};
use tokio::sync::mpsc;

pub fn message(id: &str, group: Option<&str>, caption: Option<&str>) -> Message {
    Message {
        id: id.to_string(),
        user: User {
            id: 55555,
            username: Some("pathe".to_string()),
            first_name: Some("Pathe".to_string()),
            last_name: None,
        },
        chat: Chat {
            id: 900,
            chat_type: "private".to_string(),
        },
        content: caption.unwrap_or_default().to_string(),
        message_type: "photo".to_string(),
        direction: MessageDirection::Incoming,
        created_at: Utc::now(),
        attachment: Some(Attachment::MultiVariant(vec![
            FileRef::new(format!("{}-small", id)),
            FileRef::new(format!("{}-large", id)),
        ])),
        caption: caption.map(str::to_string),
        media_group_id: group.map(str::to_string),
    }
}

pub fn descriptor(file_id: &str, group: Option<&str>, caption: Option<&str>) -> MediaDescriptor {
    MediaDescriptor::new(
        "image/jpeg",
        format!("{}.jpg", file_id),
        FileHandle {
            file_id: file_id.to_string(),
            file_path: format!("photos/{}.jpg", file_id),
        },
    )
    .with_caption(caption.map(str::to_string))
    .with_group_id(group.map(str::to_string))
}

/// Resolves every id to `photos/<id>.jpg` (unless told otherwise) and downloads `<id>` as bytes.
#[derive(Default)]
pub struct MockFetcher {
    failing_downloads: Mutex<HashSet<String>>,
    failing_resolves: Mutex<HashSet<String>>,
    paths: Mutex<HashMap<String, String>>,
    pub resolved: Mutex<Vec<String>>,
    pub downloaded: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_download(&self, file_id: &str) {
        self.failing_downloads
            .lock()
            .unwrap()
            .insert(file_id.to_string());
    }

    pub fn fail_resolve(&self, file_id: &str) {
        self.failing_resolves
            .lock()
            .unwrap()
            .insert(file_id.to_string());
    }

    pub fn set_path(&self, file_id: &str, path: &str) {
        self.paths
            .lock()
            .unwrap()
            .insert(file_id.to_string(), path.to_string());
    }
}

#[async_trait]
impl MediaFetcher for MockFetcher {
    async fn resolve(&self, file_id: &str) -> Result<FileHandle, MediaError> {
        self.resolved.lock().unwrap().push(file_id.to_string());
        if self.failing_resolves.lock().unwrap().contains(file_id) {
            return Err(MediaError::Resolve {
                file_id: file_id.to_string(),
                reason: "network down".to_string(),
            });
        }
        let file_path = self
            .paths
            .lock()
            .unwrap()
            .get(file_id)
            .cloned()
            .unwrap_or_else(|| format!("photos/{}.jpg", file_id));
        Ok(FileHandle {
            file_id: file_id.to_string(),
            file_path,
        })
    }

    async fn download(&self, handle: &FileHandle) -> Result<Vec<u8>, MediaError> {
        self.downloaded.lock().unwrap().push(handle.file_id.clone());
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

#[derive(Debug)]
pub enum SinkEvent {
    Turn { origin_id: String, turn: ConversationTurn },
    Unavailable { origin_id: String },
}

pub struct RecordingSink {
    tx: mpsc::UnboundedSender<SinkEvent>,
}

impl RecordingSink {
    pub fn with_receiver() -> (Arc<Self>, mpsc::UnboundedReceiver<SinkEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Arc::new(Self { tx }), rx)
    }
}

#[async_trait]
impl TurnSink for RecordingSink {
    async fn submit_turn(&self, origin: &Message, turn: ConversationTurn) -> pathe_core::Result<()> {
        let _ = self.tx.send(SinkEvent::Turn {
            origin_id: origin.id.clone(),
            turn,
        });
        Ok(())
    }

    async fn media_unavailable(&self, origin: &Message) -> pathe_core::Result<()> {
        let _ = self.tx.send(SinkEvent::Unavailable {
            origin_id: origin.id.clone(),
        });
        Ok(())
    }
}

/// Scheduler driven by the test: jobs run only when `fire` is called.
#[derive(Default)]
pub struct ManualScheduler {
    jobs: Mutex<HashMap<String, (Duration, Job)>>,
    pub scheduled: Mutex<Vec<(String, Duration)>>,
    pub cancelled: Mutex<Vec<String>>,
}

impl ManualScheduler {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pending_delay(&self, key: &str) -> Option<Duration> {
        self.jobs.lock().unwrap().get(key).map(|(delay, _)| *delay)
    }

    pub fn pending_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.jobs.lock().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Runs the pending job for `key`, if any. Returns whether a job ran.
    pub async fn fire(&self, key: &str) -> bool {
        let job = self.jobs.lock().unwrap().remove(key);
        match job {
            Some((_, job)) => {
                job.await;
                true
            }
            None => false,
        }
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, key: &str, delay: Duration, job: Job) {
        self.scheduled
            .lock()
            .unwrap()
            .push((key.to_string(), delay));
        self.jobs
            .lock()
            .unwrap()
            .insert(key.to_string(), (delay, job));
    }

    fn cancel(&self, key: &str) -> bool {
        let removed = self.jobs.lock().unwrap().remove(key).is_some();
        if removed {
            self.cancelled.lock().unwrap().push(key.to_string());
        }
        removed
    }
}
