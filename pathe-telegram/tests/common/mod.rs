//! Shared fixtures for pathe-telegram integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use pathe_core::{Bot, Chat, Message, PatheError, Result};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Builds a teloxide message from Bot API JSON, with the given extra fields merged in.
pub fn telegram_message(extra: Value) -> teloxide::types::Message {
    let mut base = json!({
        "message_id": 10,
        "date": 1,
        "chat": { "id": 42, "type": "private", "first_name": "Asha" },
        "from": { "id": 1001, "is_bot": false, "first_name": "Asha", "username": "asha" }
    });
    if let (Some(base), Value::Object(extra)) = (base.as_object_mut(), extra) {
        base.extend(extra);
    }
    serde_json::from_value(base).expect("valid telegram message")
}

pub fn chat() -> Chat {
    Chat {
        id: 42,
        chat_type: "private".to_string(),
    }
}

/// One recorded send.
#[derive(Debug, Clone, PartialEq)]
pub struct SentMarkup {
    pub text: String,
    pub reply_to: Option<String>,
}

/// Bot that records markup sends and can fail threaded ones.
#[derive(Clone, Default)]
pub struct RecordingBot {
    pub sent: Arc<Mutex<Vec<SentMarkup>>>,
    pub fail_threaded: Arc<Mutex<bool>>,
    pub fail_all: Arc<Mutex<bool>>,
}

impl RecordingBot {
    pub fn sent(&self) -> Vec<SentMarkup> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Bot for RecordingBot {
    async fn send_message(&self, _chat: &Chat, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn reply_to(&self, _message: &Message, _text: &str) -> Result<()> {
        Ok(())
    }

    async fn send_markup(
        &self,
        _chat: &Chat,
        text: &str,
        reply_to_message_id: Option<&str>,
    ) -> Result<String> {
        if *self.fail_all.lock().unwrap()
            || (reply_to_message_id.is_some() && *self.fail_threaded.lock().unwrap())
        {
            return Err(PatheError::Bot("message to reply not found".to_string()));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(SentMarkup {
            text: text.to_string(),
            reply_to: reply_to_message_id.map(str::to_string),
        });
        Ok(format!("{}", 100 + sent.len()))
    }
}

/// A request seen by [`MockTelegramApi`].
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub path: String,
    pub body: Value,
}

/// Minimal Bot API: sendMessage (rejecting MarkdownV2 when told to), getFile and file download.
#[derive(Clone, Default)]
pub struct MockTelegramApi {
    pub requests: Arc<Mutex<Vec<ApiRequest>>>,
    pub reject_markdown: Arc<Mutex<bool>>,
}

async fn telegram_api(State(api): State<MockTelegramApi>, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().to_string();
    if path.starts_with("/file/") {
        return b"file-bytes".to_vec().into_response();
    }

    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    api.requests.lock().unwrap().push(ApiRequest {
        path: path.clone(),
        body: body.clone(),
    });

    let method = path.rsplit('/').next().unwrap_or_default().to_ascii_lowercase();
    match method.as_str() {
        "sendmessage" => {
            if body.get("parse_mode").is_some() && *api.reject_markdown.lock().unwrap() {
                return Json(json!({
                    "ok": false,
                    "error_code": 400,
                    "description": "Bad Request: can't parse entities: Character '.' is reserved"
                }))
                .into_response();
            }
            let count = api.requests.lock().unwrap().len();
            Json(json!({
                "ok": true,
                "result": {
                    "message_id": 500 + count,
                    "date": 1,
                    "chat": { "id": body["chat_id"], "type": "private", "first_name": "Asha" },
                    "text": body["text"]
                }
            }))
            .into_response()
        }
        "getfile" => Json(json!({
            "ok": true,
            "result": {
                "file_id": body["file_id"],
                "file_unique_id": "unique",
                "file_size": 10,
                "file_path": "photos/file_7.jpg"
            }
        }))
        .into_response(),
        _ => Json(json!({ "ok": false, "error_code": 404, "description": "Not Found" }))
            .into_response(),
    }
}

/// Serves the mock API on a free local port. Dropping the returned sender stops it.
pub async fn serve_mock_api(api: MockTelegramApi) -> (teloxide::Bot, oneshot::Sender<()>) {
    let app = Router::new().fallback(telegram_api).with_state(api);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind test listener");
    let addr = listener.local_addr().expect("local addr");
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .expect("serve mock telegram api");
    });

    let url = reqwest::Url::parse(&format!("http://{}/", addr)).expect("parse api url");
    (teloxide::Bot::new("test-token").set_api_url(url), shutdown_tx)
}
