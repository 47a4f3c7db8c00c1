//! Gemini `streamGenerateContent` gateway.
//!
//! Text deltas are accumulated and sent as one event when the model switches to a function call and
//! at the end of the stream, so each event is a complete message for the chat.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::StreamExt;
use pathe_core::{ConversationTurn, HistoryEntry, HistoryRole};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::{AgentConfig, DEFAULT_BASE_URL};
use crate::error::GatewayError;
use crate::event::{AgentEvent, FunctionCall, FunctionResponse};
use crate::youtube::extract_youtube_links;
use crate::{AgentGateway, EventSender};

// ── Request ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<serde_json::Value>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    pub parts: Vec<Part>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_data: Option<FileData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub file_uri: String,
}

// ── Response ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StreamChunk {
    #[serde(default)]
    candidates: Vec<Candidate>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
    function_call: Option<FunctionCallPart>,
    function_response: Option<FunctionResponsePart>,
}

#[derive(Debug, Deserialize)]
struct FunctionCallPart {
    name: String,
    #[serde(default)]
    args: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct FunctionResponsePart {
    name: Option<String>,
    #[serde(default)]
    response: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: u16,
    #[serde(default)]
    message: String,
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string())
}

// ── SSE framing ─────────────────────────────────────────────────────────────

/// Splits a `text/event-stream` body into `data:` payloads. Works on bytes so multi-byte characters
/// split across network chunks stay intact.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
}

impl SseDecoder {
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);
        let mut payloads = Vec::new();
        while let Some((end, sep_len)) = find_event_end(&self.buf) {
            let block: Vec<u8> = self.buf.drain(..end + sep_len).take(end).collect();
            payloads.extend(data_lines(&String::from_utf8_lossy(&block)));
        }
        payloads
    }

    /// Payloads of a trailing event without the final blank line.
    pub fn finish(&mut self) -> Vec<String> {
        let block = std::mem::take(&mut self.buf);
        data_lines(&String::from_utf8_lossy(&block))
    }
}

fn find_event_end(buf: &[u8]) -> Option<(usize, usize)> {
    let lf = buf.windows(2).position(|w| w == b"\n\n").map(|p| (p, 2));
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| (p, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn data_lines(block: &str) -> Vec<String> {
    let data: Vec<&str> = block
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();
    if data.is_empty() {
        Vec::new()
    } else {
        vec![data.join("\n")]
    }
}

// ── Gateway ─────────────────────────────────────────────────────────────────

pub struct GeminiGateway {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    instruction: Option<String>,
    google_search: bool,
    url_context: bool,
    google_maps: bool,
}

impl GeminiGateway {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            instruction: None,
            google_search: false,
            url_context: false,
            google_maps: false,
        }
    }

    pub fn from_config(config: &dyn AgentConfig) -> Self {
        Self::new(config.api_key(), config.model())
            .with_base_url(config.base_url())
            .with_instruction(config.instruction())
            .with_google_search(config.google_search())
            .with_url_context(config.url_context())
            .with_google_maps(config.google_maps())
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = Some(instruction.into()).filter(|s: &String| !s.trim().is_empty());
        self
    }

    pub fn with_google_search(mut self, enabled: bool) -> Self {
        self.google_search = enabled;
        self
    }

    pub fn with_url_context(mut self, enabled: bool) -> Self {
        self.url_context = enabled;
        self
    }

    pub fn with_google_maps(mut self, enabled: bool) -> Self {
        self.google_maps = enabled;
        self
    }

    /// Built-in tools, one entry each, in a fixed order.
    fn tools(&self) -> Vec<serde_json::Value> {
        [
            (self.google_search, "googleSearch"),
            (self.url_context, "urlContext"),
            (self.google_maps, "googleMaps"),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, name)| {
            let mut tool = serde_json::Map::new();
            tool.insert(name.to_string(), serde_json::json!({}));
            serde_json::Value::Object(tool)
        })
        .collect()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn build_request(
        &self,
        history: &[HistoryEntry],
        turn: &ConversationTurn,
    ) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .filter(|entry| !entry.text.is_empty())
            .map(|entry| Content {
                role: Some(
                    match entry.role {
                        HistoryRole::User => "user",
                        HistoryRole::Model => "model",
                    }
                    .to_string(),
                ),
                parts: vec![Part::text(entry.text.clone())],
            })
            .collect();

        let mut parts = Vec::new();
        if !turn.text.is_empty() {
            parts.push(Part::text(turn.text.clone()));
        }
        for attachment in &turn.attachments {
            parts.push(Part {
                inline_data: Some(InlineData {
                    mime_type: attachment.content_type.clone(),
                    data: STANDARD.encode(&attachment.bytes),
                }),
                ..Part::default()
            });
        }
        for link in extract_youtube_links(&turn.text) {
            parts.push(Part {
                file_data: Some(FileData { file_uri: link }),
                ..Part::default()
            });
        }
        contents.push(Content {
            role: Some("user".to_string()),
            parts,
        });

        GenerateContentRequest {
            contents,
            system_instruction: self.instruction.as_ref().map(|text| Content {
                role: None,
                parts: vec![Part::text(text.clone())],
            }),
            tools: self.tools(),
        }
    }

    fn stream_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.model
        )
    }
}

/// Collects text deltas until something else needs to be emitted.
#[derive(Default)]
struct PendingText(String);

impl PendingText {
    /// Sends buffered text as one event. Returns false when the receiver is gone.
    fn flush(&mut self, events: &EventSender) -> bool {
        if self.0.is_empty() {
            return true;
        }
        let text = std::mem::take(&mut self.0);
        events.send(AgentEvent::text(text)).is_ok()
    }
}

/// Applies one SSE payload. Returns false when the receiver is gone.
fn apply_chunk(
    data: &str,
    pending: &mut PendingText,
    events: &EventSender,
) -> Result<bool, GatewayError> {
    let chunk: StreamChunk =
        serde_json::from_str(data).map_err(|e| GatewayError::Decode(e.to_string()))?;
    if let Some(error) = chunk.error {
        return Err(GatewayError::Api {
            status: error.code,
            body: error.message,
        });
    }

    let parts = chunk
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts)
        .unwrap_or_default();

    for part in parts {
        if part.thought {
            continue;
        }
        if let Some(text) = part.text {
            pending.0.push_str(&text);
        }
        if let Some(call) = part.function_call {
            if !pending.flush(events) {
                return Ok(false);
            }
            let event = AgentEvent {
                function_calls: vec![FunctionCall {
                    name: call.name,
                    args: call.args,
                }],
                ..AgentEvent::default()
            };
            if events.send(event).is_err() {
                return Ok(false);
            }
        }
        if let Some(response) = part.function_response {
            if !pending.flush(events) {
                return Ok(false);
            }
            let event = AgentEvent {
                function_responses: vec![FunctionResponse {
                    name: response.name,
                    response: response.response,
                }],
                ..AgentEvent::default()
            };
            if events.send(event).is_err() {
                return Ok(false);
            }
        }
    }
    Ok(true)
}

#[async_trait]
impl AgentGateway for GeminiGateway {
    #[instrument(skip(self, history, turn, events), fields(model = %self.model))]
    async fn stream_turn(
        &self,
        history: &[HistoryEntry],
        turn: &ConversationTurn,
        events: EventSender,
    ) -> Result<(), GatewayError> {
        if self.api_key.trim().is_empty() {
            return Err(GatewayError::Config("API key is empty".to_string()));
        }
        let body = self.build_request(history, turn);
        debug!(
            history_len = history.len(),
            attachments = turn.attachments.len(),
            text_len = turn.text.len(),
            "gemini stream request"
        );

        let resp = self
            .client
            .post(self.stream_url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            warn!(status = %status, "gemini API error");
            return Err(GatewayError::Api {
                status: status.as_u16(),
                body: api_error_message(&body_text),
            });
        }

        let mut byte_stream = resp.bytes_stream();
        let mut decoder = SseDecoder::default();
        let mut pending = PendingText::default();

        while let Some(chunk) = byte_stream.next().await {
            let chunk = chunk?;
            for data in decoder.push(&chunk) {
                if !apply_chunk(&data, &mut pending, &events)? {
                    debug!("event receiver dropped, stopping stream");
                    return Ok(());
                }
            }
        }
        for data in decoder.finish() {
            if !apply_chunk(&data, &mut pending, &events)? {
                return Ok(());
            }
        }
        pending.flush(&events);
        Ok(())
    }
}
