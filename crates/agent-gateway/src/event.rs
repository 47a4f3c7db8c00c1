//! Agent events and their rendering into chat fragments.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    pub args: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionResponse {
    pub name: Option<String>,
    pub response: Value,
}

/// One step of the agent's answer: some text, tool calls it made, tool results it received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentEvent {
    pub text: Option<String>,
    pub function_calls: Vec<FunctionCall>,
    pub function_responses: Vec<FunctionResponse>,
}

impl AgentEvent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

const BLOCK_SEPARATOR: &str = "\n---\n";

fn value_to_line(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_call(call: &FunctionCall) -> String {
    let mut block = format!("**{}**", call.name);
    let mut args: Vec<(&String, &Value)> = call.args.iter().collect();
    args.sort_by(|a, b| a.0.cmp(b.0));
    for (key, value) in args {
        block.push_str(&format!("\n{}: {}", key, value_to_line(value)));
    }
    block
}

fn render_response(response: &FunctionResponse) -> String {
    let name = response.name.as_deref().unwrap_or("No name");
    let result = match response.response.get("result") {
        Some(Value::Null) | None => "N/A".to_string(),
        Some(result) => value_to_line(result),
    };
    format!("**{}**\n{}", name, result)
}

/// Renders an event as markdown: the text, then one block per call and per response. Empty when the
/// event carries nothing to show.
pub fn render_event(event: &AgentEvent) -> String {
    let mut blocks: Vec<String> = Vec::new();
    if let Some(text) = event.text.as_deref().filter(|t| !t.trim().is_empty()) {
        blocks.push(text.to_string());
    }
    blocks.extend(event.function_calls.iter().map(render_call));
    blocks.extend(event.function_responses.iter().map(render_response));
    blocks.join(BLOCK_SEPARATOR)
}
