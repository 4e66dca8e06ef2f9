//! Message adapters - convert between chat log entries and the xAI wire format

use crate::domain::types::{Content, ToolInput, ToolSpec};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::warn;

use super::types::{FunctionDefinition, ToolDefinition, WireToolCall};

/// Data URIs of image attachments, keyed by attachment path
pub type ImageUrls = HashMap<PathBuf, String>;

/// Adapter for converting messages to and from the xAI chat format
pub struct MessageAdapter;

impl MessageAdapter {
    /// Convert chat log entries to OpenAI-style messages.
    ///
    /// User entries with image attachments become a list of content parts.
    /// Attachments missing from `images` are left out.
    pub fn to_xai_format(messages: &[Content], images: &ImageUrls) -> Vec<Value> {
        messages
            .iter()
            .map(|message| match message {
                Content::System { content } => json!({
                    "role": "system",
                    "content": content
                }),
                Content::User {
                    content,
                    attachments,
                } => {
                    let urls: Vec<&String> = attachments
                        .iter()
                        .filter_map(|attachment| images.get(&attachment.path))
                        .collect();
                    if urls.is_empty() {
                        json!({"role": "user", "content": content})
                    } else {
                        let mut parts = vec![json!({"type": "text", "text": content})];
                        parts.extend(urls.into_iter().map(|url| {
                            json!({
                                "type": "image_url",
                                "image_url": {"url": url, "detail": "auto"}
                            })
                        }));
                        json!({"role": "user", "content": parts})
                    }
                }
                Content::Assistant {
                    content,
                    tool_calls,
                    ..
                } => {
                    let mut object = Map::new();
                    object.insert("role".into(), json!("assistant"));
                    object.insert(
                        "content".into(),
                        content.clone().map(Value::String).unwrap_or(Value::Null),
                    );
                    if !tool_calls.is_empty() {
                        let calls: Vec<Value> = tool_calls
                            .iter()
                            .map(|call| {
                                json!({
                                    "id": call.id,
                                    "type": "function",
                                    "function": {
                                        "name": call.tool_name,
                                        "arguments": call.tool_args.to_string()
                                    }
                                })
                            })
                            .collect();
                        object.insert("tool_calls".into(), Value::Array(calls));
                    }
                    Value::Object(object)
                }
                Content::ToolResult {
                    tool_call_id,
                    result,
                    ..
                } => json!({
                    "role": "tool",
                    "tool_call_id": tool_call_id,
                    "content": result.to_string()
                }),
            })
            .collect()
    }

    pub fn tool_definitions(tools: &[ToolSpec]) -> Vec<ToolDefinition> {
        tools
            .iter()
            .map(|tool| ToolDefinition {
                kind: "function".to_string(),
                function: FunctionDefinition {
                    name: tool.name.clone(),
                    description: tool.description.clone(),
                    parameters: tool.parameters.clone(),
                },
            })
            .collect()
    }

    /// Convert wire tool calls into tool inputs.
    ///
    /// Calls without a name are dropped. Empty arguments become `{}` and
    /// arguments that are not JSON are kept under `raw_arguments`.
    pub fn convert_tool_calls(calls: &[WireToolCall]) -> Vec<ToolInput> {
        calls
            .iter()
            .filter_map(|call| {
                let name = call.function.name.trim();
                if name.is_empty() {
                    warn!("Dropping tool call without a function name");
                    return None;
                }
                let args = parse_arguments(name, &call.function.arguments);
                Some(match call.id.as_deref().filter(|id| !id.is_empty()) {
                    Some(id) => ToolInput::with_id(id, name, args),
                    None => ToolInput::new(name, args),
                })
            })
            .collect()
    }
}

fn parse_arguments(tool_name: &str, raw: &str) -> Value {
    if raw.trim().is_empty() {
        return json!({});
    }
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            warn!(tool = tool_name, %err, "Tool call arguments are not valid JSON");
            json!({"raw_arguments": raw})
        }
    }
}
