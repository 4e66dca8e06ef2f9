//! Wire types for the xAI REST API and the transport error type

use crate::config::ReasoningEffort;
use crate::domain::types::Usage;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// Chat completions
// ============================================================================

/// Body of `POST /v1/chat/completions`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_parameters: Option<SearchParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<StreamOptions>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            max_tokens: None,
            temperature: None,
            top_p: None,
            reasoning_effort: None,
            search_parameters: None,
            tools: None,
            parallel_tool_calls: None,
            response_format: None,
            user: None,
            stream: false,
            stream_options: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    On,
    Off,
    Auto,
}

/// Live search settings. The result cap is only present when search is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchParameters {
    pub mode: SearchMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_search_results: Option<u32>,
}

impl SearchParameters {
    pub fn on(max_search_results: u32) -> Self {
        Self {
            mode: SearchMode::On,
            max_search_results: Some(max_search_results),
        }
    }

    pub fn off() -> Self {
        Self {
            mode: SearchMode::Off,
            max_search_results: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    pub function: FunctionDefinition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub json_schema: Option<JsonSchemaFormat>,
}

impl ResponseFormat {
    pub fn json_schema(name: impl Into<String>, schema: Value) -> Self {
        Self {
            kind: "json_schema".to_string(),
            json_schema: Some(JsonSchemaFormat {
                name: name.into(),
                schema,
                strict: true,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchemaFormat {
    pub name: String,
    pub schema: Value,
    pub strict: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StreamOptions {
    pub include_usage: bool,
}

/// Response of a non-streamed chat completion
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub index: usize,
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireToolCall {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub function: WireFunctionCall,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireFunctionCall {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

/// One server-sent event of a streamed chat completion
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatCompletionChunk {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub usage: Option<WireUsage>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub index: usize,
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub reasoning_content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ToolCallDelta>>,
}

/// A tool call fragment. xAI sends whole calls, other OpenAI-style servers
/// split names and arguments over several chunks keyed by `index`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ToolCallDelta {
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<FunctionDelta>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FunctionDelta {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct WireUsage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
    #[serde(default)]
    pub total_tokens: u64,
    #[serde(default)]
    pub completion_tokens_details: Option<CompletionTokensDetails>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CompletionTokensDetails {
    #[serde(default)]
    pub reasoning_tokens: Option<u64>,
}

impl From<WireUsage> for Usage {
    fn from(value: WireUsage) -> Self {
        Self {
            prompt_tokens: value.prompt_tokens,
            completion_tokens: value.completion_tokens,
            total_tokens: value.total_tokens,
            reasoning_tokens: value
                .completion_tokens_details
                .and_then(|details| details.reasoning_tokens),
        }
    }
}

// ============================================================================
// Images and models
// ============================================================================

/// Body of `POST /v1/images/generations`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageGenerationRequest {
    pub model: String,
    pub prompt: String,
    pub n: u32,
    pub response_format: String,
}

impl ImageGenerationRequest {
    pub fn base64(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            n: 1,
            response_format: "b64_json".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub data: Vec<ImageData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ImageData {
    #[serde(default)]
    pub b64_json: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

/// Response of `GET /v1/language-models`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LanguageModelList {
    #[serde(default)]
    pub models: Vec<LanguageModel>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageModel {
    pub id: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}

// ============================================================================
// Errors
// ============================================================================

/// Transport and upstream errors
#[derive(Debug, Error)]
pub enum XaiError {
    #[error("xAI rejected the API key (HTTP {status}): {message}")]
    Auth { status: u16, message: String },
    #[error("xAI rate limit reached: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<u64>,
    },
    #[error("xAI returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("network error calling xAI: {source}")]
    Network {
        #[source]
        source: reqwest::Error,
    },
    #[error("xAI returned an invalid response: {reason}")]
    InvalidResponse { reason: String },
}

impl XaiError {
    pub fn network(source: reqwest::Error) -> Self {
        Self::Network { source }
    }

    pub fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse {
            reason: reason.into(),
        }
    }

    /// Classify a non-success HTTP status and its body
    pub fn from_status(status: StatusCode, retry_after: Option<u64>, body: &str) -> Self {
        let message = extract_error_message(body)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").to_string());
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Self::Auth {
                status: status.as_u16(),
                message,
            },
            StatusCode::TOO_MANY_REQUESTS => Self::RateLimited {
                message,
                retry_after,
            },
            _ => Self::Upstream {
                status: status.as_u16(),
                message,
            },
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// User-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            XaiError::Auth { .. } => {
                "The xAI API key was rejected. Check the key in your configuration.".to_string()
            }
            XaiError::RateLimited {
                retry_after: Some(seconds),
                ..
            } => format!("xAI is rate limiting requests. Try again in {seconds} seconds."),
            XaiError::RateLimited { .. } => {
                "xAI is rate limiting requests. Try again later.".to_string()
            }
            XaiError::Upstream { status, message } => match *status {
                502..=504 => "xAI is temporarily unavailable.".to_string(),
                _ => format!("xAI request failed ({status}): {message}"),
            },
            XaiError::Network { source } => {
                if source.is_connect() {
                    "Unable to connect to xAI.".to_string()
                } else if source.is_timeout() {
                    "The request to xAI timed out.".to_string()
                } else {
                    "Network error while talking to xAI.".to_string()
                }
            }
            XaiError::InvalidResponse { .. } => "xAI returned a response that could not be read.".to_string(),
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// Accepts `{"error": "..."}`, `{"error": {"message": "..."}}`,
/// `{"message": "..."}` or plain text.
pub fn extract_error_message(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }
    let Ok(value) = serde_json::from_str::<Value>(body) else {
        return Some(body.to_string());
    };
    let message = match value.get("error") {
        Some(Value::String(message)) => Some(message.clone()),
        Some(Value::Object(error)) => error
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => value.get("message").and_then(Value::as_str).map(str::to_string),
    };
    message.or_else(|| Some(body.to_string()))
}
