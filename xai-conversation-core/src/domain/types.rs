use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

/// A file handed over together with a user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub path: PathBuf,
    pub mime_type: String,
}

impl Attachment {
    pub fn new(path: impl Into<PathBuf>, mime_type: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Build an attachment, guessing the MIME type from the file extension.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mime_type = guess_mime_type(&path).to_string();
        Self { path, mime_type }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

fn guess_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("txt") => "text/plain",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInput {
    pub id: String,
    pub tool_name: String,
    pub tool_args: Value,
}

impl ToolInput {
    /// Tool call with a freshly generated id
    pub fn new(tool_name: impl Into<String>, tool_args: Value) -> Self {
        Self::with_id(Uuid::new_v4().to_string(), tool_name, tool_args)
    }

    pub fn with_id(id: impl Into<String>, tool_name: impl Into<String>, tool_args: Value) -> Self {
        Self {
            id: id.into(),
            tool_name: tool_name.into(),
            tool_args,
        }
    }
}

/// A tool the model may call. `parameters` is a JSON schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Value,
}

/// One entry of a chat log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Content {
    System {
        content: String,
    },
    User {
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attachments: Vec<Attachment>,
    },
    Assistant {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        thinking: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolInput>,
    },
    ToolResult {
        tool_call_id: String,
        tool_name: String,
        result: Value,
    },
}

impl Content {
    pub fn system(content: impl Into<String>) -> Self {
        Content::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Content::User {
            content: content.into(),
            attachments: Vec::new(),
        }
    }

    pub fn user_with_attachments(content: impl Into<String>, attachments: Vec<Attachment>) -> Self {
        Content::User {
            content: content.into(),
            attachments,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Content::Assistant {
            content: Some(content.into()),
            thinking: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn role(&self) -> MessageRole {
        match self {
            Content::System { .. } => MessageRole::System,
            Content::User { .. } => MessageRole::User,
            Content::Assistant { .. } => MessageRole::Assistant,
            Content::ToolResult { .. } => MessageRole::Tool,
        }
    }

    /// Attachments carried by a user entry
    pub fn attachments(&self) -> &[Attachment] {
        match self {
            Content::User { attachments, .. } => attachments,
            _ => &[],
        }
    }
}

/// Token accounting reported by the API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u64>,
}

impl Usage {
    pub fn accumulate(&mut self, other: &Usage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
        if let Some(reasoning) = other.reasoning_tokens {
            *self.reasoning_tokens.get_or_insert(0) += reasoning;
        }
    }
}

/// Ordered history of one conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatLog {
    pub conversation_id: String,
    pub content: Vec<Content>,
    #[serde(default)]
    pub usage: Usage,
}

impl ChatLog {
    /// Chat log for `conversation_id`, or for a new conversation when `None`
    pub fn new(conversation_id: Option<String>) -> Self {
        Self {
            conversation_id: conversation_id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            content: Vec::new(),
            usage: Usage::default(),
        }
    }

    /// Put `prompt` at the head of the log, replacing an earlier system entry.
    pub fn set_system_prompt(&mut self, prompt: impl Into<String>) {
        let entry = Content::system(prompt);
        if matches!(self.content.first(), Some(Content::System { .. })) {
            self.content[0] = entry;
        } else {
            self.content.insert(0, entry);
        }
    }

    pub fn push(&mut self, content: Content) {
        self.content.push(content);
    }

    pub fn record_usage(&mut self, usage: &Usage) {
        self.usage.accumulate(usage);
    }

    /// Text of the most recent assistant entry with content
    pub fn last_assistant_text(&self) -> Option<&str> {
        self.content.iter().rev().find_map(|entry| match entry {
            Content::Assistant {
                content: Some(text),
                ..
            } => Some(text.as_str()),
            _ => None,
        })
    }

    /// Text of the most recent user entry
    pub fn last_user_text(&self) -> Option<&str> {
        self.content.iter().rev().find_map(|entry| match entry {
            Content::User { content, .. } => Some(content.as_str()),
            _ => None,
        })
    }

    /// Tool calls of the last assistant entry that have no result yet
    pub fn unresponded_tool_calls(&self) -> Vec<&ToolInput> {
        let Some(position) = self
            .content
            .iter()
            .rposition(|entry| matches!(entry, Content::Assistant { .. }))
        else {
            return Vec::new();
        };
        let Content::Assistant { tool_calls, .. } = &self.content[position] else {
            return Vec::new();
        };
        let answered: Vec<&str> = self.content[position + 1..]
            .iter()
            .filter_map(|entry| match entry {
                Content::ToolResult { tool_call_id, .. } => Some(tool_call_id.as_str()),
                _ => None,
            })
            .collect();
        tool_calls
            .iter()
            .filter(|call| !answered.contains(&call.id.as_str()))
            .collect()
    }
}

/// A message submitted by the user.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationInput {
    pub text: String,
    pub attachments: Vec<Attachment>,
    pub conversation_id: Option<String>,
    pub extra_system_prompt: Option<String>,
}

impl ConversationInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_conversation_id(mut self, id: impl Into<String>) -> Self {
        self.conversation_id = Some(id.into());
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }
}

/// What the host gets back after a conversation message was handled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationResult {
    pub conversation_id: String,
    pub response: String,
    /// `true` when the agent ended on a question
    pub continue_conversation: bool,
}
