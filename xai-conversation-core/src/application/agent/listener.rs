use crate::domain::types::ToolInput;
use serde_json::Value;

/// Something that happened while an agent handled a message
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChatDelta<'a> {
    /// A new assistant message begins
    AssistantStart,
    Content(&'a str),
    Thinking(&'a str),
    ToolCalls(&'a [ToolInput]),
    ToolResult {
        tool_call_id: &'a str,
        tool_name: &'a str,
        result: &'a Value,
    },
    /// Shown in place of text when a message only calls tools
    Progress(&'a str),
}

/// Receives deltas as they are produced
pub trait DeltaListener: Send + Sync {
    fn on_delta(&self, conversation_id: &str, delta: &ChatDelta<'_>);
}
