use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool API '{api}' has no tool named '{tool}'")]
    UnknownTool { api: String, tool: String },
    #[error("invalid arguments for tool '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },
    #[error("tool '{tool}' failed: {message}")]
    Execution { tool: String, message: String },
}

impl ToolError {
    pub fn invalid_arguments(tool: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            tool: tool.into(),
            reason: reason.into(),
        }
    }

    pub fn execution(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Execution {
            tool: tool.into(),
            message: message.into(),
        }
    }

    /// Short error kind, handed back to the model next to the message
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::UnknownTool { .. } => "UnknownTool",
            ToolError::InvalidArguments { .. } => "InvalidArguments",
            ToolError::Execution { .. } => "ExecutionFailed",
        }
    }
}
