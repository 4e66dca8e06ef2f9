use super::agent::ReasoningEffort;

pub const DEFAULT_CONVERSATION_NAME: &str = "xAI Conversation";
pub const DEFAULT_AI_TASK_NAME: &str = "xAI AI Task";
pub const DEFAULT_API_KEY_ENV: &str = "XAI_API_KEY";

pub const RECOMMENDED_CHAT_MODEL: &str = "grok-4-fast-non-reasoning";
pub const RECOMMENDED_IMAGE_MODEL: &str = "grok-2-image";
pub const RECOMMENDED_MAX_TOKENS: u32 = 4096;
pub const RECOMMENDED_TEMPERATURE: f64 = 0.7;
pub const RECOMMENDED_TOP_P: f64 = 1.0;
pub const RECOMMENDED_REASONING_EFFORT: ReasoningEffort = ReasoningEffort::Medium;
pub const RECOMMENDED_LIVE_SEARCH: bool = true;
pub const RECOMMENDED_MAX_SEARCH_RESULTS: u32 = 5;
pub const RECOMMENDED_STREAM: bool = true;

pub const MAX_TEMPERATURE: f64 = 2.0;
pub const MAX_TOP_P: f64 = 1.0;
pub const MIN_SEARCH_RESULTS: u32 = 1;
pub const MAX_SEARCH_RESULTS: u32 = 50;

pub const DEFAULT_INSTRUCTIONS_PROMPT: &str = "You are a voice assistant for a smart home. \
Answer questions about the world truthfully. \
Answer in plain text. Keep it simple and to the point.";
