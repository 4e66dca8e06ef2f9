//! Application constants
//!
//! Single source of truth for paths, endpoints and limits.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/xai.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// Public xAI API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.x.ai";

pub const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
pub const IMAGE_GENERATIONS_PATH: &str = "/v1/images/generations";
pub const LANGUAGE_MODELS_PATH: &str = "/v1/language-models";

/// Request timeout for non-streaming calls, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Connect timeout applied to every call, streaming included
pub const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Upper bound on model round-trips while tools are being called
pub const MAX_TOOL_ITERATIONS: usize = 6;

/// Shown to listeners when a response only contained tool calls
pub const PROGRESS_MESSAGE: &str = "Let me take care of that for you...";

/// Marker sent by the API after the last streamed chunk
pub const STREAM_DONE_MARKER: &str = "[DONE]";
