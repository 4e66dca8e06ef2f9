//! # Agent Options
//!
//! Per-agent settings: which model to call, how to sample, whether live
//! search and reasoning effort are requested, the system prompt and the
//! tool APIs the agent may use.
//!
//! An agent in *recommended* mode only carries its name, prompt, tool APIs
//! and streaming flag; every advanced field holds its recommended value.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

use super::catalog::{self, Capability};
use super::defaults::*;
use super::error::ConfigError;

/// What an agent is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    #[default]
    Conversation,
    AiTask,
}

impl AgentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::Conversation => "conversation",
            AgentKind::AiTask => "ai_task",
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            AgentKind::Conversation => DEFAULT_CONVERSATION_NAME,
            AgentKind::AiTask => DEFAULT_AI_TASK_NAME,
        }
    }
}

/// How much a reasoning-capable model deliberates before answering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    High,
}

impl ReasoningEffort {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl fmt::Display for ReasoningEffort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings of one agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOptions {
    pub name: String,
    pub kind: AgentKind,
    pub recommended: bool,
    pub chat_model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub top_p: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
    pub live_search: bool,
    pub max_search_results: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub llm_apis: Vec<String>,
    pub stream: bool,
    pub image_model: String,
}

impl AgentOptions {
    /// Recommended options for a new agent of the given kind.
    pub fn recommended(kind: AgentKind) -> Self {
        Self {
            name: kind.default_name().to_string(),
            kind,
            recommended: true,
            chat_model: RECOMMENDED_CHAT_MODEL.to_string(),
            max_tokens: RECOMMENDED_MAX_TOKENS,
            temperature: RECOMMENDED_TEMPERATURE,
            top_p: RECOMMENDED_TOP_P,
            reasoning_effort: None,
            live_search: RECOMMENDED_LIVE_SEARCH,
            max_search_results: RECOMMENDED_MAX_SEARCH_RESULTS,
            prompt: match kind {
                AgentKind::Conversation => Some(DEFAULT_INSTRUCTIONS_PROMPT.to_string()),
                AgentKind::AiTask => None,
            },
            llm_apis: Vec::new(),
            stream: RECOMMENDED_STREAM,
            image_model: RECOMMENDED_IMAGE_MODEL.to_string(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_llm_apis(mut self, apis: Vec<String>) -> Self {
        self.llm_apis = apis;
        self
    }

    /// System prompt, if one is set and not blank.
    pub fn system_prompt(&self) -> Option<&str> {
        self.prompt.as_deref().filter(|p| !p.trim().is_empty())
    }

    /// Reset every advanced field to its recommended value.
    pub fn apply_recommended(&mut self) {
        self.recommended = true;
        self.chat_model = RECOMMENDED_CHAT_MODEL.to_string();
        self.max_tokens = RECOMMENDED_MAX_TOKENS;
        self.temperature = RECOMMENDED_TEMPERATURE;
        self.top_p = RECOMMENDED_TOP_P;
        self.reasoning_effort = None;
        self.live_search = RECOMMENDED_LIVE_SEARCH;
        self.max_search_results = RECOMMENDED_MAX_SEARCH_RESULTS;
        self.image_model = RECOMMENDED_IMAGE_MODEL.to_string();
    }

    /// Check every field against its allowed range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let agent = self.name.as_str();
        if agent.trim().is_empty() {
            return Err(ConfigError::invalid_field(agent, "name", "must not be empty"));
        }

        let chat = catalog::lookup(&self.chat_model).ok_or_else(|| ConfigError::UnknownModel {
            agent: agent.to_string(),
            model: self.chat_model.clone(),
        })?;
        if !chat.supports(Capability::Chat) {
            return Err(ConfigError::UnsuitableModel {
                agent: agent.to_string(),
                model: self.chat_model.clone(),
                purpose: "chat",
            });
        }

        let image = catalog::lookup(&self.image_model).ok_or_else(|| ConfigError::UnknownModel {
            agent: agent.to_string(),
            model: self.image_model.clone(),
        })?;
        if self.kind == AgentKind::AiTask && !image.supports(Capability::ImageGeneration) {
            return Err(ConfigError::UnsuitableModel {
                agent: agent.to_string(),
                model: self.image_model.clone(),
                purpose: "image generation",
            });
        }

        if self.max_tokens < 1 {
            return Err(ConfigError::invalid_field(agent, "max_tokens", "must be at least 1"));
        }
        if !(0.0..=MAX_TEMPERATURE).contains(&self.temperature) {
            return Err(ConfigError::invalid_field(
                agent,
                "temperature",
                format!("must be between 0 and {MAX_TEMPERATURE}, got {}", self.temperature),
            ));
        }
        if !(0.0..=MAX_TOP_P).contains(&self.top_p) {
            return Err(ConfigError::invalid_field(
                agent,
                "top_p",
                format!("must be between 0 and {MAX_TOP_P}, got {}", self.top_p),
            ));
        }
        if !(MIN_SEARCH_RESULTS..=MAX_SEARCH_RESULTS).contains(&self.max_search_results) {
            return Err(ConfigError::invalid_field(
                agent,
                "max_search_results",
                format!(
                    "must be between {MIN_SEARCH_RESULTS} and {MAX_SEARCH_RESULTS}, got {}",
                    self.max_search_results
                ),
            ));
        }
        if self.llm_apis.iter().any(|api| api.trim().is_empty()) {
            return Err(ConfigError::invalid_field(
                agent,
                "llm_apis",
                "must not contain empty identifiers",
            ));
        }

        Ok(())
    }

    /// Apply a reconfiguration and validate the result.
    ///
    /// The receiver is left untouched; on success the updated options are
    /// returned.
    pub fn reconfigure(&self, update: OptionsUpdate) -> Result<Self, ConfigError> {
        let mut next = self.clone();
        let has_advanced = update.has_advanced_fields();

        if let Some(prompt) = update.prompt {
            next.prompt = (!prompt.trim().is_empty()).then_some(prompt);
        }
        if let Some(apis) = update.llm_apis {
            next.llm_apis = dedup_apis(apis);
        }
        if let Some(stream) = update.stream {
            next.stream = stream;
        }

        let recommended = update.recommended.unwrap_or(self.recommended);
        if recommended {
            if has_advanced {
                warn!(
                    agent = next.name.as_str(),
                    "Ignoring advanced options because recommended settings are enabled"
                );
            }
            next.apply_recommended();
        } else {
            next.recommended = false;
            if let Some(model) = update.chat_model {
                next.chat_model = model;
            }
            if let Some(max_tokens) = update.max_tokens {
                next.max_tokens = max_tokens;
            }
            if let Some(temperature) = update.temperature {
                next.temperature = temperature;
            }
            if let Some(top_p) = update.top_p {
                next.top_p = top_p;
            }
            if update.reasoning_effort.is_some() {
                next.reasoning_effort = update.reasoning_effort;
            } else if self.recommended {
                next.reasoning_effort = Some(RECOMMENDED_REASONING_EFFORT);
            }
            if let Some(live_search) = update.live_search {
                next.live_search = live_search;
            }
            if let Some(max_results) = update.max_search_results {
                next.max_search_results = max_results;
            }
            if let Some(image_model) = update.image_model {
                next.image_model = image_model;
            }
        }

        next.validate()?;
        Ok(next)
    }
}

/// Changes submitted through a reconfiguration.
///
/// `None` leaves a field as it is. An empty prompt or an empty tool-API list
/// removes the setting.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OptionsUpdate {
    pub prompt: Option<String>,
    pub llm_apis: Option<Vec<String>>,
    pub recommended: Option<bool>,
    pub stream: Option<bool>,
    pub chat_model: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub reasoning_effort: Option<ReasoningEffort>,
    pub live_search: Option<bool>,
    pub max_search_results: Option<u32>,
    pub image_model: Option<String>,
}

impl OptionsUpdate {
    pub fn has_advanced_fields(&self) -> bool {
        self.chat_model.is_some()
            || self.max_tokens.is_some()
            || self.temperature.is_some()
            || self.top_p.is_some()
            || self.reasoning_effort.is_some()
            || self.live_search.is_some()
            || self.max_search_results.is_some()
            || self.image_model.is_some()
    }
}

pub(super) fn dedup_apis(apis: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(apis.len());
    for api in apis {
        let api = api.trim().to_string();
        if !seen.contains(&api) {
            seen.push(api);
        }
    }
    seen
}
