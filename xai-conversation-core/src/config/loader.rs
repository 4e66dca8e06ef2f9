use super::agent::{AgentKind, AgentOptions, OptionsUpdate, ReasoningEffort, dedup_apis};
use super::defaults::DEFAULT_API_KEY_ENV;
use super::error::ConfigError;
use crate::constants::{CONFIG_PATH, DEFAULT_ENDPOINT, DEFAULT_TIMEOUT_SECS, ENV_PATH};
use dotenvy::from_filename;
use serde::Deserialize;
use std::collections::HashSet;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, warn};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawConfig {
    pub api_key: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub agents: Vec<RawAgent>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawAgent {
    pub name: Option<String>,
    #[serde(default)]
    pub kind: AgentKind,
    pub recommended: Option<bool>,
    pub prompt: Option<String>,
    #[serde(default)]
    pub llm_apis: Vec<String>,
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

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(ENV_PATH);
    });
}

/// Read the API key from the named environment variable
pub fn resolve_api_key(env_var: &str) -> Result<String, ConfigError> {
    let name = env_var.trim();
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
        Ok(_) => Err(ConfigError::MissingApiKey {
            env_var: name.to_string(),
        }),
        Err(err) => {
            warn!(env_var = name, %err, "API key environment variable is not set");
            Err(ConfigError::MissingApiKey {
                env_var: name.to_string(),
            })
        }
    }
}

/// Load and validate configuration from a file path
pub fn load_config(path: Option<&Path>) -> Result<super::AppConfig, ConfigError> {
    ensure_env_loaded();
    let config_path = match path {
        Some(path) => expand_path(path),
        None => PathBuf::from(CONFIG_PATH),
    };
    read_config(&config_path)
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

fn read_config(path: &Path) -> Result<super::AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(&content, path)
}

pub(super) fn parse_config(content: &str, path: &Path) -> Result<super::AppConfig, ConfigError> {
    let parsed: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<super::AppConfig, ConfigError> {
    let api_key_env = parsed
        .api_key
        .filter(|name| !name.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_KEY_ENV.to_string());
    let api_key = resolve_api_key(&api_key_env)?;

    let mut agents = Vec::with_capacity(parsed.agents.len().max(2));
    let mut seen = HashSet::new();
    for raw in parsed.agents {
        let agent = build_agent(raw)?;
        if !seen.insert(agent.name.to_lowercase()) {
            return Err(ConfigError::DuplicateAgent { name: agent.name });
        }
        agents.push(agent);
    }

    if agents.is_empty() {
        debug!("No agents configured, creating recommended conversation and AI task agents");
        agents.push(AgentOptions::recommended(AgentKind::Conversation));
        agents.push(AgentOptions::recommended(AgentKind::AiTask));
    }

    Ok(super::AppConfig {
        api_key_env,
        api_key,
        endpoint: parsed
            .endpoint
            .filter(|endpoint| !endpoint.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
        timeout: Duration::from_secs(parsed.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS)),
        agents,
    })
}

fn build_agent(raw: RawAgent) -> Result<AgentOptions, ConfigError> {
    let mut base = AgentOptions::recommended(raw.kind);
    if let Some(name) = raw.name {
        base.name = name;
    }
    // A missing prompt keeps the kind's default; the update below only clears
    // it when the file sets an empty string.
    let update = OptionsUpdate {
        prompt: raw.prompt,
        llm_apis: Some(dedup_apis(raw.llm_apis)),
        recommended: Some(raw.recommended.unwrap_or(true)),
        stream: raw.stream,
        chat_model: raw.chat_model,
        max_tokens: raw.max_tokens,
        temperature: raw.temperature,
        top_p: raw.top_p,
        reasoning_effort: raw.reasoning_effort,
        live_search: raw.live_search,
        max_search_results: raw.max_search_results,
        image_model: raw.image_model,
    };
    base.reconfigure(update)
}
