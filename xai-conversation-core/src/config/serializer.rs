use super::AppConfig;
use super::agent::AgentOptions;
use super::error::ConfigError;
use serde::Serialize;

#[derive(Serialize)]
struct RenderedConfig<'a> {
    api_key: &'a str,
    endpoint: &'a str,
    timeout_secs: u64,
    agents: &'a [AgentOptions],
}

/// Convert AppConfig to TOML string representation.
///
/// `api_key` is written as the environment variable name it came from.
pub fn to_toml_string(config: &AppConfig) -> Result<String, ConfigError> {
    let rendered = RenderedConfig {
        api_key: &config.api_key_env,
        endpoint: &config.endpoint,
        timeout_secs: config.timeout.as_secs(),
        agents: &config.agents,
    };
    toml::to_string(&rendered).map_err(|source| ConfigError::Serialize { source })
}
