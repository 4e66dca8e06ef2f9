use super::agent::{AgentKind, AgentOptions, OptionsUpdate};
use super::error::ConfigError;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Application configuration loaded from `xai.toml`
#[derive(Clone)]
pub struct AppConfig {
    /// Name of the environment variable the key was read from
    pub api_key_env: String,
    pub api_key: String,
    pub endpoint: String,
    pub timeout: Duration,
    pub agents: Vec<AgentOptions>,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key_env", &self.api_key_env)
            .field("api_key", &"<redacted>")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .field("agents", &self.agents)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from a file path (or default path if None)
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        super::loader::load_config(path)
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        super::loader::parse_config(content, Path::new("<inline>"))
    }

    /// Find an agent by name (case-insensitive)
    pub fn agent(&self, name: &str) -> Result<&AgentOptions, ConfigError> {
        self.agents
            .iter()
            .find(|agent| agent.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::AgentNotFound {
                name: name.to_string(),
            })
    }

    /// The named agent, or the first agent of `kind` when no name is given
    pub fn select(&self, name: Option<&str>, kind: AgentKind) -> Result<&AgentOptions, ConfigError> {
        match name {
            Some(name) => self.agent(name),
            None => self
                .agents
                .iter()
                .find(|agent| agent.kind == kind)
                .ok_or_else(|| ConfigError::AgentNotFound {
                    name: kind.default_name().to_string(),
                }),
        }
    }

    /// Add a new agent after validating it
    pub fn add_agent(&mut self, options: AgentOptions) -> Result<(), ConfigError> {
        options.validate()?;
        if self.agent(&options.name).is_ok() {
            return Err(ConfigError::DuplicateAgent { name: options.name });
        }
        info!(agent = options.name.as_str(), kind = options.kind.as_str(), "Agent added");
        self.agents.push(options);
        Ok(())
    }

    /// Apply a reconfiguration to the named agent
    pub fn reconfigure_agent(
        &mut self,
        name: &str,
        update: OptionsUpdate,
    ) -> Result<&AgentOptions, ConfigError> {
        let index = self
            .agents
            .iter()
            .position(|agent| agent.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::AgentNotFound {
                name: name.to_string(),
            })?;
        let updated = self.agents[index].reconfigure(update)?;
        info!(agent = updated.name.as_str(), recommended = updated.recommended, "Agent reconfigured");
        self.agents[index] = updated;
        Ok(&self.agents[index])
    }

    /// Remove the named agent, returning its options
    pub fn remove_agent(&mut self, name: &str) -> Result<AgentOptions, ConfigError> {
        let index = self
            .agents
            .iter()
            .position(|agent| agent.name.eq_ignore_ascii_case(name))
            .ok_or_else(|| ConfigError::AgentNotFound {
                name: name.to_string(),
            })?;
        let removed = self.agents.remove(index);
        info!(agent = removed.name.as_str(), "Agent removed");
        Ok(removed)
    }

    /// Convert configuration to a TOML string (the key itself is never written)
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        super::serializer::to_toml_string(self)
    }
}
