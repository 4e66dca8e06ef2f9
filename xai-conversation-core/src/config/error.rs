use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading, validating or editing configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse config from {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to serialize configuration: {source}")]
    Serialize {
        #[source]
        source: toml::ser::Error,
    },

    #[error("API key environment variable '{env_var}' is not set")]
    MissingApiKey { env_var: String },

    #[error("agent '{agent}': unknown model '{model}'")]
    UnknownModel { agent: String, model: String },

    #[error("agent '{agent}': model '{model}' cannot be used for {purpose}")]
    UnsuitableModel {
        agent: String,
        model: String,
        purpose: &'static str,
    },

    #[error("agent '{agent}': {field} {reason}")]
    InvalidField {
        agent: String,
        field: &'static str,
        reason: String,
    },

    #[error("agent name '{name}' is used more than once")]
    DuplicateAgent { name: String },

    #[error("agent '{name}' is not configured")]
    AgentNotFound { name: String },
}

impl ConfigError {
    pub fn invalid_field(
        agent: impl Into<String>,
        field: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidField {
            agent: agent.into(),
            field,
            reason: reason.into(),
        }
    }
}
