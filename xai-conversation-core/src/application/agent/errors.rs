use crate::application::adapter::AdapterError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error("tool API '{0}' is not registered")]
    UnknownToolApi(String),
    #[error("agent exceeded the maximum of {limit} tool interactions")]
    TooManyToolIterations { limit: usize },
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Adapter(err) => err.user_message(),
            AgentError::UnknownToolApi(id) => {
                format!("The tool API \"{id}\" is not available. Check the agent configuration.")
            }
            AgentError::TooManyToolIterations { .. } => {
                "Sorry, I needed too many steps to answer that. Please try again.".to_string()
            }
        }
    }
}
