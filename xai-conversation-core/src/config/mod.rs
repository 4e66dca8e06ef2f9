pub mod agent;
pub mod app;
pub mod catalog;
pub mod defaults;
pub mod error;
pub mod loader;
pub mod serializer;

pub use crate::constants::CONFIG_PATH;

pub use agent::{AgentKind, AgentOptions, OptionsUpdate, ReasoningEffort};
pub use app::AppConfig;
pub use catalog::{Capability, ModelInfo, XAI_MODELS};
pub use error::ConfigError;
