//! Request adapter between a host automation platform and the xAI Grok API.
//!
//! # Structure
//! - [`config`] - agent options, model catalog, TOML loading
//! - [`domain`] - chat log and tool types shared by every layer
//! - [`infrastructure`] - the xAI HTTP client behind the [`model::ChatBackend`] seam
//! - [`application`] - the request adapter, the conversation agent and AI-task helpers

pub mod application;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{adapter, agent, task, tooling};
pub use config::{AgentKind, AgentOptions, AppConfig};
pub use domain::types;
pub use infrastructure::model;
