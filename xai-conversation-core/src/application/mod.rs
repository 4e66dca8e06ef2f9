//! # Application Module
//!
//! ## Submodules
//!
//! - [`adapter`] - translation of turns and tasks into xAI requests
//! - [`agent`] - the conversation agent and its tool loop
//! - [`task`] - AI-task helpers: attachments, schema checks, image decoding
//! - [`tooling`] - tool APIs the agent can expose to the model

pub mod adapter;
pub mod agent;
pub mod task;
pub mod tooling;
