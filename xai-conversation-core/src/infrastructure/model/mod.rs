//! Model infrastructure module
//!
//! Everything that talks to the xAI HTTP API.
//!
//! # Structure
//! - `types` - wire request/response types and [`XaiError`]
//! - `traits` - the [`ChatBackend`] seam the adapter is written against
//! - `adapter` - chat log to wire message conversion
//! - `client` - [`XaiClient`], the reqwest implementation
//! - `stream` - server-sent events to chunk stream

pub mod adapter;
pub mod client;
pub mod stream;
pub mod traits;
pub mod types;

pub use client::XaiClient;
pub use traits::{ChatBackend, ChunkStream};
pub use types::XaiError;
