//! # Agent Module
//!
//! The conversation agent keeps a chat log, lets the model call tools from
//! the agent's tool APIs and relays every step to an optional listener.
//!
//! ## Agent Loop
//!
//! 1. Write the system prompt and the user message into the chat log
//! 2. Send the log to the model
//! 3. If the answer calls tools, run them concurrently, log the results and
//!    go back to 2
//! 4. Otherwise return the answer
//!
//! The loop gives up after [`MAX_TOOL_ITERATIONS`](crate::constants::MAX_TOOL_ITERATIONS)
//! round-trips.

mod errors;
mod listener;
mod runner;


pub use errors::AgentError;
pub use listener::{ChatDelta, DeltaListener};
pub use runner::ConversationAgent;
