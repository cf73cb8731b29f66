//! LLM client module
//!
//! Talks to the external model service that performs the actual browsing
//! and extraction for each target website.

mod client;
mod traits;
mod types;

pub use client::{AnthropicClient, LlmError};
pub use traits::CompletionClient;
