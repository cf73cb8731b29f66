//! Completion client trait

use super::LlmError;
use async_trait::async_trait;

/// A model that turns one prompt into one textual reply.
///
/// Implemented by `AnthropicClient` for production; tests use scripted stubs.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send `prompt` as a single user message, capped at `max_tokens` output tokens
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmError>;
}
