//! Language-model collaborator.
//!
//! Functions only see the [`LanguageModel`] trait. The `llm` feature adds
//! [`NimClient`], an OpenAI-compatible chat-completions client.

pub mod error;
#[cfg(feature = "llm")]
pub mod nim;

use async_trait::async_trait;

pub use error::LLMError;
#[cfg(feature = "llm")]
pub use nim::{ChatMessage, CompletionBuilder, NimClient, NimConfig};

/// Given a prompt, return text.
///
/// Timeouts and retries belong to the implementation; callers surface whatever
/// error comes back.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Completes `prompt`, using `model` instead of the implementation's default when given.
    async fn complete(&self, prompt: &str, model: Option<String>) -> Result<String, LLMError>;
}
