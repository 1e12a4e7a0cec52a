//! LLM providers used by the fallback stage.
//!
//! A provider only has to answer a prompt with text; anything implementing
//! [`LlmProvider`] can be plugged into [`crate::services::LlmExtractor`].

mod gemini;

use async_trait::async_trait;

use crate::error::StageError;

pub use gemini::GeminiProvider;

/// Text-in, text-out access to a language model.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send `prompt` and return the model's raw reply.
    async fn query(&self, prompt: &str) -> Result<String, StageError>;

    /// Model identifier, for logging.
    fn model_name(&self) -> &str;
}
