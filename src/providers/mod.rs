//! LLM provider implementations

pub mod openai;

// Re-export for convenience
pub use openai::OpenAiClient;

/// A single-shot chat completion backend.
///
/// Implementations make exactly one attempt per call; retry and
/// deadline policy belong to the caller.
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync
{   /// Run one completion and return the generated text
    async fn complete(
      &self
    , request: &crate::request::CompletionRequest
    ) -> Result<String, crate::error::Error>;
}
