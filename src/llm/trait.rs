use crate::error::AskResult;
use crate::models::CompletionRequest;

/// Capability shared by every LLM backend: one prompt in, plain text out
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion with exactly one outbound call
    async fn generate(&self, request: &CompletionRequest) -> AskResult<String>;

    /// Model identifier, for logging
    fn model_name(&self) -> &str;
}
