pub mod gateway;
pub mod gemini;
pub mod openai;
pub mod r#trait;

pub use gateway::{LlmGateway, Provider};
pub use gemini::GeminiProvider;
pub use openai::OpenAiProvider;
pub use r#trait::LlmProvider;

use crate::error::AskError;
use serde::Deserialize;
use std::time::Duration;

/// Error envelope shared by the OpenAI and Gemini APIs
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Build the HTTP client used by a provider
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, AskError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| AskError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Map a transport error, keeping timeouts recognizable
pub(crate) fn transport_error(provider: &str, err: reqwest::Error) -> AskError {
    if err.is_timeout() {
        AskError::provider(format!("{} request timed out", provider))
    } else {
        AskError::provider(format!("{} request failed: {}", provider, err))
    }
}

/// Map a non-2xx response, preferring the provider's own error message
pub(crate) fn status_error(provider: &str, status: reqwest::StatusCode, body: &str) -> AskError {
    let message = serde_json::from_str::<ApiError>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    AskError::provider(format!("{} API error ({}): {}", provider, status, message))
}
