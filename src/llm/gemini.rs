use crate::config::Config;
use crate::error::{AskError, AskResult};
use crate::llm::{http_client, status_error, transport_error, LlmProvider};
use crate::models::CompletionRequest;
use serde::{Deserialize, Serialize};

/// Sends the whole composed prompt as one text part to `generateContent`
pub struct GeminiProvider {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiProvider {
    /// Create a provider from config; the key comes from config or `GEMINI_API_KEY`
    pub fn from_config(config: &Config) -> AskResult<Self> {
        let api_key = config.gemini_api_key().ok_or_else(|| {
            AskError::Config(
                "Gemini API key not found. Set GEMINI_API_KEY environment variable or provide api_key in config."
                    .to_string(),
            )
        })?;

        let endpoint = format!(
            "{}/models/{}:generateContent",
            config.gemini.url.trim_end_matches('/'),
            config.gemini.model
        );

        Ok(Self {
            client: http_client(config.gemini.timeout_secs)?,
            endpoint,
            model: config.gemini.model.clone(),
            api_key,
        })
    }

    /// Fold an optional system instruction into the single prompt string
    fn build_request(request: &CompletionRequest) -> GenerateRequest {
        let text = match &request.system {
            Some(system) => format!("{}\n\n{}", system, request.prompt),
            None => request.prompt.clone(),
        };

        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part { text: Some(text) }],
            }],
        }
    }
}

/// Pull the text parts of `candidates[0].content` out of a generateContent body
pub fn parse_generate_response(body: &str) -> AskResult<String> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| AskError::malformed(format!("Gemini response is not valid JSON: {}", e)))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .map(|r| format!(" (blocked: {})", r))
            .unwrap_or_default();
        return Err(AskError::malformed(format!(
            "Gemini response has no candidates{}",
            reason
        )));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.trim().is_empty() {
        return Err(AskError::malformed("Gemini response has no text parts"));
    }
    Ok(text)
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, request: &CompletionRequest) -> AskResult<String> {
        let body = Self::build_request(request);

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("Gemini", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error("Gemini", e))?;

        if !status.is_success() {
            return Err(status_error("Gemini", status, &text));
        }

        tracing::debug!(model = %self.model, "generateContent response received");
        parse_generate_response(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
