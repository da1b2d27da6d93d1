use crate::config::Config;
use crate::error::{AskError, AskResult};
use crate::llm::{http_client, status_error, transport_error, LlmProvider};
use crate::models::CompletionRequest;
use serde::{Deserialize, Serialize};

/// Chat-completion provider: system turn then user turn, bearer auth
pub struct OpenAiProvider {
    client: reqwest::Client,
    url: String,
    model: String,
    temperature: f32,
    api_key: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: Option<ChatChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a provider from config; the key comes from config or `OPENAI_API_KEY`
    pub fn from_config(config: &Config) -> AskResult<Self> {
        let api_key = config.openai_api_key().ok_or_else(|| {
            AskError::Config(
                "OpenAI API key not found. Set OPENAI_API_KEY environment variable or provide api_key in config."
                    .to_string(),
            )
        })?;

        Ok(Self {
            client: http_client(config.openai.timeout_secs)?,
            url: config.openai.url.clone(),
            model: config.openai.model.clone(),
            temperature: config.openai.temperature,
            api_key,
        })
    }

    fn build_request<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        }
    }
}

/// Pull `choices[0].message.content` out of a chat completion body
pub fn parse_chat_response(body: &str) -> AskResult<String> {
    let response: ChatResponse = serde_json::from_str(body)
        .map_err(|e| AskError::malformed(format!("OpenAI response is not valid JSON: {}", e)))?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| AskError::malformed("OpenAI response has no choices"))?;

    choice
        .message
        .and_then(|m| m.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| AskError::malformed("OpenAI response has no message content"))
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    async fn generate(&self, request: &CompletionRequest) -> AskResult<String> {
        let body = self.build_request(request);

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| transport_error("OpenAI", e))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| transport_error("OpenAI", e))?;

        if !status.is_success() {
            return Err(status_error("OpenAI", status, &text));
        }

        tracing::debug!(model = %self.model, "chat completion received");
        parse_chat_response(&text)
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
