use crate::config::Config;
use crate::error::{AskError, AskResult};
use crate::llm::{GeminiProvider, LlmProvider, OpenAiProvider};
use crate::models::{CompletionRequest, ProviderKind};

/// One configured LLM backend, tagged by wire protocol
pub enum Provider {
    OpenAi(OpenAiProvider),
    Gemini(GeminiProvider),
}

impl Provider {
    /// Build the backend for one provider tag from config
    pub fn from_config(kind: ProviderKind, config: &Config) -> AskResult<Self> {
        match kind {
            ProviderKind::OpenAi => Ok(Provider::OpenAi(OpenAiProvider::from_config(config)?)),
            ProviderKind::Gemini => Ok(Provider::Gemini(GeminiProvider::from_config(config)?)),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            Provider::OpenAi(_) => ProviderKind::OpenAi,
            Provider::Gemini(_) => ProviderKind::Gemini,
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for Provider {
    async fn generate(&self, request: &CompletionRequest) -> AskResult<String> {
        match self {
            Provider::OpenAi(provider) => provider.generate(request).await,
            Provider::Gemini(provider) => provider.generate(request).await,
        }
    }

    fn model_name(&self) -> &str {
        match self {
            Provider::OpenAi(provider) => provider.model_name(),
            Provider::Gemini(provider) => provider.model_name(),
        }
    }
}

/// Routes each completion request to the backend named by its provider tag
#[derive(Default)]
pub struct LlmGateway {
    openai: Option<Provider>,
    gemini: Option<Provider>,
}

impl LlmGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every provider whose credentials resolve.
    ///
    /// A provider without a key is skipped with a warning; requests routed to
    /// it fail with [`AskError::Config`].
    pub fn from_config(config: &Config) -> Self {
        let mut gateway = Self::new();
        for kind in [ProviderKind::OpenAi, ProviderKind::Gemini] {
            match Provider::from_config(kind, config) {
                Ok(provider) => {
                    tracing::info!(provider = %kind, model = provider.model_name(), "LLM provider ready");
                    gateway.register(provider);
                }
                Err(e) => tracing::warn!(provider = %kind, "LLM provider disabled: {}", e),
            }
        }
        gateway
    }

    /// Register (or replace) the backend for its own tag
    pub fn register(&mut self, provider: Provider) {
        match provider.kind() {
            ProviderKind::OpenAi => self.openai = Some(provider),
            ProviderKind::Gemini => self.gemini = Some(provider),
        }
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.register(provider);
        self
    }

    fn slot(&self, kind: ProviderKind) -> Option<&Provider> {
        match kind {
            ProviderKind::OpenAi => self.openai.as_ref(),
            ProviderKind::Gemini => self.gemini.as_ref(),
        }
    }

    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        self.slot(kind).is_some()
    }
}

#[async_trait::async_trait]
impl LlmProvider for LlmGateway {
    async fn generate(&self, request: &CompletionRequest) -> AskResult<String> {
        let provider = self.slot(request.provider).ok_or_else(|| {
            AskError::Config(format!(
                "LLM provider '{}' is not configured (missing API key?)",
                request.provider
            ))
        })?;
        provider.generate(request).await
    }

    fn model_name(&self) -> &str {
        "gateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::test_server::serve;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::json;

    fn request(provider: ProviderKind) -> CompletionRequest {
        CompletionRequest {
            system: None,
            prompt: "prompt".to_string(),
            provider,
        }
    }

    /// One mock server answering both wire protocols
    async fn mock_config() -> Config {
        let router = Router::new()
            .route(
                "/chat",
                post(|| async {
                    Json(json!({"choices": [{"message": {"content": "from openai"}}]}))
                }),
            )
            .route(
                "/models/:action",
                post(|| async {
                    Json(json!({"candidates": [{"content": {"parts": [{"text": "from gemini"}]}}]}))
                }),
            );
        let base = serve(router).await;

        let mut config = Config::default();
        config.openai.url = format!("{}/chat", base);
        config.openai.api_key = Some("sk-test".to_string());
        config.gemini.url = base;
        config.gemini.api_key = Some("g-test".to_string());
        config
    }

    #[tokio::test]
    async fn test_routes_by_provider_tag() {
        let gateway = LlmGateway::from_config(&mock_config().await);

        assert_eq!(gateway.generate(&request(ProviderKind::OpenAi)).await.unwrap(), "from openai");
        assert_eq!(gateway.generate(&request(ProviderKind::Gemini)).await.unwrap(), "from gemini");
    }

    #[tokio::test]
    async fn test_unconfigured_provider_is_config_error() {
        let config = mock_config().await;
        let gateway = LlmGateway::new()
            .with_provider(Provider::from_config(ProviderKind::OpenAi, &config).unwrap());
        assert!(!gateway.is_configured(ProviderKind::Gemini));
        let result = gateway.generate(&request(ProviderKind::Gemini)).await;
        assert!(matches!(result, Err(AskError::Config(_))));
    }

    #[test]
    fn test_provider_variant_matches_its_tag() {
        let mut config = Config::default();
        config.openai.api_key = Some("sk-test".to_string());
        config.gemini.api_key = Some("g-test".to_string());

        for kind in [ProviderKind::OpenAi, ProviderKind::Gemini] {
            let provider = Provider::from_config(kind, &config).unwrap();
            assert_eq!(provider.kind(), kind);
        }
        assert_eq!(
            Provider::from_config(ProviderKind::Gemini, &config).unwrap().model_name(),
            "gemini-1.5-flash"
        );
    }

    #[test]
    fn test_from_config_registers_keyed_providers() {
        let mut config = Config::default();
        config.openai.api_key = Some("sk-test".to_string());
        config.gemini.api_key = Some("g-test".to_string());
        let gateway = LlmGateway::from_config(&config);
        assert!(gateway.is_configured(ProviderKind::OpenAi));
        assert!(gateway.is_configured(ProviderKind::Gemini));
    }
}
