use crate::models::{Corpus, ProviderKind};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration loaded from settings.toml
///
/// Built once at startup and shared read-only with every component.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub meilisearch: MeilisearchConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub fetch: FetchConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeilisearchConfig {
    pub url: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_documents_index")]
    pub documents_index: String,
    #[serde(default = "default_excel_index")]
    pub excel_index: String,
    #[serde(default = "default_index_timeout")]
    pub timeout_secs: u64,
}

fn default_documents_index() -> String {
    "documents".to_string()
}

fn default_excel_index() -> String {
    "excel_documents".to_string()
}

fn default_index_timeout() -> u64 {
    30
}

impl Default for MeilisearchConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:7700".to_string(),
            api_key: None,
            documents_index: default_documents_index(),
            excel_index: default_excel_index(),
            timeout_secs: default_index_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_documents_limit")]
    pub documents_limit: usize,
    #[serde(default = "default_excel_limit")]
    pub excel_limit: usize,
    #[serde(default = "default_documents_provider")]
    pub documents_provider: ProviderKind,
    #[serde(default = "default_excel_provider")]
    pub excel_provider: ProviderKind,
}

fn default_documents_limit() -> usize {
    50
}

fn default_excel_limit() -> usize {
    20 // Meilisearch's default page size
}

fn default_documents_provider() -> ProviderKind {
    ProviderKind::OpenAi
}

fn default_excel_provider() -> ProviderKind {
    ProviderKind::Gemini
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            documents_limit: default_documents_limit(),
            excel_limit: default_excel_limit(),
            documents_provider: default_documents_provider(),
            excel_provider: default_excel_provider(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default = "default_openai_url")]
    pub url: String,
    #[serde(default = "default_openai_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_openai_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}

fn default_openai_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_llm_timeout() -> u64 {
    60
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            url: default_openai_url(),
            model: default_openai_model(),
            temperature: default_temperature(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    #[serde(default = "default_gemini_url")]
    pub url: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_timeout")]
    pub timeout_secs: u64,
}

fn default_gemini_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            url: default_gemini_url(),
            model: default_gemini_model(),
            api_key: None,
            timeout_secs: default_llm_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    #[serde(default = "default_fetch_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_fetch_timeout() -> u64 {
    20
}

fn default_user_agent() -> String {
    concat!("askdocs/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_fetch_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Bounded exponential backoff for transient index and provider failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first; 1 disables retrying
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_min_delay_ms")]
    pub min_delay_ms: u64,
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

fn default_max_attempts() -> usize {
    1
}

fn default_min_delay_ms() -> u64 {
    200
}

fn default_max_delay_ms() -> u64 {
    5_000
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            min_delay_ms: default_min_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Load configuration from default location or return defaults
    pub fn load() -> Result<Self> {
        Self::load_from(&[
            "config/settings.toml",
            "./config/settings.toml",
            "~/.config/askdocs/settings.toml",
        ])
    }

    /// Load the first candidate that exists; a file that fails to parse is an error
    pub fn load_from(candidates: &[&str]) -> Result<Self> {
        for raw in candidates {
            let path = PathBuf::from(shellexpand::tilde(raw).as_ref());
            if path.exists() {
                return Self::from_file(path);
            }
        }

        Ok(Self::default())
    }

    /// Get Meilisearch API key from config or environment variable
    pub fn meilisearch_api_key(&self) -> Option<String> {
        self.meilisearch
            .api_key
            .clone()
            .or_else(|| std::env::var("MEILI_MASTER_KEY").ok())
    }

    /// Get OpenAI API key from config or environment variable
    pub fn openai_api_key(&self) -> Option<String> {
        self.openai
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }

    /// Get Gemini API key from config or environment variable
    pub fn gemini_api_key(&self) -> Option<String> {
        self.gemini
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
    }

    /// Index uid backing a corpus
    pub fn index_name(&self, corpus: Corpus) -> &str {
        match corpus {
            Corpus::Documents => &self.meilisearch.documents_index,
            Corpus::Spreadsheets => &self.meilisearch.excel_index,
        }
    }

    /// Maximum number of passages retrieved from a corpus
    pub fn retrieval_limit(&self, corpus: Corpus) -> usize {
        match corpus {
            Corpus::Documents => self.retrieval.documents_limit,
            Corpus::Spreadsheets => self.retrieval.excel_limit,
        }
    }

    /// LLM backend that answers questions about a corpus
    pub fn provider_for(&self, corpus: Corpus) -> ProviderKind {
        match corpus {
            Corpus::Documents => self.retrieval.documents_provider,
            Corpus::Spreadsheets => self.retrieval.excel_provider,
        }
    }

    pub fn index_timeout(&self) -> Duration {
        Duration::from_secs(self.meilisearch.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.meilisearch.url, "http://127.0.0.1:7700");
        assert_eq!(config.index_name(Corpus::Documents), "documents");
        assert_eq!(config.index_name(Corpus::Spreadsheets), "excel_documents");
        assert_eq!(config.retrieval_limit(Corpus::Documents), 50);
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.openai.temperature, 0.7);
        assert_eq!(config.retry.max_attempts, 1);
    }

    #[test]
    fn test_config_default_routing() {
        let config = Config::default();
        assert_eq!(config.provider_for(Corpus::Documents), ProviderKind::OpenAi);
        assert_eq!(config.provider_for(Corpus::Spreadsheets), ProviderKind::Gemini);
    }

    #[test]
    fn test_config_from_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let temp_file = temp_dir.path().join("settings.toml");
        std::fs::write(
            &temp_file,
            r#"
[meilisearch]
url = "http://localhost:7700"
excel_index = "sheets"

[retrieval]
documents_limit = 10
excel_provider = "openai"

[openai]
model = "gpt-4o"
api_key = "sk-test"
"#,
        )
        .unwrap();

        let config = Config::from_file(&temp_file).unwrap();
        assert_eq!(config.meilisearch.url, "http://localhost:7700");
        assert_eq!(config.index_name(Corpus::Documents), "documents");
        assert_eq!(config.index_name(Corpus::Spreadsheets), "sheets");
        assert_eq!(config.retrieval_limit(Corpus::Documents), 10);
        assert_eq!(config.retrieval_limit(Corpus::Spreadsheets), 20);
        assert_eq!(config.provider_for(Corpus::Spreadsheets), ProviderKind::OpenAi);
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai_api_key().as_deref(), Some("sk-test"));
        assert_eq!(config.gemini.model, "gemini-1.5-flash");
    }

    #[test]
    fn test_load_from_reports_malformed_file() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        let broken = temp_dir.path().join("settings.toml");
        std::fs::write(&broken, "[meilisearch\nurl = ").unwrap();

        let candidates = [missing.to_str().unwrap(), broken.to_str().unwrap()];
        assert!(Config::load_from(&candidates).is_err());

        let config = Config::load_from(&[missing.to_str().unwrap()]).unwrap();
        assert_eq!(config.meilisearch.url, Config::default().meilisearch.url);
    }

    #[test]
    fn test_config_rejects_unknown_provider() {
        let result: Result<Config, _> = toml::from_str("[retrieval]\ndocuments_provider = \"bard\"\n");
        assert!(result.is_err());
    }
}
