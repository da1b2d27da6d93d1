use crate::error::{AskError, AskResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A unit of indexed text
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Caller-chosen id; the index assigns one when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Flat text blob that gets searched and fed to the LLM
    pub content: String,
}

impl Document {
    /// Create a document without an id (append semantics)
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
        }
    }

    /// Create a document with an explicit id (upsert semantics)
    pub fn with_id(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            content: content.into(),
        }
    }

    /// Reject documents that must never reach the index
    pub fn validate(&self) -> AskResult<()> {
        if self.content.trim().is_empty() {
            return Err(AskError::input("document content is empty"));
        }
        if let Some(id) = &self.id {
            if id.trim().is_empty() {
                return Err(AskError::input("document id is blank"));
            }
        }
        Ok(())
    }
}

/// Independently queried partition of the search index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Corpus {
    /// Free-text documents added directly or fetched from URLs
    Documents,
    /// Flattened spreadsheet uploads, one document per file
    Spreadsheets,
}

impl fmt::Display for Corpus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Corpus::Documents => write!(f, "documents"),
            Corpus::Spreadsheets => write!(f, "spreadsheets"),
        }
    }
}

/// Ranked passages returned for one query, best first
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetrievalResult {
    pub passages: Vec<String>,
}

impl RetrievalResult {
    pub fn new(passages: Vec<String>) -> Self {
        Self { passages }
    }

    pub fn is_empty(&self) -> bool {
        self.passages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.passages.len()
    }
}

/// Retrieved passages joined into the blob handed to the LLM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundingContext(pub String);

impl GroundingContext {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which prompt template the composer uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptMode {
    /// Helpful-assistant Q&A over the context
    General,
    /// Answer only from the documents, with a fixed refusal string
    StrictGrounded,
}

/// LLM backend a completion request is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Gemini => write!(f, "gemini"),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderKind::OpenAi),
            "gemini" => Ok(ProviderKind::Gemini),
            other => Err(AskError::Config(format!("unknown LLM provider: {}", other))),
        }
    }
}

/// Provider-agnostic completion request, built fresh per query
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System turn; `None` when the instruction is folded into the prompt
    pub system: Option<String>,
    pub prompt: String,
    pub provider: ProviderKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_validate_rejects_empty_content() {
        assert!(Document::new("").validate().is_err());
        assert!(Document::new("  \n\t").validate().is_err());
        assert!(Document::new("Paris").validate().is_ok());
    }

    #[test]
    fn test_document_validate_rejects_blank_id() {
        let doc = Document::with_id(" ", "content");
        assert!(matches!(doc.validate(), Err(AskError::InputInvalid(_))));
    }

    #[test]
    fn test_document_serialization_skips_missing_id() {
        let json = serde_json::to_string(&Document::new("text")).unwrap();
        assert_eq!(json, r#"{"content":"text"}"#);

        let doc: Document = serde_json::from_str(r#"{"id":"7","content":"x"}"#).unwrap();
        assert_eq!(doc.id.as_deref(), Some("7"));
    }

    #[test]
    fn test_provider_kind_parsing() {
        assert_eq!("openai".parse::<ProviderKind>().unwrap(), ProviderKind::OpenAi);
        assert_eq!(" Gemini ".parse::<ProviderKind>().unwrap(), ProviderKind::Gemini);
        assert!("claude".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_provider_kind_serde_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            provider: ProviderKind,
        }

        let wrapper: Wrapper = toml::from_str("provider = \"gemini\"").unwrap();
        assert_eq!(wrapper.provider, ProviderKind::Gemini);
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
    }
}
