use thiserror::Error;

/// Result type alias for askdocs operations.
pub type AskResult<T> = Result<T, AskError>;

/// Failures the core can report to its caller.
///
/// An empty retrieval is not an error: it is answered with a fixed sentinel
/// string (see [`crate::retrieval`]). Every variant here aborts only the
/// document or query being processed.
#[derive(Error, Debug)]
pub enum AskError {
    /// Empty or malformed input, or a missing required field.
    #[error("Invalid input: {0}")]
    InputInvalid(String),

    /// Source URL unreachable, non-2xx, or timed out.
    #[error("Failed to fetch {url}: {message}")]
    FetchFailed { url: String, message: String },

    /// Spreadsheet container not recognized or corrupt.
    #[error("Unsupported spreadsheet format: {0}")]
    FormatUnsupported(String),

    /// Spreadsheet file could not be read from disk.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Search backend unreachable, timed out, or rejected the write/query.
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// LLM HTTP call failed, returned non-2xx, or timed out.
    #[error("LLM provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// LLM response body is missing the expected fields.
    #[error("Malformed LLM provider response: {0}")]
    ProviderResponseMalformed(String),

    /// Missing credential or a provider that was never configured.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AskError {
    pub fn input(message: impl Into<String>) -> Self {
        Self::InputInvalid(message.into())
    }

    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FetchFailed {
            url: url.into(),
            message: message.into(),
        }
    }

    pub fn index(message: impl Into<String>) -> Self {
        Self::IndexUnavailable(message.into())
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::ProviderUnavailable(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::ProviderResponseMalformed(message.into())
    }

    /// Whether a bounded retry could plausibly succeed.
    ///
    /// Only transient network failures qualify. A malformed response or an
    /// unsupported container will fail the same way every time.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::FetchFailed { .. } | Self::IndexUnavailable(_) | Self::ProviderUnavailable(_)
        )
    }
}

impl From<meilisearch_sdk::errors::Error> for AskError {
    fn from(err: meilisearch_sdk::errors::Error) -> Self {
        Self::IndexUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors_are_retryable() {
        assert!(AskError::fetch("http://x", "timeout").is_retryable());
        assert!(AskError::index("connection refused").is_retryable());
        assert!(AskError::provider("503").is_retryable());
    }

    #[test]
    fn test_permanent_errors_are_not_retryable() {
        assert!(!AskError::malformed("no choices").is_retryable());
        assert!(!AskError::FormatUnsupported("not a workbook".into()).is_retryable());
        assert!(!AskError::input("empty content").is_retryable());
        assert!(!AskError::Config("missing key".into()).is_retryable());
    }

    #[test]
    fn test_fetch_error_message_names_url() {
        let err = AskError::fetch("https://example.com", "status 404");
        assert_eq!(
            err.to_string(),
            "Failed to fetch https://example.com: status 404"
        );
    }
}
