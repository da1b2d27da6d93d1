use crate::error::AskResult;
use crate::models::{Corpus, Document, RetrievalResult};

/// Contract over an external full-text search service
#[async_trait::async_trait]
pub trait IndexGateway: Send + Sync {
    /// Store a document in a corpus and return the id it was stored under.
    ///
    /// With an id this is an upsert; without one the gateway assigns a fresh
    /// id that never collides with existing documents.
    async fn index(&self, corpus: Corpus, document: &Document) -> AskResult<String>;

    /// Ranked passages matching free text, at most `limit` of them.
    ///
    /// Zero hits is an empty result, not an error.
    async fn query(&self, corpus: Corpus, text: &str, limit: usize) -> AskResult<RetrievalResult>;
}
