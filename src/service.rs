use crate::config::Config;
use crate::error::{AskError, AskResult};
use crate::extractor::{ContentExtractor, SourceInput, SpreadsheetReader};
use crate::indexer::{IndexGateway, MeilisearchGateway};
use crate::llm::{LlmGateway, LlmProvider};
use crate::models::{Corpus, Document, PromptMode};
use crate::{prompt, retrieval, retry};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Acknowledgement for a stored document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indexed {
    pub corpus: Corpus,
    /// Id the document was stored under
    pub id: String,
    source: IngestSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IngestSource {
    Text,
    Url,
    Spreadsheet,
}

impl fmt::Display for Indexed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source {
            IngestSource::Text => write!(f, "Document indexed successfully! (id: {})", self.id),
            IngestSource::Url => write!(f, "Document indexed successfully from URL (id: {})", self.id),
            IngestSource::Spreadsheet => write!(
                f,
                "Excel file uploaded and indexed successfully (id: {})",
                self.id
            ),
        }
    }
}

/// The core: ingest into a corpus, answer questions grounded in a corpus
pub struct AskService {
    config: Arc<Config>,
    extractor: ContentExtractor,
    index: Arc<dyn IndexGateway>,
    llm: Arc<dyn LlmProvider>,
}

impl AskService {
    pub fn new(
        config: Arc<Config>,
        index: Arc<dyn IndexGateway>,
        llm: Arc<dyn LlmProvider>,
    ) -> AskResult<Self> {
        let extractor = ContentExtractor::new(&config.fetch)?;
        Ok(Self {
            config,
            extractor,
            index,
            llm,
        })
    }

    /// Wire the Meilisearch gateway and every configured LLM provider
    pub async fn connect(config: Arc<Config>) -> AskResult<Self> {
        let index = Arc::new(MeilisearchGateway::connect(&config).await?);
        let llm = Arc::new(LlmGateway::from_config(&config));
        Self::new(config, index, llm)
    }

    /// Index client-supplied text; an id makes this an upsert
    pub async fn add(&self, id: Option<String>, content: String) -> AskResult<Indexed> {
        let document = self
            .extractor
            .extract(SourceInput::Text { id, content })
            .await?;
        self.store(Corpus::Documents, document, IngestSource::Text)
            .await
    }

    /// Fetch a page and index its visible text under a fresh id
    pub async fn add_from_url(&self, url: &str) -> AskResult<Indexed> {
        let document = match self
            .extractor
            .extract(SourceInput::Url(url.to_string()))
            .await
        {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!(url, "not indexing page: {}", e);
                return Err(e);
            }
        };

        if document.content.trim().is_empty() {
            return Err(AskError::input(format!("page at {} has no visible text", url)));
        }

        self.store(Corpus::Documents, document, IngestSource::Url)
            .await
    }

    /// Flatten a workbook into one document keyed by its file name
    pub async fn upload_spreadsheet(&self, file_name: &str, bytes: Vec<u8>) -> AskResult<Indexed> {
        let document = self
            .extractor
            .extract(SourceInput::Spreadsheet {
                file_name: file_name.to_string(),
                bytes,
            })
            .await?;
        self.store(Corpus::Spreadsheets, document, IngestSource::Spreadsheet)
            .await
    }

    /// Read a workbook from disk and index it under its bare file name
    pub async fn upload_spreadsheet_file(&self, path: &Path) -> AskResult<Indexed> {
        let document = SpreadsheetReader::read_path(path).await?;
        self.store(Corpus::Spreadsheets, document, IngestSource::Spreadsheet)
            .await
    }

    /// Answer a question from the documents corpus
    pub async fn ask(&self, query: &str) -> AskResult<String> {
        self.answer(Corpus::Documents, PromptMode::General, query)
            .await
    }

    /// Answer a question strictly from the spreadsheet corpus
    pub async fn query_excel(&self, query: &str) -> AskResult<String> {
        self.answer(Corpus::Spreadsheets, PromptMode::StrictGrounded, query)
            .await
    }

    async fn store(
        &self,
        corpus: Corpus,
        document: Document,
        source: IngestSource,
    ) -> AskResult<Indexed> {
        document.validate()?;

        // Retried writes must upsert one key, never append a second copy
        let document = match document.id {
            Some(_) => document,
            None => Document::with_id(uuid::Uuid::new_v4().to_string(), document.content),
        };

        let id = retry::with_retry(&self.config.retry, "index write", || {
            self.index.index(corpus, &document)
        })
        .await?;

        tracing::info!(%corpus, id = %id, bytes = document.content.len(), "document ingested");
        Ok(Indexed { corpus, id, source })
    }

    /// Retrieve, reduce, compose, generate; strictly in that order
    async fn answer(&self, corpus: Corpus, mode: PromptMode, query: &str) -> AskResult<String> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AskError::input("query is empty"));
        }

        let limit = self.config.retrieval_limit(corpus);
        let result = retry::with_retry(&self.config.retry, "index query", || {
            self.index.query(corpus, query, limit)
        })
        .await?;

        if result.is_empty() {
            tracing::info!(%corpus, "no passages retrieved, skipping LLM call");
            return Ok(retrieval::sentinel_answer(corpus).to_string());
        }
        tracing::debug!(%corpus, passages = result.len(), "passages retrieved");

        let context = retrieval::reduce(&result);
        let request = prompt::compose(mode, &context, query, self.config.provider_for(corpus));

        retry::with_retry(&self.config.retry, "LLM completion", || {
            self.llm.generate(&request)
        })
        .await
    }
}
