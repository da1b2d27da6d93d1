use crate::config::Config;
use crate::error::{AskError, AskResult};
use crate::indexer::IndexGateway;
use crate::models::{Corpus, Document, RetrievalResult};
use crate::utils;
use meilisearch_sdk::client::Client;
use meilisearch_sdk::errors::{Error as MeiliError, ErrorCode};
use meilisearch_sdk::search::{MatchingStrategies, SearchResults};
use meilisearch_sdk::task_info::TaskInfo;
use meilisearch_sdk::tasks::Task;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Document shape stored in Meilisearch
#[derive(Debug, Serialize, Deserialize)]
struct StoredDocument {
    /// Primary key; see [`utils::storage_id`]
    id: String,
    /// Caller id when it had to be hashed into `id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    source_id: Option<String>,
    content: String,
}

impl StoredDocument {
    fn from_document(document: &Document) -> Self {
        match &document.id {
            Some(raw) => {
                let id = utils::storage_id(raw);
                let source_id = (id != *raw).then(|| raw.clone());
                Self {
                    id,
                    source_id,
                    content: document.content.clone(),
                }
            }
            // Meilisearch never generates ids, so append semantics come from a fresh UUID
            None => Self {
                id: uuid::Uuid::new_v4().to_string(),
                source_id: None,
                content: document.content.clone(),
            },
        }
    }
}

/// Meilisearch implementation of the IndexGateway trait
pub struct MeilisearchGateway {
    client: Client,
    documents_index: String,
    excel_index: String,
    timeout: Duration,
}

impl MeilisearchGateway {
    /// Connect and make sure both corpus indexes exist with `id` as primary key
    pub async fn connect(config: &Config) -> AskResult<Self> {
        let api_key = config.meilisearch_api_key();
        let client = Client::new(config.meilisearch.url.clone(), api_key)?;

        let gateway = Self {
            client,
            documents_index: config.index_name(Corpus::Documents).to_string(),
            excel_index: config.index_name(Corpus::Spreadsheets).to_string(),
            timeout: config.index_timeout(),
        };

        for corpus in [Corpus::Documents, Corpus::Spreadsheets] {
            gateway.ensure_index(corpus).await?;
        }

        Ok(gateway)
    }

    fn index_uid(&self, corpus: Corpus) -> &str {
        match corpus {
            Corpus::Documents => &self.documents_index,
            Corpus::Spreadsheets => &self.excel_index,
        }
    }

    async fn ensure_index(&self, corpus: Corpus) -> AskResult<()> {
        let uid = self.index_uid(corpus);

        match self.bounded(self.client.get_index(uid)).await? {
            Ok(_) => {}
            Err(MeiliError::Meilisearch(e)) if matches!(e.error_code, ErrorCode::IndexNotFound) => {
                tracing::info!(index = uid, "creating index");
                let task = self
                    .bounded(self.client.create_index(uid, Some("id")))
                    .await??;
                self.wait(task).await?;
            }
            Err(e) => return Err(e.into()),
        }

        let index = self.client.index(uid);
        let task = self
            .bounded(index.set_searchable_attributes(["content"]))
            .await??;
        self.wait(task).await
    }

    /// Bound a call to the search service by the configured timeout
    async fn bounded<F: Future>(&self, fut: F) -> AskResult<F::Output> {
        tokio::time::timeout(self.timeout, fut)
            .await
            .map_err(|_| AskError::index(format!("no response within {:?}", self.timeout)))
    }

    /// Wait for an enqueued task and surface its failure, if any
    async fn wait(&self, task: TaskInfo) -> AskResult<()> {
        let task = task
            .wait_for_completion(&self.client, None, Some(self.timeout))
            .await?;
        match task {
            Task::Failed { content } => Err(AskError::index(content.error.to_string())),
            _ => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl IndexGateway for MeilisearchGateway {
    async fn index(&self, corpus: Corpus, document: &Document) -> AskResult<String> {
        document.validate()?;
        let stored = StoredDocument::from_document(document);
        let uid = self.index_uid(corpus);
        let index = self.client.index(uid);

        // add_or_replace with the same id overwrites the whole document
        let task = self
            .bounded(index.add_or_replace(&[&stored], Some("id")))
            .await??;
        self.wait(task).await?;

        tracing::info!(index = uid, id = %stored.id, "indexed document");
        Ok(document.id.clone().unwrap_or(stored.id))
    }

    async fn query(&self, corpus: Corpus, text: &str, limit: usize) -> AskResult<RetrievalResult> {
        // An empty query would be a placeholder search returning everything
        if text.trim().is_empty() || limit == 0 {
            return Ok(RetrievalResult::default());
        }

        let uid = self.index_uid(corpus);
        let index = self.client.index(uid);
        let mut search = index.search();
        search
            .with_query(text)
            .with_limit(limit)
            .with_matching_strategy(MatchingStrategies::FREQUENCY);

        let results: SearchResults<StoredDocument> = self.bounded(search.execute()).await??;

        let passages: Vec<String> = results
            .hits
            .into_iter()
            .map(|hit| hit.result.content)
            .collect();
        tracing::debug!(index = uid, hits = passages.len(), "query complete");

        Ok(RetrievalResult::new(passages))
    }
}
