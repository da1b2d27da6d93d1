use crate::error::{AskError, AskResult};
use crate::indexer::IndexGateway;
use crate::models::{Corpus, Document, RetrievalResult};
use crate::utils::tokenize;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

#[derive(Debug, Default)]
struct Partition {
    /// Insertion order, used to break ranking ties
    order: Vec<String>,
    contents: HashMap<String, String>,
}

/// In-process index with the same upsert and ranking contract as Meilisearch.
///
/// Documents rank by how many distinct query terms they contain; documents
/// sharing no term with the query are not returned.
#[derive(Debug, Default)]
pub struct MemoryIndex {
    partitions: RwLock<HashMap<Corpus, Partition>>,
}

impl MemoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents stored in a corpus
    pub fn len(&self, corpus: Corpus) -> usize {
        self.partitions
            .read()
            .map(|p| p.get(&corpus).map_or(0, |part| part.order.len()))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, corpus: Corpus) -> bool {
        self.len(corpus) == 0
    }
}

#[async_trait::async_trait]
impl IndexGateway for MemoryIndex {
    async fn index(&self, corpus: Corpus, document: &Document) -> AskResult<String> {
        document.validate()?;
        let id = document
            .id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let mut partitions = self
            .partitions
            .write()
            .map_err(|_| AskError::index("memory index lock poisoned"))?;
        let partition = partitions.entry(corpus).or_default();
        if partition
            .contents
            .insert(id.clone(), document.content.clone())
            .is_none()
        {
            partition.order.push(id.clone());
        }

        Ok(id)
    }

    async fn query(&self, corpus: Corpus, text: &str, limit: usize) -> AskResult<RetrievalResult> {
        let terms: HashSet<String> = tokenize(text).into_iter().collect();
        if terms.is_empty() {
            return Ok(RetrievalResult::default());
        }

        let partitions = self
            .partitions
            .read()
            .map_err(|_| AskError::index("memory index lock poisoned"))?;
        let Some(partition) = partitions.get(&corpus) else {
            return Ok(RetrievalResult::default());
        };

        let mut scored: Vec<(usize, usize, &String)> = partition
            .order
            .iter()
            .enumerate()
            .filter_map(|(position, id)| {
                let content = partition.contents.get(id)?;
                let doc_terms: HashSet<String> = tokenize(content).into_iter().collect();
                let score = terms.intersection(&doc_terms).count();
                (score > 0).then_some((score, position, content))
            })
            .collect();

        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));

        Ok(RetrievalResult::new(
            scored
                .into_iter()
                .take(limit)
                .map(|(_, _, content)| content.clone())
                .collect(),
        ))
    }
}
