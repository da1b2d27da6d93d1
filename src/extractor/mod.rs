pub mod html;
pub mod spreadsheet;

pub use html::{visible_body_text, UrlFetcher};
pub use spreadsheet::SpreadsheetReader;

use crate::config::FetchConfig;
use crate::error::{AskError, AskResult};
use crate::models::Document;

/// Raw input accepted for ingestion
#[derive(Debug, Clone)]
pub enum SourceInput {
    /// Client-supplied text, with an optional id
    Text { id: Option<String>, content: String },
    /// Web page to fetch and strip down to its body text
    Url(String),
    /// Uploaded workbook bytes and the name it was uploaded under
    Spreadsheet { file_name: String, bytes: Vec<u8> },
}

/// Normalizes every [`SourceInput`] variant into a flat-text [`Document`]
pub struct ContentExtractor {
    fetcher: UrlFetcher,
}

impl ContentExtractor {
    pub fn new(config: &FetchConfig) -> AskResult<Self> {
        Ok(Self {
            fetcher: UrlFetcher::new(config)?,
        })
    }

    /// Produce the document for one input.
    ///
    /// A fetched page with an empty body still yields a document with empty
    /// content; deciding whether to index it is the caller's job.
    pub async fn extract(&self, input: SourceInput) -> AskResult<Document> {
        match input {
            SourceInput::Text { id, content } => Ok(Document { id, content }),
            SourceInput::Url(url) => {
                let content = self.fetcher.fetch_text(&url).await?;
                Ok(Document::new(content))
            }
            SourceInput::Spreadsheet { file_name, bytes } => {
                tokio::task::spawn_blocking(move || {
                    SpreadsheetReader::to_document(&file_name, &bytes)
                })
                .await
                .map_err(|e| {
                    AskError::FormatUnsupported(format!("spreadsheet parser failed: {}", e))
                })?
            }
        }
    }
}
