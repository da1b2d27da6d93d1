pub mod config;
pub mod error;
pub mod extractor;
pub mod indexer;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod retrieval;
pub mod retry;
pub mod service;
pub mod utils;

pub use config::Config;
pub use error::{AskError, AskResult};
pub use indexer::{IndexGateway, MeilisearchGateway, MemoryIndex};
pub use llm::{LlmGateway, LlmProvider};
pub use models::{CompletionRequest, Corpus, Document, PromptMode, ProviderKind};
pub use service::{AskService, Indexed};
