pub mod meili;
pub mod memory;
pub mod r#trait;

pub use meili::MeilisearchGateway;
pub use memory::MemoryIndex;
pub use r#trait::IndexGateway;
