use quizzify_llm::LlmError;

use crate::document::DocumentError;
use crate::vector_store::VectorStoreError;

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
    #[error("no chunks to index")]
    EmptyInput,

    #[error("no index has been built yet")]
    NoIndex,

    #[error("embedding service failed: {0}")]
    EmbeddingService(#[source] LlmError),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("vector store error: {0}")]
    VectorStore(#[from] VectorStoreError),

    #[error("document error: {0}")]
    Document(#[from] DocumentError),

    #[error("malformed index payload: {0}")]
    Payload(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
