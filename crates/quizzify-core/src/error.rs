use std::time::Duration;

use quizzify_llm::LlmError;
use quizzify_memory::MemoryError;

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error("invalid quiz request: {0}")]
    InvalidRequest(String),

    #[error("nothing to index: no chunks were produced")]
    EmptyInput,

    #[error("no index has been built yet")]
    NoIndex,

    #[error("embedding service failed: {0}")]
    EmbeddingService(#[source] LlmError),

    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    #[error("question bank is empty")]
    EmptyBank,

    #[error("generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("memory error: {0}")]
    Memory(#[source] MemoryError),
}

impl QuizError {
    /// Failures that only spoil one question attempt.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedResponse(_) | Self::Llm(_) | Self::Timeout(_)
        )
    }
}

impl From<MemoryError> for QuizError {
    fn from(e: MemoryError) -> Self {
        match e {
            MemoryError::EmptyInput => Self::EmptyInput,
            MemoryError::NoIndex => Self::NoIndex,
            MemoryError::EmbeddingService(inner) => Self::EmbeddingService(inner),
            other => Self::Memory(other),
        }
    }
}
