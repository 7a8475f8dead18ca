use std::future::Future;
use std::sync::Arc;

use quizzify_llm::LlmProvider;

use crate::document::Chunk;
use crate::error::MemoryError;
use crate::index::{ActiveIndex, ScoredChunk};
use crate::vector_store::VectorStore;

/// Similarity lookup over whatever index is currently active.
pub trait Retriever: Send + Sync {
    /// Up to `k` chunks ordered by descending score. An empty result is a
    /// normal outcome, not an error.
    fn retrieve(
        &self,
        query: &str,
        k: usize,
    ) -> impl Future<Output = Result<Vec<ScoredChunk>, MemoryError>> + Send;
}

pub struct IndexRetriever<P> {
    provider: P,
    store: Arc<dyn VectorStore>,
    active: Arc<ActiveIndex>,
}

impl<P: LlmProvider> IndexRetriever<P> {
    #[must_use]
    pub fn new(provider: P, store: Arc<dyn VectorStore>, active: Arc<ActiveIndex>) -> Self {
        Self {
            provider,
            store,
            active,
        }
    }
}

impl<P: LlmProvider> Retriever for IndexRetriever<P> {
    async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, MemoryError> {
        if k == 0 {
            return Err(MemoryError::InvalidQuery("k must be at least 1".into()));
        }
        let Some(index) = self.active.current() else {
            return Err(MemoryError::NoIndex);
        };

        let vector = self
            .provider
            .embed(query)
            .await
            .map_err(MemoryError::EmbeddingService)?;
        let hits = self
            .store
            .search(index.collection(), vector, k as u64)
            .await?;

        let mut results = hits
            .into_iter()
            .map(|hit| {
                Ok((
                    hit.id,
                    ScoredChunk {
                        chunk: Chunk::from_payload(&hit.payload)?,
                        score: hit.score,
                    },
                ))
            })
            .collect::<Result<Vec<_>, MemoryError>>()?;

        results.sort_by(|(id_a, a), (id_b, b)| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| id_a.cmp(id_b))
        });

        if results.is_empty() {
            tracing::info!(query, collection = index.collection(), "no matches");
        } else {
            tracing::debug!(query, hits = results.len(), "retrieved context");
        }
        Ok(results.into_iter().map(|(_, scored)| scored).collect())
    }
}
