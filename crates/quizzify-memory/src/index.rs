use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};

use quizzify_llm::{LlmError, LlmProvider};
use uuid::Uuid;

use crate::document::Chunk;
use crate::error::MemoryError;
use crate::snapshot::IndexSnapshot;
use crate::vector_store::{VectorPoint, VectorStore};

/// Handle to one fully written collection of chunk embeddings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkIndex {
    collection: String,
    dimension: u64,
    len: usize,
}

impl ChunkIndex {
    pub(crate) fn new(collection: String, dimension: u64, len: usize) -> Self {
        Self {
            collection,
            dimension,
            len,
        }
    }

    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    #[must_use]
    pub fn dimension(&self) -> u64 {
        self.dimension
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// A retrieved chunk and its relevance. Only the ordering of scores is meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: f32,
}

/// Point id derived from the chunk text, so equal content maps to the same point.
#[must_use]
pub fn point_id(text: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_OID, text.trim().as_bytes()).to_string()
}

#[derive(Debug, Clone)]
pub struct BuilderConfig {
    pub collection_prefix: String,
    pub batch_size: usize,
    /// When set, every successful build also writes `index.json` here.
    pub snapshot_dir: Option<PathBuf>,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            collection_prefix: "quizzify".into(),
            batch_size: 32,
            snapshot_dir: None,
        }
    }
}

/// Embeds chunks and writes them into a fresh collection.
///
/// A build is all-or-nothing: the collection is only created after every
/// embedding has been obtained, and is removed again if writing fails.
pub struct VectorIndexBuilder<P> {
    provider: P,
    store: Arc<dyn VectorStore>,
    config: BuilderConfig,
}

impl<P: LlmProvider> VectorIndexBuilder<P> {
    #[must_use]
    pub fn new(provider: P, store: Arc<dyn VectorStore>, config: BuilderConfig) -> Self {
        Self {
            provider,
            store,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// # Errors
    ///
    /// Returns [`MemoryError::EmptyInput`] for an empty chunk list,
    /// [`MemoryError::EmbeddingService`] if any embedding fails, or a store
    /// error if the collection cannot be written.
    pub async fn build(&self, chunks: &[Chunk]) -> Result<ChunkIndex, MemoryError> {
        if chunks.is_empty() {
            return Err(MemoryError::EmptyInput);
        }

        let vectors = self.embed_all(chunks).await?;
        let dimension = vectors.first().map_or(0, Vec::len);
        if dimension == 0 {
            return Err(MemoryError::EmbeddingService(LlmError::Other(
                "embedding backend returned an empty vector".into(),
            )));
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != dimension) {
            return Err(MemoryError::EmbeddingService(LlmError::Other(format!(
                "inconsistent embedding dimensions: {dimension} and {}",
                bad.len()
            ))));
        }

        let points = chunks
            .iter()
            .zip(vectors)
            .map(|(chunk, vector)| {
                Ok(VectorPoint {
                    id: point_id(&chunk.text),
                    vector,
                    payload: chunk.to_payload()?,
                })
            })
            .collect::<Result<Vec<_>, MemoryError>>()?;

        let collection = format!("{}-{}", self.config.collection_prefix, Uuid::new_v4().simple());
        let dimension = dimension as u64;
        self.write_collection(&collection, dimension, points.clone())
            .await?;

        let index = ChunkIndex::new(collection, dimension, points.len());
        tracing::info!(
            collection = index.collection(),
            chunks = index.len(),
            dimension,
            "index built"
        );

        if let Some(dir) = &self.config.snapshot_dir {
            let snapshot = IndexSnapshot::new(&index, points);
            if let Err(e) = snapshot.save(dir).await {
                tracing::warn!(dir = %dir.display(), "failed to write index snapshot: {e:#}");
            }
        }

        Ok(index)
    }

    async fn embed_all(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>, MemoryError> {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(self.config.batch_size.max(1)) {
            let embedded = self
                .provider
                .embed_batch(batch)
                .await
                .map_err(MemoryError::EmbeddingService)?;
            if embedded.len() != batch.len() {
                return Err(MemoryError::EmbeddingService(LlmError::EmbeddingCount {
                    expected: batch.len(),
                    actual: embedded.len(),
                }));
            }
            tracing::debug!(batch = batch.len(), "embedded chunk batch");
            vectors.extend(embedded);
        }
        Ok(vectors)
    }

    async fn write_collection(
        &self,
        collection: &str,
        dimension: u64,
        points: Vec<VectorPoint>,
    ) -> Result<(), MemoryError> {
        self.store.ensure_collection(collection, dimension).await?;
        if let Err(e) = self.store.upsert(collection, points).await {
            if let Err(cleanup) = self.store.delete_collection(collection).await {
                tracing::warn!(collection, "failed to remove partial collection: {cleanup}");
            }
            return Err(e.into());
        }
        Ok(())
    }
}

/// The index queries currently run against.
///
/// Readers take a cheap `Arc` clone; a rebuild swaps in a completed index in
/// one step, so no query ever sees a partially written one.
#[derive(Debug, Default)]
pub struct ActiveIndex {
    current: RwLock<Option<Arc<ChunkIndex>>>,
}

impl ActiveIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the active index, returning the one it displaced.
    pub fn install(&self, index: ChunkIndex) -> Option<Arc<ChunkIndex>> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        guard.replace(Arc::new(index))
    }

    #[must_use]
    pub fn current(&self) -> Option<Arc<ChunkIndex>> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_built(&self) -> bool {
        self.current().is_some()
    }

    /// Drop the collection behind a displaced index once nobody else holds it.
    pub async fn retire(previous: Arc<ChunkIndex>, store: &dyn VectorStore) {
        match Arc::try_unwrap(previous) {
            Ok(index) => {
                if let Err(e) = store.delete_collection(index.collection()).await {
                    tracing::warn!(
                        collection = index.collection(),
                        "failed to delete previous collection: {e}"
                    );
                } else {
                    tracing::debug!(collection = index.collection(), "previous collection deleted");
                }
            }
            Err(shared) => {
                tracing::warn!(
                    collection = shared.collection(),
                    "previous index still in use, collection left in place"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use quizzify_llm::mock::MockProvider;

    use super::*;
    use crate::document::ChunkMetadata;
    use crate::in_memory_store::InMemoryVectorStore;

    fn chunk(text: &str, chunk_index: u32) -> Chunk {
        Chunk {
            text: text.into(),
            metadata: ChunkMetadata {
                source: "test.pdf".into(),
                page_number: 1,
                document_id: Uuid::nil(),
                chunk_index,
            },
        }
    }

    fn builder(provider: MockProvider, store: Arc<InMemoryVectorStore>) -> VectorIndexBuilder<MockProvider> {
        VectorIndexBuilder::new(provider, store, BuilderConfig {
            batch_size: 2,
            ..BuilderConfig::default()
        })
    }

    #[tokio::test]
    async fn empty_input_rejected_before_backend() {
        let store = Arc::new(InMemoryVectorStore::new());
        let b = builder(MockProvider::default(), store.clone());
        assert!(matches!(b.build(&[]).await, Err(MemoryError::EmptyInput)));
        assert!(store.collections().is_empty());
    }

    #[tokio::test]
    async fn build_writes_all_chunks_across_batches() {
        let store = Arc::new(InMemoryVectorStore::new());
        let b = builder(MockProvider::default(), store.clone());
        let chunks = vec![
            chunk("volcanoes erupt lava", 1),
            chunk("glaciers carve valleys", 2),
            chunk("rivers deposit sediment", 3),
        ];

        let index = b.build(&chunks).await.unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index.dimension(), 64);
        assert!(index.collection().starts_with("quizzify-"));
        assert!(store.collection_exists(index.collection()).await.unwrap());
    }

    #[tokio::test]
    async fn embedding_failure_leaves_no_collection() {
        let store = Arc::new(InMemoryVectorStore::new());
        let provider = MockProvider::default().with_embed_failure("poison");
        let b = builder(provider, store.clone());
        let chunks = vec![
            chunk("fine text", 1),
            chunk("more fine text", 2),
            chunk("poison pill", 3),
        ];

        let result = b.build(&chunks).await;
        assert!(matches!(result, Err(MemoryError::EmbeddingService(_))));
        assert!(store.collections().is_empty());
    }

    #[test]
    fn point_id_is_content_keyed() {
        assert_eq!(point_id("abc"), point_id("  abc\n"));
        assert_ne!(point_id("abc"), point_id("abd"));
    }

    #[test]
    fn install_swaps_and_returns_previous() {
        let active = ActiveIndex::new();
        assert!(!active.is_built());
        assert!(active.install(ChunkIndex::new("a".into(), 4, 1)).is_none());

        let reader = active.current().unwrap();
        let previous = active.install(ChunkIndex::new("b".into(), 4, 2)).unwrap();
        assert_eq!(previous.collection(), "a");
        assert_eq!(reader.collection(), "a");
        assert_eq!(active.current().unwrap().collection(), "b");
    }

    #[tokio::test]
    async fn retire_deletes_unshared_collection() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("old", 2).await.unwrap();
        ActiveIndex::retire(Arc::new(ChunkIndex::new("old".into(), 2, 0)), &store).await;
        assert!(!store.collection_exists("old").await.unwrap());
    }

    #[tokio::test]
    async fn retire_keeps_collection_while_shared() {
        let store = InMemoryVectorStore::new();
        store.ensure_collection("old", 2).await.unwrap();
        let index = Arc::new(ChunkIndex::new("old".into(), 2, 0));
        let _reader = Arc::clone(&index);
        ActiveIndex::retire(index, &store).await;
        assert!(store.collection_exists("old").await.unwrap());
    }
}
