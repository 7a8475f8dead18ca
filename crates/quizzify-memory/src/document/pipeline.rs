use std::path::Path;
use std::sync::Arc;

use quizzify_llm::LlmProvider;

use super::{CharacterSplitter, Chunk, Deduplicator, DocumentStore, PageUnit};
use crate::error::MemoryError;
use crate::index::{ActiveIndex, ChunkIndex, VectorIndexBuilder};
use crate::retriever::IndexRetriever;
use crate::snapshot::IndexSnapshot;
use crate::vector_store::VectorStore;

/// Outcome of one rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSummary {
    pub pages: usize,
    pub chunks: usize,
    pub duplicates: usize,
    pub collection: String,
}

/// Pages -> chunks -> deduplicated chunks -> embedded index -> active index.
pub struct IngestionPipeline<P> {
    splitter: CharacterSplitter,
    builder: VectorIndexBuilder<P>,
    store: Arc<dyn VectorStore>,
    active: Arc<ActiveIndex>,
}

impl<P: LlmProvider> IngestionPipeline<P> {
    #[must_use]
    pub fn new(
        splitter: CharacterSplitter,
        builder: VectorIndexBuilder<P>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        Self {
            splitter,
            builder,
            store,
            active: Arc::new(ActiveIndex::new()),
        }
    }

    #[must_use]
    pub fn active(&self) -> &Arc<ActiveIndex> {
        &self.active
    }

    /// Split every page in order, dropping repeated chunk texts.
    /// Returns the kept chunks and the number dropped.
    #[must_use]
    pub fn chunk_pages(&self, pages: &[PageUnit]) -> (Vec<Chunk>, usize) {
        let mut dedup = Deduplicator::new();
        let chunks: Vec<Chunk> = pages
            .iter()
            .flat_map(|page| self.splitter.split_page(page))
            .filter(|chunk| !dedup.is_duplicate(&chunk.text))
            .collect();
        (chunks, dedup.duplicates())
    }

    /// Build a new index from the whole store and make it the active one.
    ///
    /// The previous index stays queryable until the new one is complete.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::EmptyInput`] when there is nothing to index, or
    /// any error from the build; in both cases the active index is untouched.
    pub async fn rebuild(&self, documents: &DocumentStore) -> Result<IndexSummary, MemoryError> {
        if documents.is_empty() {
            return Err(MemoryError::EmptyInput);
        }

        let (chunks, duplicates) = self.chunk_pages(documents.pages());
        tracing::info!(
            pages = documents.len(),
            chunks = chunks.len(),
            duplicates,
            "pages chunked"
        );

        let index = self.builder.build(&chunks).await?;
        let summary = IndexSummary {
            pages: documents.len(),
            chunks: index.len(),
            duplicates,
            collection: index.collection().to_owned(),
        };
        self.install(index).await;
        Ok(summary)
    }

    /// Reinstall the index persisted in `dir`, if any, without re-embedding.
    ///
    /// # Errors
    ///
    /// Returns an error if the snapshot is unreadable or cannot be restored.
    pub async fn restore(&self, dir: &Path) -> Result<Option<Arc<ChunkIndex>>, MemoryError> {
        let Some(snapshot) = IndexSnapshot::load(dir).await? else {
            tracing::debug!(dir = %dir.display(), "no index snapshot found");
            return Ok(None);
        };
        let index = snapshot.restore(self.store.as_ref()).await?;
        self.install(index).await;
        Ok(self.active.current())
    }

    async fn install(&self, index: ChunkIndex) {
        if let Some(previous) = self.active.install(index) {
            ActiveIndex::retire(previous, self.store.as_ref()).await;
        }
    }
}

impl<P: LlmProvider + Clone> IngestionPipeline<P> {
    /// A retriever that always follows this pipeline's active index.
    #[must_use]
    pub fn retriever(&self, provider: P) -> IndexRetriever<P> {
        IndexRetriever::new(provider, Arc::clone(&self.store), Arc::clone(&self.active))
    }
}

#[cfg(test)]
mod tests {
    use quizzify_llm::mock::MockProvider;

    use super::*;
    use crate::document::SplitterConfig;
    use crate::in_memory_store::InMemoryVectorStore;
    use crate::index::BuilderConfig;

    fn pipeline(provider: MockProvider) -> (IngestionPipeline<MockProvider>, Arc<InMemoryVectorStore>) {
        let store = Arc::new(InMemoryVectorStore::new());
        let splitter = CharacterSplitter::new(SplitterConfig {
            separator: "\n".into(),
            chunk_size: 20,
            chunk_overlap: 0,
        })
        .unwrap();
        let builder = VectorIndexBuilder::new(provider, store.clone(), BuilderConfig::default());
        (IngestionPipeline::new(splitter, builder, store.clone()), store)
    }

    #[tokio::test]
    async fn empty_store_is_empty_input() {
        let (p, _) = pipeline(MockProvider::default());
        let result = p.rebuild(&DocumentStore::new()).await;
        assert!(matches!(result, Err(MemoryError::EmptyInput)));
        assert!(!p.active().is_built());
    }

    #[tokio::test]
    async fn blank_pages_are_empty_input() {
        let (p, _) = pipeline(MockProvider::default());
        let mut docs = DocumentStore::new();
        docs.add_document("blank.pdf", vec!["  ".into(), "\n\n".into()]);
        assert!(matches!(p.rebuild(&docs).await, Err(MemoryError::EmptyInput)));
    }

    #[tokio::test]
    async fn repeated_chunks_dropped() {
        let (p, _) = pipeline(MockProvider::default());
        let mut docs = DocumentStore::new();
        docs.add_document("a.pdf", vec![
            "Header line\nunique body one".into(),
            "Header line\nunique body two".into(),
        ]);
        docs.add_document("b.pdf", vec!["Header line".into()]);

        let (chunks, duplicates) = p.chunk_pages(docs.pages());
        assert_eq!(duplicates, 2);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].text, "Header line");
        assert_eq!(chunks[1].text, "unique body one");

        let summary = p.rebuild(&docs).await.unwrap();
        assert_eq!(summary.pages, 3);
        assert_eq!(summary.chunks, 3);
        assert_eq!(summary.duplicates, 2);
    }

    #[tokio::test]
    async fn rebuild_replaces_and_drops_previous_collection() {
        let (p, store) = pipeline(MockProvider::default());
        let mut docs = DocumentStore::new();
        docs.add_document("a.pdf", vec!["first content".into()]);

        let first = p.rebuild(&docs).await.unwrap();
        let second = p.rebuild(&docs).await.unwrap();

        assert_ne!(first.collection, second.collection);
        assert_eq!(store.collections(), vec![second.collection.clone()]);
        assert_eq!(p.active().current().unwrap().collection(), second.collection);
    }

    #[tokio::test]
    async fn failed_rebuild_keeps_previous_index() {
        let (p, store) = pipeline(MockProvider::default().with_embed_failure("poison"));
        let mut docs = DocumentStore::new();
        docs.add_document("a.pdf", vec!["healthy page".into()]);
        let first = p.rebuild(&docs).await.unwrap();

        docs.add_document("b.pdf", vec!["poison page".into()]);
        assert!(matches!(
            p.rebuild(&docs).await,
            Err(MemoryError::EmbeddingService(_))
        ));
        assert_eq!(p.active().current().unwrap().collection(), first.collection);
        assert_eq!(store.collections(), vec![first.collection]);
    }

    #[tokio::test]
    async fn restore_without_snapshot_is_none() {
        let (p, _) = pipeline(MockProvider::default());
        let dir = tempfile::tempdir().unwrap();
        assert!(p.restore(dir.path()).await.unwrap().is_none());
        assert!(!p.active().is_built());
    }
}
