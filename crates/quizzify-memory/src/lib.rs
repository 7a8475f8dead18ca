//! Page-level document storage, chunking, deduplication and the similarity
//! index that backs quiz retrieval.

pub mod document;
pub mod error;
pub mod in_memory_store;
pub mod index;
#[cfg(feature = "qdrant")]
pub mod qdrant_ops;
pub mod retriever;
pub mod snapshot;
pub mod vector_store;

pub use error::MemoryError;
pub use in_memory_store::InMemoryVectorStore;
pub use index::{ActiveIndex, BuilderConfig, ChunkIndex, ScoredChunk, VectorIndexBuilder};
#[cfg(feature = "qdrant")]
pub use qdrant_ops::QdrantOps;
pub use retriever::{IndexRetriever, Retriever};
pub use snapshot::IndexSnapshot;
pub use vector_store::{ScoredVectorPoint, VectorPoint, VectorStore, VectorStoreError};
