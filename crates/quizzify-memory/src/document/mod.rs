pub mod dedup;
pub mod error;
pub mod loader;
pub mod pipeline;
pub mod splitter;
pub mod store;
pub mod types;

pub use dedup::Deduplicator;
pub use error::DocumentError;
pub use loader::{DocumentLoader, TextLoader, loader_for_path};
pub use pipeline::{IndexSummary, IngestionPipeline};
pub use splitter::{CharacterSplitter, SplitterConfig};
pub use store::DocumentStore;
pub use types::{Chunk, ChunkMetadata, LoadedDocument, PageUnit};

#[cfg(feature = "pdf")]
pub use loader::PdfLoader;

/// Default maximum file size: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
