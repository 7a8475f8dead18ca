use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::MemoryError;
use crate::index::ChunkIndex;
use crate::vector_store::{VectorPoint, VectorStore};

const SNAPSHOT_FILE: &str = "index.json";

/// On-disk copy of a built index, enough to reinstall it without re-embedding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSnapshot {
    pub collection: String,
    pub dimension: u64,
    pub points: Vec<VectorPoint>,
}

impl IndexSnapshot {
    #[must_use]
    pub fn new(index: &ChunkIndex, points: Vec<VectorPoint>) -> Self {
        Self {
            collection: index.collection().to_owned(),
            dimension: index.dimension(),
            points,
        }
    }

    #[must_use]
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(SNAPSHOT_FILE)
    }

    /// Write `index.json` into `dir`, replacing any previous snapshot atomically.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or any filesystem step fails.
    pub async fn save(&self, dir: &Path) -> Result<(), MemoryError> {
        tokio::fs::create_dir_all(dir).await?;
        let json = serde_json::to_vec(self)?;
        let target = Self::path_in(dir);
        let tmp = target.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &target).await?;
        tracing::debug!(path = %target.display(), points = self.points.len(), "index snapshot written");
        Ok(())
    }

    /// Read the snapshot in `dir`, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(dir: &Path) -> Result<Option<Self>, MemoryError> {
        let path = Self::path_in(dir);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    /// Make the snapshot's collection available in `store`.
    ///
    /// A durable backend that still holds the collection is reused as is;
    /// otherwise the stored points are written back.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the collection or its points.
    pub async fn restore(self, store: &dyn VectorStore) -> Result<ChunkIndex, MemoryError> {
        let len = self.points.len();
        if store.collection_exists(&self.collection).await? {
            tracing::info!(collection = %self.collection, "reusing existing collection");
        } else {
            store
                .ensure_collection(&self.collection, self.dimension)
                .await?;
            store.upsert(&self.collection, self.points).await?;
            tracing::info!(collection = %self.collection, points = len, "collection restored from snapshot");
        }
        Ok(ChunkIndex::new(self.collection, self.dimension, len))
    }
}
