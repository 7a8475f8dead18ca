use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MemoryError;

/// Text of one extracted page together with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageUnit {
    pub text: String,
    pub source: String,
    /// 1-based position of the page inside its document.
    pub page_number: u32,
    pub document_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    pub source: String,
    pub page_number: u32,
    pub document_id: Uuid,
    /// 1-based, sequential within the source page.
    pub chunk_index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    #[serde(flatten)]
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Flatten the chunk into a vector store payload.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_payload(&self) -> Result<HashMap<String, serde_json::Value>, MemoryError> {
        match serde_json::to_value(self)? {
            serde_json::Value::Object(map) => Ok(map.into_iter().collect()),
            other => Err(MemoryError::Payload(format!(
                "chunk serialized to non-object value: {other}"
            ))),
        }
    }

    /// Rebuild a chunk from a vector store payload.
    ///
    /// # Errors
    ///
    /// Returns [`MemoryError::Payload`] if required fields are missing or mistyped.
    pub fn from_payload(payload: &HashMap<String, serde_json::Value>) -> Result<Self, MemoryError> {
        let object: serde_json::Map<String, serde_json::Value> = payload
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        serde_json::from_value(serde_json::Value::Object(object))
            .map_err(|e| MemoryError::Payload(e.to_string()))
    }
}

/// Raw output of a loader: page texts in order plus a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedDocument {
    pub source: String,
    pub pages: Vec<String>,
}
