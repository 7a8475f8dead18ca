use std::collections::VecDeque;

use super::types::{Chunk, ChunkMetadata, PageUnit};
use super::DocumentError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitterConfig {
    /// Literal separator; an empty string splits per character.
    pub separator: String,
    /// Maximum chunk length in characters, separators included.
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for SplitterConfig {
    fn default() -> Self {
        Self {
            separator: "\n".to_owned(),
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

impl SplitterConfig {
    /// # Errors
    ///
    /// Returns [`DocumentError::InvalidSplitter`] when `chunk_size` is zero or
    /// smaller than `chunk_overlap`.
    pub fn validate(&self) -> Result<(), DocumentError> {
        if self.chunk_size == 0 {
            return Err(DocumentError::InvalidSplitter(
                "chunk_size must be greater than zero".into(),
            ));
        }
        if self.chunk_overlap > self.chunk_size {
            return Err(DocumentError::InvalidSplitter(format!(
                "chunk_overlap ({}) is larger than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Splits page text on a literal separator and packs the pieces into chunks
/// that share a bounded tail with their predecessor.
#[derive(Debug, Clone)]
pub struct CharacterSplitter {
    config: SplitterConfig,
}

impl CharacterSplitter {
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: SplitterConfig) -> Result<Self, DocumentError> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &SplitterConfig {
        &self.config
    }

    #[must_use]
    pub fn split(&self, text: &str) -> Vec<String> {
        let pieces: Vec<&str> = if self.config.separator.is_empty() {
            text.char_indices()
                .map(|(i, c)| &text[i..i + c.len_utf8()])
                .collect()
        } else {
            text.split(self.config.separator.as_str())
                .filter(|p| !p.is_empty())
                .collect()
        };
        self.merge(&pieces)
    }

    /// Split one page and tag every chunk with the page's provenance.
    #[must_use]
    pub fn split_page(&self, page: &PageUnit) -> Vec<Chunk> {
        self.split(&page.text)
            .into_iter()
            .zip(1u32..)
            .map(|(text, chunk_index)| Chunk {
                text,
                metadata: ChunkMetadata {
                    source: page.source.clone(),
                    page_number: page.page_number,
                    document_id: page.document_id,
                    chunk_index,
                },
            })
            .collect()
    }

    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let separator = self.config.separator.as_str();
        let sep_len = separator.chars().count();
        let chunk_size = self.config.chunk_size;
        let chunk_overlap = self.config.chunk_overlap;

        let mut chunks = Vec::new();
        let mut window: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for piece in pieces {
            let len = piece.chars().count();
            if len > chunk_size {
                tracing::warn!(
                    size = len,
                    chunk_size,
                    "piece longer than chunk size kept as a single chunk"
                );
            }

            let joiner = if window.is_empty() { 0 } else { sep_len };
            if total + len + joiner > chunk_size && !window.is_empty() {
                push_joined(&mut chunks, &window, separator);

                // Shrink the carried tail until it fits the overlap and leaves room for `piece`.
                while total > chunk_overlap
                    || (total > 0
                        && total + len + if window.is_empty() { 0 } else { sep_len } > chunk_size)
                {
                    let Some((_, front_len)) = window.pop_front() else {
                        break;
                    };
                    total -= front_len + if window.is_empty() { 0 } else { sep_len };
                }
            }

            let joiner = if window.is_empty() { 0 } else { sep_len };
            window.push_back((piece, len));
            total += len + joiner;
        }

        push_joined(&mut chunks, &window, separator);
        chunks
    }
}

fn push_joined(chunks: &mut Vec<String>, window: &VecDeque<(&str, usize)>, separator: &str) {
    if window.is_empty() {
        return;
    }
    let joined = window
        .iter()
        .map(|(piece, _)| *piece)
        .collect::<Vec<_>>()
        .join(separator);
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_owned());
    }
}
