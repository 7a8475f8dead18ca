use std::collections::HashMap;

/// Drops repeated chunk texts within one chunking pass.
///
/// Texts are compared after trimming surrounding whitespace. The blake3 digest
/// only selects a bucket; membership is decided by comparing the full text, so
/// distinct texts are never reported as duplicates.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashMap<blake3::Hash, Vec<String>>,
    duplicates: usize,
}

impl Deduplicator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when `text` was already seen in this pass. A first
    /// occurrence is recorded and reported as `false`.
    pub fn is_duplicate(&mut self, text: &str) -> bool {
        let normalized = text.trim();
        let bucket = self
            .seen
            .entry(blake3::hash(normalized.as_bytes()))
            .or_default();

        if bucket.iter().any(|existing| existing == normalized) {
            self.duplicates += 1;
            return true;
        }
        bucket.push(normalized.to_owned());
        false
    }

    /// Number of duplicates rejected since the last reset.
    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    #[must_use]
    pub fn unique(&self) -> usize {
        self.seen.values().map(Vec::len).sum()
    }

    pub fn reset(&mut self) {
        self.seen.clear();
        self.duplicates = 0;
    }
}
