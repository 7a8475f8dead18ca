//! Test-only mock provider.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::LlmError;
use crate::provider::{GenerationParams, LlmProvider};

/// Scripted provider: pops queued responses, falls back to `default_response`,
/// and produces deterministic bag-of-words embeddings.
#[derive(Debug, Clone)]
pub struct MockProvider {
    responses: Arc<Mutex<Vec<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    generate_calls: Arc<AtomicUsize>,
    pub default_response: String,
    pub embedding_dim: usize,
    pub fail_generate: bool,
    /// Embedding fails for any text containing this marker.
    pub fail_embed_on: Option<String>,
    /// Milliseconds to sleep before returning a generation.
    pub delay_ms: u64,
}

impl Default for MockProvider {
    fn default() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            generate_calls: Arc::new(AtomicUsize::new(0)),
            default_response: "mock response".into(),
            embedding_dim: 64,
            fail_generate: false,
            fail_embed_on: None,
            delay_ms: 0,
        }
    }
}

impl MockProvider {
    #[must_use]
    pub fn with_responses(responses: Vec<String>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(responses)),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_default_response(mut self, response: impl Into<String>) -> Self {
        self.default_response = response.into();
        self
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail_generate: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_embed_failure(mut self, marker: impl Into<String>) -> Self {
        self.fail_embed_on = Some(marker.into());
        self
    }

    #[must_use]
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = ms;
        self
    }

    /// Number of `generate` calls made so far, across clones.
    #[must_use]
    pub fn generate_calls(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    /// Prompts received by `generate`, in call order.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

/// Hash each lowercase word into one of `dim` buckets and L2-normalize.
#[must_use]
pub fn bag_of_words_embedding(text: &str, dim: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dim.max(1)];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
        for byte in word.to_lowercase().bytes() {
            hash ^= u64::from(byte);
            hash = hash.wrapping_mul(0x0100_0000_01b3);
        }
        #[allow(clippy::cast_possible_truncation)]
        let bucket = (hash % vector.len() as u64) as usize;
        vector[bucket] += 1.0;
    }
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut vector {
            *x /= norm;
        }
    }
    vector
}

impl LlmProvider for MockProvider {
    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String, LlmError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_owned());
        if self.delay_ms > 0 {
            tokio::time::sleep(std::time::Duration::from_millis(self.delay_ms)).await;
        }
        if self.fail_generate {
            return Err(LlmError::Other("mock LLM error".into()));
        }
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(self.default_response.clone())
        } else {
            Ok(responses.remove(0))
        }
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, LlmError> {
        if let Some(ref marker) = self.fail_embed_on
            && text.contains(marker.as_str())
        {
            return Err(LlmError::Other("mock embedding error".into()));
        }
        Ok(bag_of_words_embedding(text, self.embedding_dim))
    }

    fn supports_embeddings(&self) -> bool {
        true
    }

    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn responses_are_consumed_in_order() {
        let mock = MockProvider::with_responses(vec!["one".into(), "two".into()]);
        let params = GenerationParams::default();
        assert_eq!(mock.generate("p", &params).await.unwrap(), "one");
        assert_eq!(mock.generate("p", &params).await.unwrap(), "two");
        assert_eq!(mock.generate("p", &params).await.unwrap(), "mock response");
        assert_eq!(mock.generate_calls(), 3);
    }

    #[tokio::test]
    async fn failing_mock_errors_and_counts() {
        let mock = MockProvider::failing();
        assert!(mock.generate("p", &GenerationParams::default()).await.is_err());
        assert_eq!(mock.generate_calls(), 1);
    }

    #[tokio::test]
    async fn embed_failure_marker() {
        let mock = MockProvider::default().with_embed_failure("poison");
        assert!(mock.embed("clean text").await.is_ok());
        assert!(mock.embed("some poison here").await.is_err());
    }

    #[test]
    fn embedding_is_normalized_and_deterministic() {
        let a = bag_of_words_embedding("Rust ownership rules", 32);
        let b = bag_of_words_embedding("rust OWNERSHIP rules", 32);
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_embeds_to_zero_vector() {
        let v = bag_of_words_embedding("", 8);
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
