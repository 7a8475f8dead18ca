use std::future::Future;

use crate::error::LlmError;

/// Sampling settings for a single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
    /// JSON schema the backend should constrain its output to, when it can.
    pub json_schema: Option<serde_json::Value>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.8,
            max_tokens: 500,
            json_schema: None,
        }
    }
}

impl GenerationParams {
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    #[must_use]
    pub fn with_json_schema(mut self, schema: serde_json::Value) -> Self {
        self.json_schema = Some(schema);
        self
    }
}

pub trait LlmProvider: Send + Sync {
    /// Send a single prompt to the model and return the raw completion text.
    ///
    /// No guarantee is made about the shape of the returned text, even when
    /// `params.json_schema` is set.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot be reached or answers with a failure.
    fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;

    /// Embed a single query text.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend fails or embeddings are not supported.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, LlmError>> + Send;

    /// Embed a batch of document texts, preserving input order.
    ///
    /// The default implementation embeds one text at a time and stops at the
    /// first failure.
    ///
    /// # Errors
    ///
    /// Returns an error if any single embedding fails.
    fn embed_batch(
        &self,
        texts: &[String],
    ) -> impl Future<Output = Result<Vec<Vec<f32>>, LlmError>> + Send {
        async move {
            let mut vectors = Vec::with_capacity(texts.len());
            for text in texts {
                vectors.push(self.embed(text).await?);
            }
            Ok(vectors)
        }
    }

    fn supports_embeddings(&self) -> bool;

    fn name(&self) -> &str;
}
