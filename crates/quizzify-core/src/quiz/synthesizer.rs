use std::time::Duration;

use quizzify_llm::{GenerationParams, LlmProvider};
use quizzify_memory::Retriever;

use super::prompt::build_prompt;
use super::question::QuizQuestion;
use crate::error::QuizError;

const DEFAULT_CONTEXT_K: usize = 4;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Turns a topic into one question: retrieve context, prompt the model once,
/// parse the reply. Retries are the caller's concern.
pub struct QuestionSynthesizer<P, R> {
    provider: P,
    retriever: R,
    context_k: usize,
    params: GenerationParams,
    timeout: Duration,
}

impl<P: LlmProvider, R: Retriever> QuestionSynthesizer<P, R> {
    #[must_use]
    pub fn new(provider: P, retriever: R) -> Self {
        Self {
            provider,
            retriever,
            context_k: DEFAULT_CONTEXT_K,
            params: GenerationParams::default().with_json_schema(QuizQuestion::json_schema()),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_context_k(mut self, k: usize) -> Self {
        self.context_k = k;
        self
    }

    /// Sampling settings; the question schema is attached when `params` has none.
    #[must_use]
    pub fn with_params(mut self, mut params: GenerationParams) -> Self {
        if params.json_schema.is_none() {
            params.json_schema = Some(QuizQuestion::json_schema());
        }
        self.params = params;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// # Errors
    ///
    /// Retrieval failures ([`QuizError::NoIndex`], [`QuizError::EmbeddingService`]),
    /// generation failures ([`QuizError::Llm`], [`QuizError::Timeout`]) and
    /// [`QuizError::MalformedResponse`] when the reply is not a valid question.
    pub async fn synthesize(&self, topic: &str) -> Result<QuizQuestion, QuizError> {
        let context = self.retriever.retrieve(topic, self.context_k).await?;
        let prompt = build_prompt(topic, &context);
        tracing::debug!(topic, context_chunks = context.len(), "generating question");

        let raw = tokio::time::timeout(self.timeout, self.provider.generate(&prompt, &self.params))
            .await
            .map_err(|_| QuizError::Timeout(self.timeout))??;

        QuizQuestion::parse(&raw)
    }
}
