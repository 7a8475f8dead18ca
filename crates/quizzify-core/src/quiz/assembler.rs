use quizzify_llm::LlmProvider;
use quizzify_memory::Retriever;

use super::question::{MAX_QUESTIONS, QuestionBank};
use super::synthesizer::QuestionSynthesizer;
use crate::error::QuizError;

const DEFAULT_TOPIC: &str = "General Knowledge";

/// A validated request for one quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizRequest {
    topic: String,
    count: usize,
}

impl QuizRequest {
    /// A blank topic falls back to "General Knowledge".
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::InvalidRequest`] when `count` is outside `1..=10`.
    pub fn new(topic: &str, count: usize) -> Result<Self, QuizError> {
        if count == 0 {
            return Err(QuizError::InvalidRequest(
                "at least one question must be requested".into(),
            ));
        }
        if count > MAX_QUESTIONS {
            return Err(QuizError::InvalidRequest(format!(
                "number of questions cannot exceed {MAX_QUESTIONS}, got {count}"
            )));
        }
        let topic = topic.trim();
        Ok(Self {
            topic: if topic.is_empty() {
                DEFAULT_TOPIC.to_owned()
            } else {
                topic.to_owned()
            },
            count,
        })
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }
}

/// How the attempts of one assembly went.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    pub requested: usize,
    pub accepted: usize,
    pub malformed: usize,
    pub duplicates: usize,
    /// Attempts lost to backend errors or timeouts.
    pub failed: usize,
}

impl AssemblyReport {
    /// Fewer questions were accepted than requested.
    #[must_use]
    pub fn is_partial(&self) -> bool {
        self.accepted < self.requested
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledQuiz {
    pub topic: String,
    pub bank: QuestionBank,
    pub report: AssemblyReport,
}

/// Runs exactly `count` synthesis attempts and keeps the unique questions.
///
/// The bank may end up with anywhere from zero to `count` questions;
/// [`AssemblyReport::is_partial`] tells the caller when it fell short.
pub struct QuizAssembler<P, R> {
    synthesizer: QuestionSynthesizer<P, R>,
}

impl<P: LlmProvider, R: Retriever> QuizAssembler<P, R> {
    #[must_use]
    pub fn new(synthesizer: QuestionSynthesizer<P, R>) -> Self {
        Self { synthesizer }
    }

    /// # Errors
    ///
    /// Retrieval failures such as [`QuizError::NoIndex`] abort the whole quiz.
    /// Malformed replies, backend errors and timeouts only cost one attempt.
    pub async fn assemble(&self, request: &QuizRequest) -> Result<AssembledQuiz, QuizError> {
        let mut bank = QuestionBank::new();
        let mut report = AssemblyReport {
            requested: request.count(),
            ..AssemblyReport::default()
        };

        for attempt in 1..=request.count() {
            match self.synthesizer.synthesize(request.topic()).await {
                Ok(question) => {
                    if bank.push_unique(question) {
                        report.accepted += 1;
                    } else {
                        report.duplicates += 1;
                        tracing::info!(attempt, "duplicate question discarded");
                    }
                }
                Err(QuizError::MalformedResponse(reason)) => {
                    report.malformed += 1;
                    tracing::warn!(attempt, "skipping malformed question: {reason}");
                }
                Err(e) if e.is_recoverable() => {
                    report.failed += 1;
                    tracing::warn!(attempt, "question generation failed: {e}");
                }
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            topic = request.topic(),
            requested = report.requested,
            accepted = report.accepted,
            malformed = report.malformed,
            duplicates = report.duplicates,
            failed = report.failed,
            "quiz assembled"
        );
        Ok(AssembledQuiz {
            topic: request.topic().to_owned(),
            bank,
            report,
        })
    }
}
