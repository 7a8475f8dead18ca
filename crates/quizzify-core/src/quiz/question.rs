use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Hard ceiling on questions per quiz.
pub const MAX_QUESTIONS: usize = 10;

const CHOICE_KEYS: [&str; 4] = ["A", "B", "C", "D"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Choice {
    /// One of "A", "B", "C", "D".
    pub key: String,
    pub value: String,
}

impl Choice {
    /// Display form used when presenting options, e.g. `B) Paris`.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}) {}", self.key, self.value)
    }
}

/// A multiple-choice question with exactly four choices keyed A through D.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct QuizQuestion {
    pub question: String,
    pub choices: Vec<Choice>,
    /// Key of the correct choice.
    pub answer: String,
    pub explanation: String,
}

impl QuizQuestion {
    /// Parse and validate a raw model completion.
    ///
    /// Accepts a bare JSON object or one wrapped in a Markdown code fence. The
    /// `answer` may name the correct choice by key, label or value; it is
    /// normalised to the key.
    ///
    /// # Errors
    ///
    /// Returns [`QuizError::MalformedResponse`] if the text is not a JSON object
    /// with the expected fields, the choices are not keyed A to D in order, or
    /// the answer does not name one of them.
    pub fn parse(raw: &str) -> Result<Self, QuizError> {
        let body = strip_code_fence(raw);
        let mut question: Self = serde_json::from_str(body)
            .map_err(|e| QuizError::MalformedResponse(format!("invalid question JSON: {e}")))?;

        question.question = question.question.trim().to_owned();
        if question.question.is_empty() {
            return Err(QuizError::MalformedResponse("empty question text".into()));
        }
        if question.choices.len() != CHOICE_KEYS.len() {
            return Err(QuizError::MalformedResponse(format!(
                "expected 4 choices, got {}",
                question.choices.len()
            )));
        }
        for (choice, expected) in question.choices.iter_mut().zip(CHOICE_KEYS) {
            let key = choice.key.trim().to_ascii_uppercase();
            if key != expected {
                return Err(QuizError::MalformedResponse(format!(
                    "choice keyed {:?} where {expected} was expected",
                    choice.key
                )));
            }
            choice.key = key;
        }

        question.answer = question.resolve_answer().ok_or_else(|| {
            QuizError::MalformedResponse(format!(
                "answer {:?} does not name a choice",
                question.answer
            ))
        })?;
        Ok(question)
    }

    fn resolve_answer(&self) -> Option<String> {
        let answer = self.answer.trim();
        // keys win over values: a choice may itself read "B"
        self.choices
            .iter()
            .find(|c| key_matches(answer, &c.key))
            .or_else(|| {
                self.choices
                    .iter()
                    .find(|c| answer.eq_ignore_ascii_case(c.value.trim()))
            })
            .map(|c| c.key.clone())
    }

    /// Whether `selection` picks the correct choice. Accepts a bare key or a
    /// full label such as `B) Paris`.
    #[must_use]
    pub fn is_correct(&self, selection: &str) -> bool {
        key_matches(selection.trim(), &self.answer)
    }

    #[must_use]
    pub fn correct_choice(&self) -> Option<&Choice> {
        self.choices.iter().find(|c| c.key == self.answer)
    }

    /// Question text as compared for uniqueness within a bank.
    #[must_use]
    pub fn normalized_question(&self) -> String {
        self.question.trim().to_lowercase()
    }

    /// JSON schema handed to backends that support constrained output.
    #[must_use]
    pub fn json_schema() -> serde_json::Value {
        serde_json::to_value(schemars::schema_for!(QuizQuestion)).unwrap_or_default()
    }
}

/// `B`, `b`, `B)`, `B.` and `B) Paris` all match key `B`.
fn key_matches(candidate: &str, key: &str) -> bool {
    let mut chars = candidate.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let rest = chars.as_str();
    first.to_string().eq_ignore_ascii_case(key)
        && (rest.is_empty() || rest.starts_with(')') || rest.starts_with('.') || rest.starts_with(':'))
}

fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_suffix("```").unwrap_or(inner);
    // drop the info string, e.g. ```json
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body.trim(),
        _ => inner.trim(),
    }
}

/// Accepted questions for one quiz, in generation order, unique by
/// [`QuizQuestion::normalized_question`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionBank {
    questions: Vec<QuizQuestion>,
}

impl QuestionBank {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `question` unless an equal question text is already present.
    /// Returns whether it was added.
    pub fn push_unique(&mut self, question: QuizQuestion) -> bool {
        if self.contains(&question) {
            return false;
        }
        self.questions.push(question);
        true
    }

    #[must_use]
    pub fn contains(&self, question: &QuizQuestion) -> bool {
        let normalized = question.normalized_question();
        self.questions
            .iter()
            .any(|q| q.normalized_question() == normalized)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&QuizQuestion> {
        self.questions.get(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, QuizQuestion> {
        self.questions.iter()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<QuizQuestion> {
        self.questions
    }
}

impl<'a> IntoIterator for &'a QuestionBank {
    type Item = &'a QuizQuestion;
    type IntoIter = std::slice::Iter<'a, QuizQuestion>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
