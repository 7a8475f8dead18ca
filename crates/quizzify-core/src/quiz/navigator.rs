use super::question::{QuestionBank, QuizQuestion};
use crate::error::QuizError;

/// Position in a question bank. Always interpreted modulo the bank size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NavigatorCursor {
    pub index: usize,
}

impl NavigatorCursor {
    #[must_use]
    pub fn new(index: usize) -> Self {
        Self { index }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
}

/// # Errors
///
/// Returns [`QuizError::EmptyBank`] when `bank` has no questions.
pub fn current_question(
    cursor: NavigatorCursor,
    bank: &QuestionBank,
) -> Result<&QuizQuestion, QuizError> {
    if bank.is_empty() {
        return Err(QuizError::EmptyBank);
    }
    bank.get(cursor.index % bank.len()).ok_or(QuizError::EmptyBank)
}

/// Step one question in `direction`, wrapping at both ends.
///
/// # Errors
///
/// Returns [`QuizError::EmptyBank`] when `bank_len` is zero.
pub fn move_cursor(
    cursor: NavigatorCursor,
    direction: Direction,
    bank_len: usize,
) -> Result<NavigatorCursor, QuizError> {
    if bank_len == 0 {
        return Err(QuizError::EmptyBank);
    }
    let index = cursor.index % bank_len;
    let index = match direction {
        Direction::Forward => (index + 1) % bank_len,
        Direction::Back => (index + bank_len - 1) % bank_len,
    };
    Ok(NavigatorCursor { index })
}

/// A finished bank and the cursor of the one session browsing it.
#[derive(Debug, Clone)]
pub struct QuizNavigator {
    bank: QuestionBank,
    cursor: NavigatorCursor,
}

impl QuizNavigator {
    #[must_use]
    pub fn new(bank: QuestionBank) -> Self {
        Self {
            bank,
            cursor: NavigatorCursor::default(),
        }
    }

    #[must_use]
    pub fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    #[must_use]
    pub fn cursor(&self) -> NavigatorCursor {
        self.cursor
    }

    /// # Errors
    ///
    /// Returns [`QuizError::EmptyBank`] when the bank has no questions.
    pub fn current(&self) -> Result<&QuizQuestion, QuizError> {
        current_question(self.cursor, &self.bank)
    }

    /// # Errors
    ///
    /// Returns [`QuizError::EmptyBank`] when the bank has no questions.
    pub fn step(&mut self, direction: Direction) -> Result<&QuizQuestion, QuizError> {
        self.cursor = move_cursor(self.cursor, direction, self.bank.len())?;
        self.current()
    }
}
