mod assembler;
mod navigator;
mod prompt;
mod question;
mod synthesizer;

pub use assembler::{AssembledQuiz, AssemblyReport, QuizAssembler, QuizRequest};
pub use navigator::{
    Direction, NavigatorCursor, QuizNavigator, current_question, move_cursor,
};
pub use prompt::build_prompt;
pub use question::{Choice, MAX_QUESTIONS, QuestionBank, QuizQuestion};
pub use synthesizer::QuestionSynthesizer;
