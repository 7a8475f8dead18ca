//! Quiz generation on top of the document index: configuration, the question
//! model, synthesis, assembly and navigation.

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod quiz;

pub use config::Config;
pub use error::QuizError;
pub use quiz::{
    AssembledQuiz, AssemblyReport, Choice, Direction, MAX_QUESTIONS, NavigatorCursor,
    QuestionBank, QuestionSynthesizer, QuizAssembler, QuizNavigator, QuizQuestion, QuizRequest,
};
