use thiserror::Error;

use crate::QuestionId;

/// Reason a question failed validation at construction time.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum QuestionFault {
    #[error("expected exactly 4 options, got {0}")]
    OptionCount(usize),
    #[error("correct index {0} is outside 0..=3")]
    CorrectIndex(usize),
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Invalid question: {0}")]
    InvalidQuestion(#[from] QuestionFault),
    #[error("Question id {0} already exists")]
    DuplicateQuestionId(QuestionId),
    #[error("Question catalog could not be parsed")]
    MalformedCatalog,
}

pub type Result<T> = core::result::Result<T, GameError>;
