use santiago::lexer::LexerError;
use thiserror::Error;

use crate::coord::Coordinate;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("{0}")]
    Lexer(String),

    #[error("Malformed formula: {0}")]
    MalformedFormula(String),

    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Division by zero")]
    DivisionByZero,

    #[error("No numeric values in range: {0}")]
    EmptyRange(String),

    #[error("Cell out of range: {0}")]
    OutOfRange(Coordinate),
}

impl From<LexerError> for Error {
    fn from(err: LexerError) -> Self {
        Self::Lexer(err.to_string())
    }
}
