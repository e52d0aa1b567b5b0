//! Unified error type of the façade

use std::fmt;

use thiserror::Error;

use crate::interpreter::EvalError;
use crate::lexer::LexError;
use crate::parser::ParseError;

/// Coarse classification of every failure the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unrecognized or malformed input while tokenizing
    Lexer,
    /// Malformed expression structure
    Parser,
    /// Invalid evaluation, e.g. a zero slice step
    Runtime,
    /// Wrong number of function arguments
    Argument,
    /// Argument or sort-key type mismatch
    Type,
    /// Call of an unregistered function
    UnknownFunction,
}

impl ErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Lexer => "LexerError",
            ErrorKind::Parser => "ParserError",
            ErrorKind::Runtime => "RuntimeError",
            ErrorKind::Argument => "ArgumentError",
            ErrorKind::Type => "TypeError",
            ErrorKind::UnknownFunction => "UnknownFunction",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned by [`crate::search`]: compiling or evaluating failed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("{}: {}", .0.kind(), .0)]
    Parse(#[from] ParseError),

    #[error("{}: {}", .0.kind(), .0)]
    Eval(#[from] EvalError),
}

impl From<LexError> for Error {
    fn from(e: LexError) -> Self {
        Error::Parse(ParseError::Lex(e))
    }
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Parse(e) => e.kind(),
            Error::Eval(e) => e.kind(),
        }
    }
}

impl ParseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Lex(_) => ErrorKind::Lexer,
            _ => ErrorKind::Parser,
        }
    }
}
