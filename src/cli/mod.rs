//! CLI support for jmesq
//!
//! Everything the `jmesq` binary does is available here as plain functions
//! returning strings or values, so other tools can embed the same behavior
//! without spawning a process.

mod functions;
mod inspect;
mod search;

pub use functions::{describe_function, list_functions};
pub use inspect::{render_ast, render_tokens};
pub use search::{SearchOptions, SearchResult, execute_search};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{}: {}", .0.kind(), .0)]
    Parse(#[from] crate::ParseError),

    #[error("{}: {}", .0.kind(), .0)]
    Eval(#[from] crate::EvalError),

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("no input provided. Use --input or pipe JSON to stdin.")]
    NoInput,

    #[error("unknown function: '{0}'\nRun 'jmesq functions' to see available functions.")]
    UnknownFunction(String),
}
