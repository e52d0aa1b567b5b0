//! Evaluate expressions against JSON input

use super::CliError;
use crate::{ParserOptions, Value, compile_with};

/// Options for the search command
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// The expression to evaluate
    pub expression: String,
    /// JSON input text
    pub input: Option<String>,
    /// Only compile the expression, don't evaluate it
    pub syntax_only: bool,
    pub parser: ParserOptions,
}

/// Result of a search operation
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    /// The expression compiled
    SyntaxValid,
    /// The expression was evaluated against the input
    Success(Value),
}

/// Compiles the expression and, unless `syntax_only` is set, evaluates it
/// against the parsed input.
pub fn execute_search(options: &SearchOptions) -> Result<SearchResult, CliError> {
    let expression = compile_with(&options.expression, options.parser)?;

    if options.syntax_only {
        return Ok(SearchResult::SyntaxValid);
    }

    let text = options.input.as_deref().ok_or(CliError::NoInput)?;
    let json: serde_json::Value = serde_json::from_str(text)?;
    let data = Value::from(json);

    Ok(SearchResult::Success(expression.search(&data)?))
}
