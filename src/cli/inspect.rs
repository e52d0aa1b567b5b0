//! Token and syntax tree dumps for debugging expressions

use super::CliError;
use crate::{Lexer, ParserOptions, compile_with};

/// One token per line, `KIND(lexeme)@offset`.
pub fn render_tokens(expression: &str) -> Result<String, CliError> {
    let tokens = Lexer::new(expression)
        .tokenize()
        .map_err(crate::ParseError::from)?;

    let mut out = String::new();
    for token in tokens {
        out.push_str(&token.to_string());
        out.push('\n');
    }
    Ok(out)
}

/// The indented tree of the compiled expression.
pub fn render_ast(expression: &str, options: ParserOptions) -> Result<String, CliError> {
    let compiled = compile_with(expression, options)?;
    Ok(compiled.ast().to_string())
}
