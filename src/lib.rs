//! jmesq: a JMESPath query engine for JSON-like values.
//!
//! An expression goes through three stages:
//!
//! 1. [`Lexer`] turns the source text into [`Token`]s.
//! 2. [`Parser`] builds an [`Ast`] with a Pratt (top-down operator
//!    precedence) parser.
//! 3. [`Interpreter`] walks the tree against a [`Value`], calling into the
//!    builtin function [`runtime`] where the expression calls a function.
//!
//! Most callers only need the façade:
//!
//! ```
//! use serde_json::json;
//!
//! let data = json!({"locations": [
//!     {"name": "Seattle", "state": "WA"},
//!     {"name": "New York", "state": "NY"},
//!     {"name": "Olympia", "state": "WA"}
//! ]});
//!
//! let result = jmesq::search_json(
//!     &data,
//!     "locations[?state == 'WA'].name | sort(@) | {WashingtonCities: join(', ', @)}",
//! )
//! .unwrap();
//!
//! assert_eq!(result, json!({"WashingtonCities": "Olympia, Seattle"}));
//! ```

pub mod ast;
mod convert;
pub mod error;
mod expression;
pub mod interpreter;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod runtime;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{Ast, Comparator, KeyValuePair, Token, TokenKind};
pub use error::{Error, ErrorKind};
pub use expression::Expression;
pub use interpreter::{EvalError, Interpreter, Visitor};
pub use lexer::{LexError, Lexer};
pub use output::{to_json, to_json_pretty};
pub use parser::{DEFAULT_MAX_DEPTH, ParseError, Parser, ParserOptions};
pub use runtime::{Registry, registry};
pub use value::{Map, TypeTag, Value};

use tracing::debug;

/// Splits `expression` into tokens, without the end-of-input marker.
pub fn tokenize(expression: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(expression).tokenize()
}

/// Compiles `expression` with the default [`ParserOptions`].
pub fn compile(expression: &str) -> Result<Expression, ParseError> {
    compile_with(expression, ParserOptions::default())
}

pub fn compile_with(expression: &str, options: ParserOptions) -> Result<Expression, ParseError> {
    let ast = Parser::with_options(Lexer::new(expression), options)?.parse()?;
    debug!(expression, root = ast.kind(), "compiled expression");
    Ok(Expression::new(expression, ast))
}

/// Compiles `expression` and evaluates it against `data`.
///
/// Equivalent to `compile(expression)?.search(data)?`; callers evaluating
/// the same expression repeatedly should compile it once instead.
pub fn search(data: &Value, expression: &str) -> Result<Value, Error> {
    Ok(compile(expression)?.search(data)?)
}

/// [`search`] over `serde_json` values.
pub fn search_json(
    data: &serde_json::Value,
    expression: &str,
) -> Result<serde_json::Value, Error> {
    search(&Value::from(data), expression).map(serde_json::Value::from)
}
