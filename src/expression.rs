use std::fmt;
use std::sync::Arc;

use crate::ast::Ast;
use crate::interpreter::{EvalError, Interpreter};
use crate::value::Value;

/// A compiled expression.
///
/// Immutable and cheap to clone; compile once and evaluate against any
/// number of documents, from any number of threads.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: Arc<str>,
    ast: Arc<Ast>,
}

impl Expression {
    pub(crate) fn new(source: &str, ast: Ast) -> Self {
        Expression {
            source: Arc::from(source),
            ast: Arc::new(ast),
        }
    }

    /// Evaluates the expression against `data`.
    ///
    /// ```
    /// use jmesq::{Value, compile};
    /// use serde_json::json;
    ///
    /// let adults = compile("people[?age >= `18`].name").unwrap();
    /// let data: Value = json!({
    ///     "people": [{"name": "ana", "age": 31}, {"name": "ben", "age": 9}]
    /// }).into();
    ///
    /// assert_eq!(adults.search(&data).unwrap(), json!(["ana"]).into());
    /// ```
    pub fn search(&self, data: &Value) -> Result<Value, EvalError> {
        Interpreter::new().evaluate(&self.ast, data)
    }

    pub fn ast(&self) -> &Ast {
        &self.ast
    }

    /// The text the expression was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
