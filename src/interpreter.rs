use std::cmp::Ordering;
use std::sync::Arc;

use thiserror::Error;

use crate::{
    ast::{Ast, Comparator},
    error::ErrorKind,
    runtime::{self, Registry},
    value::{Map, Value},
};

/// Errors that can occur while evaluating a compiled expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// A slice was evaluated with a step of 0
    #[error("invalid slice, step cannot be 0")]
    ZeroSliceStep,

    /// Call of a function the runtime does not know
    #[error("unknown function: {0}()")]
    UnknownFunction(String),

    /// Wrong number of arguments
    #[error("{function}() takes {} but received {received}", arity(.expected, .at_least))]
    Arity {
        function: &'static str,
        expected: usize,
        at_least: bool,
        received: usize,
    },

    /// Argument outside the types its parameter accepts
    #[error(
        "{function}() expected argument {position} to be type {expected} but received type {actual} instead"
    )]
    ArgumentType {
        function: &'static str,
        position: usize,
        expected: String,
        actual: &'static str,
    },

    /// Sort or comparison key of an unexpected type
    #[error("{function}() expected keys of type {expected} but received type {actual}")]
    KeyType {
        function: &'static str,
        expected: &'static str,
        actual: &'static str,
    },
}

fn arity(expected: &usize, at_least: &bool) -> String {
    format!(
        "{}{} argument{}",
        if *at_least { "at least " } else { "" },
        expected,
        if *expected == 1 { "" } else { "s" }
    )
}

impl EvalError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EvalError::ZeroSliceStep => ErrorKind::Runtime,
            EvalError::UnknownFunction(_) => ErrorKind::UnknownFunction,
            EvalError::Arity { .. } => ErrorKind::Argument,
            EvalError::ArgumentType { .. } | EvalError::KeyType { .. } => ErrorKind::Type,
        }
    }
}

/// Evaluation entry point handed to builtins that take expression
/// references, so the runtime can call back into the interpreter without
/// depending on it.
pub trait Visitor {
    fn visit(&self, node: &Ast, value: &Value) -> Result<Value, EvalError>;
}

/// Tree-walking interpreter.
///
/// Stateless apart from the function registry it dispatches to, so one
/// instance can evaluate any number of trees, from any number of threads.
#[derive(Debug, Clone, Copy)]
pub struct Interpreter {
    registry: &'static Registry,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter backed by the builtin function registry.
    pub fn new() -> Self {
        Interpreter {
            registry: runtime::registry(),
        }
    }

    /// Evaluates `node` against `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use jmesq::{Interpreter, Value, compile};
    /// use serde_json::json;
    ///
    /// let expression = compile("a.b").unwrap();
    /// let data: Value = json!({"a": {"b": 7}}).into();
    ///
    /// let result = Interpreter::new().evaluate(expression.ast(), &data).unwrap();
    /// assert_eq!(result, Value::Number(7.0));
    /// ```
    pub fn evaluate(&self, node: &Ast, value: &Value) -> Result<Value, EvalError> {
        self.visit(node, value)
    }

    /// Applies `right` to every item and collects the non-null results.
    fn project<'a, I>(&self, items: I, right: &Ast) -> Result<Value, EvalError>
    where
        I: IntoIterator<Item = &'a Value>,
    {
        let mut collected = Vec::new();
        for item in items {
            let current = self.visit(right, item)?;
            if !current.is_null() {
                collected.push(current);
            }
        }
        Ok(Value::Array(collected))
    }
}

impl Visitor for Interpreter {
    fn visit(&self, node: &Ast, value: &Value) -> Result<Value, EvalError> {
        match node {
            Ast::Field { name } => Ok(match value {
                Value::Object(map) => map.get(name).cloned().unwrap_or(Value::Null),
                _ => Value::Null,
            }),
            Ast::Subexpression { left, right } => {
                let base = self.visit(left, value)?;
                if base.is_null() {
                    return Ok(Value::Null);
                }
                self.visit(right, &base)
            }
            Ast::IndexExpression { left, right } => {
                let base = self.visit(left, value)?;
                self.visit(right, &base)
            }
            Ast::Index { index } => Ok(match value {
                Value::Array(items) => resolve_index(items.len(), *index)
                    .and_then(|i| items.get(i))
                    .cloned()
                    .unwrap_or(Value::Null),
                _ => Value::Null,
            }),
            Ast::Slice { start, stop, step } => match value {
                Value::Array(items) => Ok(Value::Array(slice(items, *start, *stop, *step)?)),
                _ => Ok(Value::Null),
            },
            Ast::Projection { left, right } => match self.visit(left, value)? {
                Value::Array(items) => self.project(&items, right),
                _ => Ok(Value::Null),
            },
            Ast::ValueProjection { left, right } => match self.visit(left, value)? {
                Value::Object(map) => self.project(map.values(), right),
                _ => Ok(Value::Null),
            },
            Ast::FilterProjection {
                left,
                right,
                condition,
            } => {
                let Value::Array(items) = self.visit(left, value)? else {
                    return Ok(Value::Null);
                };
                let mut kept = Vec::new();
                for item in &items {
                    if !self.visit(condition, item)?.is_false_like() {
                        kept.push(item);
                    }
                }
                self.project(kept, right)
            }
            Ast::Comparator { op, left, right } => {
                let left = self.visit(left, value)?;
                let right = self.visit(right, value)?;
                Ok(compare(*op, &left, &right))
            }
            Ast::Flatten { node } => {
                let Value::Array(items) = self.visit(node, value)? else {
                    return Ok(Value::Null);
                };
                let mut merged = Vec::with_capacity(items.len());
                for item in items {
                    match item {
                        Value::Array(inner) => merged.extend(inner),
                        other => merged.push(other),
                    }
                }
                Ok(Value::Array(merged))
            }
            Ast::Identity | Ast::Current => Ok(value.clone()),
            Ast::MultiSelectList { elements } => {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                let collected = elements
                    .iter()
                    .map(|element| self.visit(element, value))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(collected))
            }
            Ast::MultiSelectHash { pairs } => {
                if value.is_null() {
                    return Ok(Value::Null);
                }
                let mut collected = Map::with_capacity(pairs.len());
                for pair in pairs {
                    collected.insert(pair.key.clone(), self.visit(&pair.value, value)?);
                }
                Ok(Value::Object(collected))
            }
            Ast::OrExpression { left, right } => {
                let matched = self.visit(left, value)?;
                if matched.is_false_like() {
                    self.visit(right, value)
                } else {
                    Ok(matched)
                }
            }
            Ast::AndExpression { left, right } => {
                let first = self.visit(left, value)?;
                if first.is_false_like() {
                    Ok(first)
                } else {
                    self.visit(right, value)
                }
            }
            Ast::NotExpression { node } => {
                Ok(Value::Boolean(self.visit(node, value)?.is_false_like()))
            }
            Ast::Literal { value: literal } => Ok(literal.clone()),
            Ast::Pipe { left, right } => {
                let base = self.visit(left, value)?;
                self.visit(right, &base)
            }
            Ast::Function { name, args } => {
                let resolved = args
                    .iter()
                    .map(|arg| self.visit(arg, value))
                    .collect::<Result<Vec<_>, _>>()?;
                self.registry.call(name, &resolved, self)
            }
            Ast::ExpressionReference { node } => Ok(Value::Expref(Arc::clone(node))),
        }
    }
}

/// `==`/`!=` use structural equality. Ordering comparisons are defined for
/// two numbers or two strings; any other pairing yields `null`.
fn compare(op: Comparator, left: &Value, right: &Value) -> Value {
    let holds: fn(Ordering) -> bool = match op {
        Comparator::Equal => return Value::Boolean(left == right),
        Comparator::NotEqual => return Value::Boolean(left != right),
        Comparator::LessThan => Ordering::is_lt,
        Comparator::LessEqual => Ordering::is_le,
        Comparator::GreaterThan => Ordering::is_gt,
        Comparator::GreaterEqual => Ordering::is_ge,
    };

    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    };

    ordering.map(|o| Value::Boolean(holds(o))).unwrap_or(Value::Null)
}

/// Negative indices count from the end.
fn resolve_index(len: usize, index: i64) -> Option<usize> {
    if index < 0 {
        let from_end = len as i64 + index;
        (from_end >= 0).then_some(from_end as usize)
    } else {
        usize::try_from(index).ok()
    }
}

fn slice(
    items: &[Value],
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> Result<Vec<Value>, EvalError> {
    let (start, stop, step) = slice_params(items.len() as i64, start, stop, step)?;
    let mut result = Vec::new();
    let mut i = start;

    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        // Bounds are clamped into range by slice_params.
        if let Some(item) = items.get(i as usize) {
            result.push(item.clone());
        }
        match i.checked_add(step) {
            Some(next) => i = next,
            None => break,
        }
    }
    Ok(result)
}

/// Resolves omitted and out-of-range slice bounds against `len`.
fn slice_params(
    len: i64,
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> Result<(i64, i64, i64), EvalError> {
    let step = match step {
        None => 1,
        Some(0) => return Err(EvalError::ZeroSliceStep),
        Some(step) => step,
    };
    let descending = step < 0;

    let start = match start {
        None if descending => len - 1,
        None => 0,
        Some(start) => clamp_slice_bound(len, start, descending),
    };
    let stop = match stop {
        None if descending => -1,
        None => len,
        Some(stop) => clamp_slice_bound(len, stop, descending),
    };
    Ok((start, stop, step))
}

fn clamp_slice_bound(len: i64, bound: i64, descending: bool) -> i64 {
    if bound < 0 {
        let wrapped = bound.saturating_add(len);
        if wrapped >= 0 {
            wrapped
        } else if descending {
            -1
        } else {
            0
        }
    } else if bound >= len {
        if descending { len - 1 } else { len }
    } else {
        bound
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slice_params_defaults() {
        assert_eq!(slice_params(5, None, None, None), Ok((0, 5, 1)));
        assert_eq!(slice_params(5, None, None, Some(-1)), Ok((4, -1, -1)));
    }

    #[test]
    fn slice_params_clamp_and_wrap() {
        assert_eq!(slice_params(5, Some(-2), None, None), Ok((3, 5, 1)));
        assert_eq!(slice_params(5, Some(-10), Some(10), None), Ok((0, 5, 1)));
        assert_eq!(slice_params(5, Some(10), Some(-10), Some(-1)), Ok((4, -1, -1)));
    }

    #[test]
    fn slice_params_reject_zero_step() {
        assert_eq!(
            slice_params(3, None, None, Some(0)),
            Err(EvalError::ZeroSliceStep)
        );
    }

    #[test]
    fn resolve_negative_index() {
        assert_eq!(resolve_index(3, -1), Some(2));
        assert_eq!(resolve_index(3, -4), None);
        assert_eq!(resolve_index(3, 7), Some(7));
    }

    #[test]
    fn ordering_on_mixed_types_is_null() {
        let result = compare(
            Comparator::LessThan,
            &Value::Number(1.0),
            &Value::from("2"),
        );
        assert_eq!(result, Value::Null);
    }
}
