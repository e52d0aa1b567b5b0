use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::ast::Ast;

/// Ordered string-keyed map backing [`Value::Object`].
pub type Map = IndexMap<String, Value>;

/// A JSON-like value queried and produced by the engine.
///
/// JMESPath has a single number type, so every number is an `f64`. Objects keep
/// insertion order so that `keys`, `values` and object projections are
/// deterministic; equality between objects ignores that order.
///
/// # Examples
///
/// ```
/// use jmesq::Value;
/// use serde_json::json;
///
/// let value: Value = json!({"name": "Alice", "tags": ["a", "b"]}).into();
/// assert_eq!(value.type_name(), "object");
/// assert!(!value.is_false_like());
/// assert!(Value::Array(vec![]).is_false_like());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// JSON null
    #[default]
    Null,

    /// JSON boolean (true/false)
    Boolean(bool),

    /// Number (integers and floats share one representation)
    Number(f64),

    /// UTF-8 string
    String(String),

    /// Array of values
    Array(Vec<Value>),

    /// Object with string keys, in insertion order
    Object(Map),

    /// A captured, unevaluated expression (`&expr`).
    ///
    /// Only produced by the interpreter; consumed by higher-order builtins
    /// such as `sort_by` and `map`.
    Expref(Arc<Ast>),
}

/// Runtime type of a [`Value`], as reported by `type()` and checked by
/// function signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Number,
    String,
    Array,
    Object,
    Boolean,
    Null,
    Expref,
}

impl TypeTag {
    pub fn name(self) -> &'static str {
        match self {
            TypeTag::Number => "number",
            TypeTag::String => "string",
            TypeTag::Array => "array",
            TypeTag::Object => "object",
            TypeTag::Boolean => "boolean",
            TypeTag::Null => "null",
            TypeTag::Expref => "expref",
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Value {
    /// The JMESPath falsiness rule used by filters and `||`, `&&`, `!`.
    ///
    /// `""`, `false`, `null`, `[]` and `{}` are false-like. Everything else,
    /// including `0`, is true-like.
    pub fn is_false_like(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Boolean(b) => !*b,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
            Value::Number(_) | Value::Expref(_) => false,
        }
    }

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Boolean(_) => TypeTag::Boolean,
            Value::Number(_) => TypeTag::Number,
            Value::String(_) => TypeTag::String,
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) => TypeTag::Object,
            Value::Expref(_) => TypeTag::Expref,
        }
    }

    /// Human-readable type name (`"number"`, `"array"`, ...)
    pub fn type_name(&self) -> &'static str {
        self.type_tag().name()
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_expref(&self) -> Option<&Ast> {
        match self {
            Value::Expref(node) => Some(node),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    /// Compact JSON text; expression references render as `null`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::output::to_json(self))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}
