// Argument type tags and call validation

use std::fmt;

use crate::interpreter::EvalError;
use crate::value::Value;

/// Type accepted by a parameter.
///
/// `ArrayOfNumber` and `ArrayOfString` are checks on every element of an
/// array, not separate runtime types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Any,
    Number,
    String,
    Boolean,
    Array,
    Object,
    Null,
    Expref,
    ArrayOfNumber,
    ArrayOfString,
}

impl ArgType {
    pub fn name(self) -> &'static str {
        match self {
            ArgType::Any => "any",
            ArgType::Number => "number",
            ArgType::String => "string",
            ArgType::Boolean => "boolean",
            ArgType::Array => "array",
            ArgType::Object => "object",
            ArgType::Null => "null",
            ArgType::Expref => "expref",
            ArgType::ArrayOfNumber => "array[number]",
            ArgType::ArrayOfString => "array[string]",
        }
    }

    pub fn matches(self, value: &Value) -> bool {
        match self {
            ArgType::Any => true,
            ArgType::Number => matches!(value, Value::Number(_)),
            ArgType::String => matches!(value, Value::String(_)),
            ArgType::Boolean => matches!(value, Value::Boolean(_)),
            ArgType::Array => matches!(value, Value::Array(_)),
            ArgType::Object => matches!(value, Value::Object(_)),
            ArgType::Null => matches!(value, Value::Null),
            ArgType::Expref => matches!(value, Value::Expref(_)),
            ArgType::ArrayOfNumber => matches!(
                value,
                Value::Array(items) if items.iter().all(|v| matches!(v, Value::Number(_)))
            ),
            ArgType::ArrayOfString => matches!(
                value,
                Value::Array(items) if items.iter().all(|v| matches!(v, Value::String(_)))
            ),
        }
    }
}

/// One declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Param {
    pub types: &'static [ArgType],
    /// Only meaningful on the last parameter: it then accepts one or more
    /// arguments.
    pub variadic: bool,
}

impl Param {
    pub const fn new(types: &'static [ArgType]) -> Self {
        Param {
            types,
            variadic: false,
        }
    }

    pub const fn variadic(types: &'static [ArgType]) -> Self {
        Param {
            types,
            variadic: true,
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        self.types.iter().any(|t| t.matches(value))
    }

    fn expected(&self) -> String {
        let names: Vec<&str> = self.types.iter().map(|t| t.name()).collect();
        names.join("|")
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.expected())?;
        if self.variadic {
            f.write_str("...")?;
        }
        Ok(())
    }
}

/// Checks arity, then each argument against its parameter. Extra arguments
/// of a variadic call are checked against the last parameter.
pub fn validate(function: &'static str, params: &[Param], args: &[Value]) -> Result<(), EvalError> {
    let variadic = params.last().is_some_and(|p| p.variadic);
    let arity_ok = if variadic {
        args.len() >= params.len()
    } else {
        args.len() == params.len()
    };

    if !arity_ok {
        return Err(EvalError::Arity {
            function,
            expected: params.len(),
            at_least: variadic,
            received: args.len(),
        });
    }

    for (i, arg) in args.iter().enumerate() {
        let Some(param) = params.get(i).or(params.last()) else {
            break;
        };
        if !param.accepts(arg) {
            return Err(EvalError::ArgumentType {
                function,
                position: i + 1,
                expected: param.expected(),
                actual: arg.type_name(),
            });
        }
    }
    Ok(())
}
