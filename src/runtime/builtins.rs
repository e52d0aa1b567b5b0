use std::cmp::Ordering;
use std::sync::OnceLock;

use regex::Regex;
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};

use super::signature::{ArgType, Param};
use super::Function;
use crate::ast::Ast;
use crate::interpreter::{EvalError, Visitor};
use crate::output;
use crate::value::{Map, Value};

const ANY: &[Param] = &[Param::new(&[ArgType::Any])];
const NUMBER: &[Param] = &[Param::new(&[ArgType::Number])];
const OBJECT: &[Param] = &[Param::new(&[ArgType::Object])];
const NUMBERS: &[Param] = &[Param::new(&[ArgType::ArrayOfNumber])];
const NUMBERS_OR_STRINGS: &[Param] =
    &[Param::new(&[ArgType::ArrayOfNumber, ArgType::ArrayOfString])];
const STRING_OR_ARRAY: &[Param] = &[Param::new(&[ArgType::String, ArgType::Array])];
const TWO_STRINGS: &[Param] = &[
    Param::new(&[ArgType::String]),
    Param::new(&[ArgType::String]),
];
const ARRAY_BY_EXPREF: &[Param] = &[
    Param::new(&[ArgType::Array]),
    Param::new(&[ArgType::Expref]),
];
const CONTAINS: &[Param] = &[
    Param::new(&[ArgType::String, ArgType::Array]),
    Param::new(&[ArgType::Any]),
];
const JOIN: &[Param] = &[
    Param::new(&[ArgType::String]),
    Param::new(&[ArgType::ArrayOfString]),
];
const LENGTH: &[Param] = &[Param::new(&[
    ArgType::String,
    ArgType::Array,
    ArgType::Object,
])];
const MAP: &[Param] = &[
    Param::new(&[ArgType::Expref]),
    Param::new(&[ArgType::Array]),
];
const OBJECTS: &[Param] = &[Param::variadic(&[ArgType::Object])];
const ANY_VARIADIC: &[Param] = &[Param::variadic(&[ArgType::Any])];

pub(super) static BUILTINS: &[Function] = &[
    Function::new("abs", NUMBER, abs),
    Function::new("avg", NUMBERS, avg),
    Function::new("ceil", NUMBER, ceil),
    Function::new("contains", CONTAINS, contains),
    Function::new("ends_with", TWO_STRINGS, ends_with),
    Function::new("floor", NUMBER, floor),
    Function::new("join", JOIN, join),
    Function::new("keys", OBJECT, keys),
    Function::new("length", LENGTH, length),
    Function::new("map", MAP, map),
    Function::new("max", NUMBERS_OR_STRINGS, max),
    Function::new("max_by", ARRAY_BY_EXPREF, max_by),
    Function::new("merge", OBJECTS, merge),
    Function::new("min", NUMBERS_OR_STRINGS, min),
    Function::new("min_by", ARRAY_BY_EXPREF, min_by),
    Function::new("not_null", ANY_VARIADIC, not_null),
    Function::new("reverse", STRING_OR_ARRAY, reverse),
    Function::new("sort", NUMBERS_OR_STRINGS, sort),
    Function::new("sort_by", ARRAY_BY_EXPREF, sort_by),
    Function::new("starts_with", TWO_STRINGS, starts_with),
    Function::new("sum", NUMBERS, sum),
    Function::new("to_array", ANY, to_array),
    Function::new("to_number", ANY, to_number),
    Function::new("to_string", ANY, to_string),
    Function::new("type", ANY, type_of),
    Function::new("values", OBJECT, values),
];

// ============================================================================
// Argument access
//
// Signatures are validated before an implementation runs; a mismatch here
// means a function's table entry disagrees with its implementation.
// ============================================================================

fn mismatch(function: &'static str, position: usize, expected: &str, arg: &Value) -> EvalError {
    EvalError::ArgumentType {
        function,
        position: position + 1,
        expected: expected.to_string(),
        actual: arg.type_name(),
    }
}

fn arg<'a>(args: &'a [Value], position: usize) -> &'a Value {
    const NULL: &Value = &Value::Null;
    args.get(position).unwrap_or(NULL)
}

fn number_arg(function: &'static str, args: &[Value], position: usize) -> Result<f64, EvalError> {
    let value = arg(args, position);
    value
        .as_f64()
        .ok_or_else(|| mismatch(function, position, "number", value))
}

fn str_arg<'a>(
    function: &'static str,
    args: &'a [Value],
    position: usize,
) -> Result<&'a str, EvalError> {
    let value = arg(args, position);
    value
        .as_str()
        .ok_or_else(|| mismatch(function, position, "string", value))
}

fn array_arg<'a>(
    function: &'static str,
    args: &'a [Value],
    position: usize,
) -> Result<&'a [Value], EvalError> {
    let value = arg(args, position);
    value
        .as_array()
        .ok_or_else(|| mismatch(function, position, "array", value))
}

fn object_arg<'a>(
    function: &'static str,
    args: &'a [Value],
    position: usize,
) -> Result<&'a Map, EvalError> {
    let value = arg(args, position);
    value
        .as_object()
        .ok_or_else(|| mismatch(function, position, "object", value))
}

fn expref_arg<'a>(
    function: &'static str,
    args: &'a [Value],
    position: usize,
) -> Result<&'a Ast, EvalError> {
    let value = arg(args, position);
    value
        .as_expref()
        .ok_or_else(|| mismatch(function, position, "expref", value))
}

fn numbers(function: &'static str, items: &[Value]) -> Result<Vec<f64>, EvalError> {
    items
        .iter()
        .enumerate()
        .map(|(i, v)| v.as_f64().ok_or_else(|| mismatch(function, i, "number", v)))
        .collect()
}

// ============================================================================
// Numeric
// ============================================================================

fn abs(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg("abs", args, 0)?.abs()))
}

fn ceil(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg("ceil", args, 0)?.ceil()))
}

fn floor(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    Ok(Value::Number(number_arg("floor", args, 0)?.floor()))
}

/// Values that survive a round trip through `Decimal` unchanged. Anything
/// with more precision than `Decimal` holds yields `None`.
fn exact_decimals(values: &[f64]) -> Option<Vec<Decimal>> {
    values
        .iter()
        .map(|n| Decimal::from_f64(*n).filter(|d| d.to_f64() == Some(*n)))
        .collect()
}

/// Sums in decimal arithmetic when every addend is exactly representable,
/// so that `0.1 + 0.2` is `0.3`; otherwise plain floating point.
fn decimal_sum(values: &[f64]) -> f64 {
    let exact = exact_decimals(values).and_then(|decimals| {
        decimals
            .into_iter()
            .try_fold(Decimal::ZERO, |total, d| total.checked_add(d))
    });
    match exact.and_then(|d| d.to_f64()) {
        Some(total) => total,
        None => values.iter().sum(),
    }
}

fn sum(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let values = numbers("sum", array_arg("sum", args, 0)?)?;
    Ok(Value::Number(decimal_sum(&values)))
}

/// `null` for an empty array.
fn avg(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let values = numbers("avg", array_arg("avg", args, 0)?)?;
    if values.is_empty() {
        return Ok(Value::Null);
    }

    let count = values.len();
    let exact = exact_decimals(&values)
        .and_then(|decimals| {
            decimals
                .into_iter()
                .try_fold(Decimal::ZERO, |total, d| total.checked_add(d))
        })
        .and_then(|total| total.checked_div(Decimal::from(count)))
        .and_then(|mean| mean.to_f64());

    let mean = exact.unwrap_or_else(|| values.iter().sum::<f64>() / count as f64);
    Ok(Value::Number(mean))
}

// ============================================================================
// Ordering helpers
// ============================================================================

/// Ordering between two numbers or two strings. Validation guarantees the
/// operands share a type; anything else compares equal.
fn natural_order(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y).unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

/// First element that is strictly `wanted` relative to every earlier pick.
fn extremum<'a, I>(items: I, wanted: Ordering) -> Option<&'a Value>
where
    I: IntoIterator<Item = &'a Value>,
{
    items.into_iter().fold(None, |best, item| match best {
        Some(current) if natural_order(item, current) != wanted => Some(current),
        _ => Some(item),
    })
}

/// Evaluates `node` once per element. Keys must all be numbers or all be
/// strings, matching the type of the first key.
fn sort_keys(
    function: &'static str,
    items: &[Value],
    node: &Ast,
    visitor: &dyn Visitor,
) -> Result<Vec<Value>, EvalError> {
    let mut keys: Vec<Value> = Vec::with_capacity(items.len());

    for item in items {
        let key = visitor.visit(node, item)?;
        let expected = match keys.first() {
            Some(first) => first.type_name(),
            None => match key {
                Value::Number(_) | Value::String(_) => key.type_name(),
                _ => {
                    return Err(EvalError::KeyType {
                        function,
                        expected: "number|string",
                        actual: key.type_name(),
                    });
                }
            },
        };
        if key.type_name() != expected {
            return Err(EvalError::KeyType {
                function,
                expected,
                actual: key.type_name(),
            });
        }
        keys.push(key);
    }
    Ok(keys)
}

fn extremum_by(
    function: &'static str,
    args: &[Value],
    visitor: &dyn Visitor,
    wanted: Ordering,
) -> Result<Value, EvalError> {
    let items = array_arg(function, args, 0)?;
    let node = expref_arg(function, args, 1)?;
    let keys = sort_keys(function, items, node, visitor)?;

    let best = keys
        .iter()
        .enumerate()
        .fold(None::<(usize, &Value)>, |best, (i, key)| match best {
            Some((j, current)) if natural_order(key, current) != wanted => Some((j, current)),
            _ => Some((i, key)),
        });

    Ok(best
        .and_then(|(i, _)| items.get(i))
        .cloned()
        .unwrap_or(Value::Null))
}

// ============================================================================
// Collections
// ============================================================================

/// `null` for an empty array.
fn max(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let items = array_arg("max", args, 0)?;
    Ok(extremum(items, Ordering::Greater).cloned().unwrap_or(Value::Null))
}

/// `null` for an empty array.
fn min(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let items = array_arg("min", args, 0)?;
    Ok(extremum(items, Ordering::Less).cloned().unwrap_or(Value::Null))
}

fn max_by(args: &[Value], visitor: &dyn Visitor) -> Result<Value, EvalError> {
    extremum_by("max_by", args, visitor, Ordering::Greater)
}

fn min_by(args: &[Value], visitor: &dyn Visitor) -> Result<Value, EvalError> {
    extremum_by("min_by", args, visitor, Ordering::Less)
}

fn sort(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let mut sorted = array_arg("sort", args, 0)?.to_vec();
    sorted.sort_by(natural_order);
    Ok(Value::Array(sorted))
}

/// Stable: elements with equal keys keep their input order.
fn sort_by(args: &[Value], visitor: &dyn Visitor) -> Result<Value, EvalError> {
    let items = array_arg("sort_by", args, 0)?;
    let node = expref_arg("sort_by", args, 1)?;
    let keys = sort_keys("sort_by", items, node, visitor)?;

    let mut decorated: Vec<(Value, &Value)> = keys.into_iter().zip(items).collect();
    decorated.sort_by(|(a, _), (b, _)| natural_order(a, b));
    Ok(Value::Array(
        decorated.into_iter().map(|(_, item)| item.clone()).collect(),
    ))
}

/// Unlike projections, `map` keeps `null` results.
fn map(args: &[Value], visitor: &dyn Visitor) -> Result<Value, EvalError> {
    let node = expref_arg("map", args, 0)?;
    let items = array_arg("map", args, 1)?;
    let mapped = items
        .iter()
        .map(|item| visitor.visit(node, item))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::Array(mapped))
}

fn contains(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let needle = arg(args, 1);
    let found = match arg(args, 0) {
        Value::String(haystack) => needle.as_str().is_some_and(|n| haystack.contains(n)),
        Value::Array(items) => items.contains(needle),
        other => return Err(mismatch("contains", 0, "string|array", other)),
    };
    Ok(Value::Boolean(found))
}

fn length(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let len = match arg(args, 0) {
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => return Err(mismatch("length", 0, "string|array|object", other)),
    };
    Ok(Value::Number(len as f64))
}

fn reverse(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    match arg(args, 0) {
        Value::String(s) => Ok(Value::String(s.chars().rev().collect())),
        Value::Array(items) => Ok(Value::Array(items.iter().rev().cloned().collect())),
        other => Err(mismatch("reverse", 0, "string|array", other)),
    }
}

fn keys(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let map = object_arg("keys", args, 0)?;
    Ok(Value::Array(map.keys().cloned().map(Value::String).collect()))
}

fn values(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let map = object_arg("values", args, 0)?;
    Ok(Value::Array(map.values().cloned().collect()))
}

/// Later objects win on key collisions; a key keeps the position of its first
/// occurrence.
fn merge(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let mut merged = Map::new();
    for position in 0..args.len() {
        let map = object_arg("merge", args, position)?;
        for (key, value) in map {
            merged.insert(key.clone(), value.clone());
        }
    }
    Ok(Value::Object(merged))
}

fn not_null(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    Ok(args
        .iter()
        .find(|v| !v.is_null())
        .cloned()
        .unwrap_or(Value::Null))
}

// ============================================================================
// Strings
// ============================================================================

fn starts_with(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let subject = str_arg("starts_with", args, 0)?;
    let prefix = str_arg("starts_with", args, 1)?;
    Ok(Value::Boolean(subject.starts_with(prefix)))
}

fn ends_with(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let subject = str_arg("ends_with", args, 0)?;
    let suffix = str_arg("ends_with", args, 1)?;
    Ok(Value::Boolean(subject.ends_with(suffix)))
}

fn join(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    let separator = str_arg("join", args, 0)?;
    let items = array_arg("join", args, 1)?;
    let parts = items
        .iter()
        .enumerate()
        .map(|(i, v)| v.as_str().ok_or_else(|| mismatch("join", i, "string", v)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Value::String(parts.join(separator)))
}

// ============================================================================
// Types and conversion
// ============================================================================

fn type_of(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    Ok(Value::from(arg(args, 0).type_name()))
}

fn to_array(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    Ok(match arg(args, 0) {
        Value::Array(items) => Value::Array(items.clone()),
        other => Value::Array(vec![other.clone()]),
    })
}

/// Strings pass through; everything else becomes compact JSON text.
fn to_string(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    Ok(match arg(args, 0) {
        Value::String(s) => Value::String(s.clone()),
        other => Value::String(output::to_json(other)),
    })
}

/// Decimal number syntax accepted by `to_number`, with optional surrounding
/// whitespace. Rejects `inf`, `NaN` and empty strings that `f64::from_str`
/// would otherwise treat specially.
fn number_syntax() -> Option<&'static Regex> {
    static NUMBER: OnceLock<Option<Regex>> = OnceLock::new();
    NUMBER
        .get_or_init(|| Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?\s*$").ok())
        .as_ref()
}

/// `null` rather than an error when the value has no numeric reading.
fn to_number(args: &[Value], _: &dyn Visitor) -> Result<Value, EvalError> {
    Ok(match arg(args, 0) {
        Value::Number(n) => Value::Number(*n),
        Value::String(s) if number_syntax().is_some_and(|re| re.is_match(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Value::Number)
            .unwrap_or(Value::Null),
        _ => Value::Null,
    })
}
