//! JSON text rendering for query results.
//!
//! This module renders [`Value`]s as JSON text in either compact or
//! pretty-printed form. It backs the `to_string` builtin, `Display` for
//! [`Value`] and the CLI output.
//!
//! # Features
//!
//! - **Compact output** via [`to_json()`] - no insignificant whitespace, the
//!   form `to_string` produces
//! - **Pretty output** via [`to_json_pretty()`] - 2-space indentation
//! - **Ordered** - object keys are written in insertion order
//! - **Integral numbers** print without a fractional part (`2`, not `2.0`)
//!
//! # Examples
//!
//! ```
//! use jmesq::Value;
//! use jmesq::output::{to_json, to_json_pretty};
//! use serde_json::json;
//!
//! let value: Value = json!({"b": [1, 2.5], "a": null}).into();
//! assert_eq!(to_json(&value), r#"{"b":[1,2.5],"a":null}"#);
//! assert_eq!(to_json_pretty(&Value::Number(42.0)), "42");
//! ```

use crate::value::{Map, Value};

pub struct JsonPrinter {
    pretty: bool,
}

impl JsonPrinter {
    pub fn new(pretty: bool) -> Self {
        JsonPrinter { pretty }
    }

    pub fn print(&self, value: &Value) -> String {
        self.print_value(value, 0)
    }

    fn print_value(&self, value: &Value, indent: usize) -> String {
        match value {
            Value::Null | Value::Expref(_) => "null".to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Number(n) => format_number(*n),
            Value::String(s) => format!("\"{}\"", self.escape_string(s)),
            Value::Array(arr) => self.print_array(arr, indent),
            Value::Object(obj) => self.print_object(obj, indent),
        }
    }

    fn print_array(&self, arr: &[Value], indent: usize) -> String {
        if arr.is_empty() {
            return "[]".to_string();
        }

        if self.pretty {
            let items: Vec<String> = arr
                .iter()
                .map(|v| {
                    format!(
                        "{}{}",
                        self.indent(indent + 1),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            format!("[\n{}\n{}]", items.join(",\n"), self.indent(indent))
        } else {
            let items: Vec<String> = arr.iter().map(|v| self.print_value(v, indent)).collect();
            format!("[{}]", items.join(","))
        }
    }

    fn print_object(&self, obj: &Map, indent: usize) -> String {
        if obj.is_empty() {
            return "{}".to_string();
        }

        if self.pretty {
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| {
                    format!(
                        "{}\"{}\": {}",
                        self.indent(indent + 1),
                        self.escape_string(k),
                        self.print_value(v, indent + 1)
                    )
                })
                .collect();
            format!("{{\n{}\n{}}}", items.join(",\n"), self.indent(indent))
        } else {
            let items: Vec<String> = obj
                .iter()
                .map(|(k, v)| format!("\"{}\":{}", self.escape_string(k), self.print_value(v, indent)))
                .collect();
            format!("{{{}}}", items.join(","))
        }
    }

    fn indent(&self, level: usize) -> String {
        "  ".repeat(level)
    }

    fn escape_string(&self, s: &str) -> String {
        let mut escaped = String::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '"' => escaped.push_str("\\\""),
                '\\' => escaped.push_str("\\\\"),
                '\n' => escaped.push_str("\\n"),
                '\r' => escaped.push_str("\\r"),
                '\t' => escaped.push_str("\\t"),
                c if c.is_control() => escaped.push_str(&format!("\\u{:04x}", c as u32)),
                c => escaped.push(c),
            }
        }
        escaped
    }
}

/// Non-finite numbers have no JSON form and print as `null`. Magnitudes at or
/// above `1e21` or below `1e-6` switch to exponent form (`1e+21`, `1.5e-7`).
fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return "null".to_string();
    }

    let magnitude = n.abs();
    if magnitude != 0.0 && !(1e-6..1e21).contains(&magnitude) {
        let formatted = format!("{:e}", n);
        return match formatted.split_once('e') {
            Some((mantissa, exponent)) if !exponent.starts_with('-') => {
                format!("{}e+{}", mantissa, exponent)
            }
            _ => formatted,
        };
    }
    n.to_string()
}

/// Converts a Value to compact JSON text.
///
/// # Examples
///
/// ```
/// use jmesq::Value;
/// use jmesq::output::to_json;
///
/// let value = Value::Array(vec![Value::from("a"), Value::Boolean(true)]);
/// assert_eq!(to_json(&value), r#"["a",true]"#);
/// ```
pub fn to_json(value: &Value) -> String {
    JsonPrinter::new(false).print(value)
}

/// Converts a Value to pretty-printed JSON text with 2-space indentation.
///
/// # Examples
///
/// ```
/// use jmesq::Value;
/// use jmesq::output::to_json_pretty;
/// use serde_json::json;
///
/// let value: Value = json!({"name": "Alice", "age": 30}).into();
/// assert_eq!(to_json_pretty(&value), "{\n  \"name\": \"Alice\",\n  \"age\": 30\n}");
/// ```
pub fn to_json_pretty(value: &Value) -> String {
    JsonPrinter::new(true).print(value)
}
