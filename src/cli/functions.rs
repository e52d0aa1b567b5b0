//! Builtin function reference for the CLI

use super::CliError;
use crate::registry;

fn summary(name: &str) -> &'static str {
    match name {
        "abs" => "Absolute value of a number",
        "avg" => "Mean of an array of numbers; null when empty",
        "ceil" => "Smallest integer not below the number",
        "contains" => "Substring test for strings, membership test for arrays",
        "ends_with" => "Whether the first string ends with the second",
        "floor" => "Largest integer not above the number",
        "join" => "Concatenates an array of strings with a separator",
        "keys" => "Keys of an object, in insertion order",
        "length" => "Characters of a string, elements of an array, keys of an object",
        "map" => "Applies an expression to every element, keeping nulls",
        "max" => "Largest number or string; null when empty",
        "max_by" => "Element with the largest expression key",
        "merge" => "Merges objects left to right; later keys win",
        "min" => "Smallest number or string; null when empty",
        "min_by" => "Element with the smallest expression key",
        "not_null" => "First argument that is not null",
        "reverse" => "Reverses a string or an array",
        "sort" => "Sorts an array of numbers or of strings",
        "sort_by" => "Stable sort by an expression key",
        "starts_with" => "Whether the first string starts with the second",
        "sum" => "Sum of an array of numbers",
        "to_array" => "Wraps a non-array value in a one-element array",
        "to_number" => "Parses a string as a number; null when it is not one",
        "to_string" => "Strings unchanged, anything else as JSON text",
        "type" => "Type name of the value",
        "values" => "Values of an object, in insertion order",
        _ => "",
    }
}

/// Every builtin with its signature, one per line.
pub fn list_functions() -> String {
    let functions: Vec<(String, &str)> = registry()
        .iter()
        .map(|f| (f.signature(), summary(f.name())))
        .collect();
    let width = functions.iter().map(|(s, _)| s.len()).max().unwrap_or(0);

    let mut out = String::from("BUILTIN FUNCTIONS\n\n");
    for (signature, summary) in functions {
        out.push_str(&format!("  {signature:<width$}  {summary}\n"));
    }
    out
}

/// Signature and summary of a single builtin.
pub fn describe_function(name: &str) -> Result<String, CliError> {
    let function = registry()
        .get(name)
        .ok_or_else(|| CliError::UnknownFunction(name.to_string()))?;
    Ok(format!("{}\n\n  {}\n", function.signature(), summary(name)))
}
