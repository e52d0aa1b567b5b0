// tests/function_tests.rs

use jmesq::{Error, ErrorKind, EvalError, Value, registry, search};
use pretty_assertions::assert_eq;
use serde_json::json;

fn call(expression: &str, data: serde_json::Value) -> Value {
    search(&data.into(), expression).unwrap()
}

fn call_err(expression: &str, data: serde_json::Value) -> EvalError {
    match search(&data.into(), expression) {
        Err(Error::Eval(e)) => e,
        other => panic!("Expected evaluation error for {}, got {:?}", expression, other),
    }
}

fn v(data: serde_json::Value) -> Value {
    data.into()
}

// ============================================================================
// Registry
// ============================================================================

#[test]
fn test_registry_lists_builtins_in_order() {
    let names: Vec<&str> = registry().iter().map(|f| f.name()).collect();
    assert_eq!(
        names,
        vec![
            "abs", "avg", "ceil", "contains", "ends_with", "floor", "join", "keys", "length",
            "map", "max", "max_by", "merge", "min", "min_by", "not_null", "reverse", "sort",
            "sort_by", "starts_with", "sum", "to_array", "to_number", "to_string", "type",
            "values",
        ]
    );
    assert_eq!(registry().len(), 26);
}

#[test]
fn test_signatures() {
    let signature = |name: &str| registry().get(name).map(|f| f.signature());
    assert_eq!(signature("sort_by").as_deref(), Some("sort_by(array, expref)"));
    assert_eq!(signature("merge").as_deref(), Some("merge(object...)"));
    assert_eq!(
        signature("max").as_deref(),
        Some("max(array[number]|array[string])")
    );
    assert_eq!(signature("missing"), None);
}

// ============================================================================
// Numeric functions
// ============================================================================

#[test]
fn test_abs_ceil_floor() {
    assert_eq!(call("abs(`-3.5`)", json!(null)), Value::Number(3.5));
    assert_eq!(call("ceil(`1.2`)", json!(null)), Value::Number(2.0));
    assert_eq!(call("floor(`-1.2`)", json!(null)), Value::Number(-2.0));
}

#[test]
fn test_sum_and_avg() {
    assert_eq!(call("sum(@)", json!([1, 2, 3.5])), Value::Number(6.5));
    assert_eq!(call("sum(@)", json!([])), Value::Number(0.0));
    assert_eq!(call("sum(@)", json!([0.1, 0.2])), Value::Number(0.3));
    assert_eq!(call("avg(@)", json!([1, 2, 3, 4])), Value::Number(2.5));
    assert_eq!(call("avg(@)", json!([])), Value::Null);
}

#[test]
fn test_sum_and_avg_keep_full_precision() {
    for n in [1e-30, 1.0000000000000002, 123456.78901234567] {
        assert_eq!(call("sum(@)", json!([n])), Value::Number(n), "sum of {}", n);
        assert_eq!(call("avg(@)", json!([n])), Value::Number(n), "avg of {}", n);
    }
    assert_eq!(call("sum(@)", json!([1e-30, 1e-30])), Value::Number(2e-30));
    assert_eq!(call("avg(@)", json!([1e-30, 1e-30])), Value::Number(1e-30));
}

#[test]
fn test_max_and_min() {
    assert_eq!(call("max(@)", json!([3, 9, -1])), Value::Number(9.0));
    assert_eq!(call("min(@)", json!([3, 9, -1])), Value::Number(-1.0));
    assert_eq!(call("max(@)", json!(["b", "abc", "c"])), Value::from("c"));
    assert_eq!(call("min(@)", json!(["b", "abc", "c"])), Value::from("abc"));
    assert_eq!(call("max(@)", json!([])), Value::Null);
    assert_eq!(call("min(@)", json!([])), Value::Null);
}

#[test]
fn test_max_rejects_mixed_arrays() {
    let err = call_err("max(@)", json!([1, "a"]));
    assert_eq!(
        err,
        EvalError::ArgumentType {
            function: "max",
            position: 1,
            expected: "array[number]|array[string]".into(),
            actual: "array",
        }
    );
    assert_eq!(err.kind(), ErrorKind::Type);
}

// ============================================================================
// String functions
// ============================================================================

#[test]
fn test_starts_with_and_ends_with() {
    let doc = json!({"s": "jmespath"});
    assert_eq!(call("starts_with(s, 'jmes')", doc.clone()), Value::Boolean(true));
    assert_eq!(call("starts_with(s, 'path')", doc.clone()), Value::Boolean(false));
    assert_eq!(call("ends_with(s, 'path')", doc), Value::Boolean(true));
}

#[test]
fn test_join() {
    assert_eq!(call("join(', ', @)", json!(["a", "b", "c"])), Value::from("a, b, c"));
    assert_eq!(call("join('-', @)", json!([])), Value::from(""));
    assert!(matches!(
        call_err("join('-', @)", json!(["a", 1])),
        EvalError::ArgumentType { function: "join", position: 2, .. }
    ));
}

#[test]
fn test_contains() {
    assert_eq!(call("contains('foobar', 'oba')", json!(null)), Value::Boolean(true));
    assert_eq!(call("contains('foobar', 'x')", json!(null)), Value::Boolean(false));
    assert_eq!(call("contains(@, `2`)", json!([1, 2, 3])), Value::Boolean(true));
    assert_eq!(call("contains(@, `{\"a\": 1}`)", json!([{"a": 1}])), Value::Boolean(true));
    assert_eq!(call("contains(@, '2')", json!([1, 2])), Value::Boolean(false));
    assert_eq!(call("contains('123', `1`)", json!(null)), Value::Boolean(false));
}

#[test]
fn test_reverse() {
    assert_eq!(call("reverse('abc')", json!(null)), Value::from("cba"));
    assert_eq!(call("reverse(@)", json!([1, "a", null])), v(json!([null, "a", 1])));
}

// ============================================================================
// Collection functions
// ============================================================================

#[test]
fn test_length() {
    assert_eq!(call("length('héllo')", json!(null)), Value::Number(5.0));
    assert_eq!(call("length(@)", json!([1, 2])), Value::Number(2.0));
    assert_eq!(call("length(@)", json!({"a": 1, "b": 2, "c": 3})), Value::Number(3.0));
}

#[test]
fn test_length_of_number_is_type_error() {
    let err = call_err("length(@)", json!(5));
    assert_eq!(
        err,
        EvalError::ArgumentType {
            function: "length",
            position: 1,
            expected: "string|array|object".into(),
            actual: "number",
        }
    );
    assert_eq!(
        err.to_string(),
        "length() expected argument 1 to be type string|array|object but received type number instead"
    );
}

#[test]
fn test_keys_and_values_follow_insertion_order() {
    let doc = json!({"z": 1, "a": 2, "m": 3});
    assert_eq!(call("keys(@)", doc.clone()), v(json!(["z", "a", "m"])));
    assert_eq!(call("values(@)", doc), v(json!([1, 2, 3])));
}

#[test]
fn test_merge_is_right_biased() {
    assert_eq!(
        call("merge(`{\"a\": 1, \"b\": 2}`, `{\"b\": 3}`, `{\"c\": 4}`)", json!(null)),
        v(json!({"a": 1, "b": 3, "c": 4}))
    );
    assert_eq!(call("merge(@)", json!({"a": 1})), v(json!({"a": 1})));
}

#[test]
fn test_merge_checks_every_argument() {
    assert!(matches!(
        call_err("merge(`{}`, `{}`, `1`)", json!(null)),
        EvalError::ArgumentType { function: "merge", position: 3, .. }
    ));
    assert_eq!(
        call_err("merge()", json!(null)),
        EvalError::Arity {
            function: "merge",
            expected: 1,
            at_least: true,
            received: 0,
        }
    );
}

#[test]
fn test_not_null() {
    assert_eq!(call("not_null(a, b, c)", json!({"b": false, "c": 1})), Value::Boolean(false));
    assert_eq!(call("not_null(a, b)", json!({})), Value::Null);
}

#[test]
fn test_sort() {
    assert_eq!(call("sort(@)", json!([10, 2, 33, 1])), v(json!([1, 2, 10, 33])));
    assert_eq!(call("sort(@)", json!(["b", "a", "C"])), v(json!(["C", "a", "b"])));
    assert_eq!(call("sort(@)", json!([])), v(json!([])));
}

#[test]
fn test_map_keeps_nulls() {
    let doc = json!([{"a": 1}, {}, {"a": 3}]);
    assert_eq!(call("map(&a, @)", doc.clone()), v(json!([1, null, 3])));
    assert_eq!(call("[*].a", doc), v(json!([1, 3])));
}

#[test]
fn test_map_with_nested_expression() {
    let doc = json!([[1, 2], [3]]);
    assert_eq!(call("map(&length(@), @)", doc), v(json!([2, 1])));
}

// ============================================================================
// sort_by, max_by, min_by
// ============================================================================

#[test]
fn test_sort_by_number_key() {
    let doc = json!([{"n": "c", "age": 30}, {"n": "a", "age": 10}, {"n": "b", "age": 20}]);
    assert_eq!(call("sort_by(@, &age)[*].n", doc), v(json!(["a", "b", "c"])));
}

#[test]
fn test_sort_by_is_stable() {
    let doc = json!([
        {"k": 1, "id": "first"},
        {"k": 0, "id": "second"},
        {"k": 1, "id": "third"},
        {"k": 0, "id": "fourth"}
    ]);
    assert_eq!(
        call("sort_by(@, &k)[*].id", doc),
        v(json!(["second", "fourth", "first", "third"]))
    );
}

#[test]
fn test_sort_by_rejects_mixed_key_types() {
    let doc = json!([{"k": 1}, {"k": "a"}]);
    let err = call_err("sort_by(@, &k)", doc);
    assert_eq!(
        err,
        EvalError::KeyType {
            function: "sort_by",
            expected: "number",
            actual: "string",
        }
    );
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn test_sort_by_rejects_unsortable_keys() {
    let err = call_err("sort_by(@, &k)", json!([{"k": true}]));
    assert!(matches!(err, EvalError::KeyType { actual: "boolean", .. }));
}

#[test]
fn test_max_by_and_min_by() {
    let doc = json!([{"n": "a", "v": 3}, {"n": "b", "v": 7}, {"n": "c", "v": 7}, {"n": "d", "v": 1}]);
    assert_eq!(call("max_by(@, &v).n", doc.clone()), Value::from("b"));
    assert_eq!(call("min_by(@, &v).n", doc.clone()), Value::from("d"));
    assert_eq!(call("max_by(@, &n).n", doc), Value::from("d"));
    assert_eq!(call("max_by(@, &v)", json!([])), Value::Null);
}

#[test]
fn test_expref_argument_position_is_checked() {
    assert!(matches!(
        call_err("sort_by(@, 'age')", json!([])),
        EvalError::ArgumentType { function: "sort_by", position: 2, .. }
    ));
    assert!(matches!(
        call_err("map(@, &a)", json!([])),
        EvalError::ArgumentType { function: "map", position: 1, .. }
    ));
}

// ============================================================================
// Type functions
// ============================================================================

#[test]
fn test_type() {
    let test_cases = vec![
        (json!(null), "null"),
        (json!(true), "boolean"),
        (json!(1.5), "number"),
        (json!("s"), "string"),
        (json!([]), "array"),
        (json!({}), "object"),
    ];

    for (data, expected) in test_cases {
        assert_eq!(call("type(@)", data.clone()), Value::from(expected), "Failed for {}", data);
    }
    assert_eq!(call("type(&a)", json!(null)), Value::from("expref"));
}

#[test]
fn test_to_array() {
    assert_eq!(call("to_array(@)", json!([1])), v(json!([1])));
    assert_eq!(call("to_array(@)", json!("a")), v(json!(["a"])));
    assert_eq!(call("to_array(@)", json!(null)), v(json!([null])));
}

#[test]
fn test_to_string() {
    assert_eq!(call("to_string(@)", json!("x")), Value::from("x"));
    assert_eq!(call("to_string(@)", json!(2)), Value::from("2"));
    assert_eq!(call("to_string(@)", json!(1e21)), Value::from("1e+21"));
    assert_eq!(call("to_string(@)", json!({"a": [1, true]})), Value::from(r#"{"a":[1,true]}"#));
}

#[test]
fn test_to_number() {
    let test_cases = vec![
        (json!(5), json!(5)),
        (json!("12"), json!(12)),
        (json!(" -1.5e2 "), json!(-150)),
        (json!(".5"), json!(0.5)),
        (json!("abc"), json!(null)),
        (json!(""), json!(null)),
        (json!("inf"), json!(null)),
        (json!("1e999"), json!(null)),
        (json!(true), json!(null)),
        (json!([1]), json!(null)),
    ];

    for (data, expected) in test_cases {
        assert_eq!(call("to_number(@)", data.clone()), v(expected), "Failed for {}", data);
    }
}

// ============================================================================
// Arity
// ============================================================================

#[test]
fn test_arity_errors() {
    let err = call_err("abs(`1`, `2`)", json!(null));
    assert_eq!(
        err,
        EvalError::Arity {
            function: "abs",
            expected: 1,
            at_least: false,
            received: 2,
        }
    );
    assert_eq!(err.kind(), ErrorKind::Argument);
    assert_eq!(err.to_string(), "abs() takes 1 argument but received 2");

    let err = call_err("starts_with('a')", json!(null));
    assert_eq!(err.to_string(), "starts_with() takes 2 arguments but received 1");

    let err = call_err("not_null()", json!(null));
    assert_eq!(err.to_string(), "not_null() takes at least 1 argument but received 0");
}
