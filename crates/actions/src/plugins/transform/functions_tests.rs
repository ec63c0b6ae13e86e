// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

#[parameterized(
    uppercase = { "uppercase", json!("abc"), json!("ABC") },
    lowercase = { "lowercase", json!("AbC"), json!("abc") },
    capitalize = { "capitalize", json!("hello world"), json!("Hello world") },
    title_case = { "title_case", json!("hello big_world"), json!("Hello Big World") },
    camel_case = { "camel_case", json!("user first-name"), json!("userFirstName") },
    snake_case = { "snake_case", json!("userFirstName"), json!("user_first_name") },
    kebab_case = { "kebab_case", json!("User First Name"), json!("user-first-name") },
    trim = { "trim", json!("  x  "), json!("x") },
    base64_encode = { "base64_encode", json!("hello"), json!("aGVsbG8=") },
    base64_decode = { "base64_decode", json!("aGVsbG8="), json!("hello") },
    url_encode = { "url_encode", json!("a b&c"), json!("a%20b%26c") },
    url_decode = { "url_decode", json!("a%20b"), json!("a b") },
    json_parse = { "json_parse", json!("{\"a\":1}"), json!({"a": 1}) },
    json_stringify = { "json_stringify", json!({"a": 1}), json!("{\"a\":1}") },
    to_number_int = { "to_number", json!("42"), json!(42) },
    to_number_float = { "to_number", json!("2.5"), json!(2.5) },
    to_number_invalid = { "to_number", json!("abc"), Value::Null },
    to_string = { "to_string", json!(7), json!("7") },
    length_string = { "length", json!("héllo"), json!(5) },
    length_array = { "length", json!([1, 2, 3]), json!(3) },
)]
fn simple_functions(name: &str, input: Value, expected: Value) {
    assert_eq!(apply(name, &[], input).unwrap(), expected);
}

#[parameterized(
    split = { json!({"name": "split", "args": [";"]}), json!("a;b"), json!(["a", "b"]) },
    join = { json!({"name": "join", "args": ["-"]}), json!(["a", 1]), json!("a-1") },
    slice_string = { json!({"name": "slice", "args": [1, 3]}), json!("abcdef"), json!("bc") },
    slice_negative = { json!({"name": "slice", "args": [-2]}), json!("abcdef"), json!("ef") },
    slice_array = { json!({"name": "slice", "args": [0, 2]}), json!([1, 2, 3]), json!([1, 2]) },
    replace = { json!({"name": "replace", "args": ["-", "_"]}), json!("a-b-c"), json!("a_b_c") },
    chained = { json!(["trim", "uppercase"]), json!("  hi "), json!("HI") },
)]
fn functions_with_args(spec: Value, input: Value, expected: Value) {
    assert_eq!(apply_spec(&spec, input).unwrap(), expected);
}

#[test]
fn unknown_function_is_a_config_error() {
    let err = apply("reverse", &[], json!("x")).unwrap_err();
    let message = err.to_string();
    assert!(message.starts_with("Unknown transform function: reverse"), "{message}");
    assert!(message.contains("available: uppercase, lowercase"), "{message}");
}

#[test]
fn bad_base64_fails() {
    assert!(apply("base64_decode", &[], json!("%%%")).is_err());
}

#[test]
fn every_listed_function_is_known() {
    for name in FUNCTIONS {
        let result = apply(name, &[], json!("x"));
        assert!(
            !matches!(result, Err(ActionError::Config(_))),
            "{} is listed but unknown",
            name
        );
    }
}
