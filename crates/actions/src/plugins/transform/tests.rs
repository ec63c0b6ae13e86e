// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::plugins::test_support::{context, run};
use serde_json::json;
use yare::parameterized;

fn ctx_with_previous(output: Value) -> ExecutionContext {
    let mut ctx = context();
    ctx.set_action_output("prev", output);
    ctx
}

async fn transform_previous(previous: Value, config: Value) -> Value {
    let ctx = ctx_with_previous(previous);
    run(&TransformAction::new(), &ctx, config)
        .await
        .unwrap()
        .data
        .unwrap()
}

fn orders() -> Value {
    json!([
        {"id": 1, "status": "paid", "total": 10, "tags": ["a"]},
        {"id": 2, "status": "open", "total": 5.5, "tags": ["b", "c"]},
        {"id": 3, "status": "paid", "total": 4, "tags": ["a"]}
    ])
}

#[tokio::test]
async fn map_builds_nested_targets_with_transforms_and_defaults() {
    let out = transform_previous(
        json!({"user": {"first": "ada", "email": "ADA@X.COM"}}),
        json!({
            "transformType": "map",
            "mappings": {
                "name": {"from": "user.first", "transform": "capitalize"},
                "contact.email": {"from": "user.email", "transform": "lowercase"},
                "role": {"from": "user.role", "default": "member"},
                "missing": "user.nope",
                "constant": 42
            }
        }),
    )
    .await;

    assert_eq!(
        out,
        json!({
            "name": "Ada",
            "contact": {"email": "ada@x.com"},
            "role": "member",
            "constant": 42
        })
    );
}

#[tokio::test]
async fn pick_and_omit_work_on_objects_and_arrays() {
    let picked = transform_previous(
        json!({"a": 1, "b": {"c": 2, "d": 3}}),
        json!({"transformType": "pick", "fields": ["a", "b.c"]}),
    )
    .await;
    assert_eq!(picked, json!({"a": 1, "b": {"c": 2}}));

    let omitted = transform_previous(
        orders(),
        json!({"transformType": "omit", "fields": ["tags", "status"]}),
    )
    .await;
    assert_eq!(omitted[1], json!({"id": 2, "total": 5.5}));
}

#[tokio::test]
async fn flatten_joins_keys() {
    let out = transform_previous(
        json!({"a": {"b": 1, "c": [10, 20]}, "d": {}}),
        json!({"transformType": "flatten", "separator": "_"}),
    )
    .await;
    assert_eq!(out, json!({"a_b": 1, "a_c_0": 10, "a_c_1": 20, "d": {}}));
}

#[tokio::test]
async fn merge_combines_source_with_other_values() {
    let mut ctx = ctx_with_previous(json!({"a": {"x": 1}, "list": [1]}));
    ctx.set_variable("extra", json!({"a": {"y": 2}}));
    let out = run(
        &TransformAction::new(),
        &ctx,
        json!({
            "transformType": "merge",
            "merge": ["{{extra}}", {"list": [2], "b": true}]
        }),
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(out, json!({"a": {"x": 1, "y": 2}, "list": [1, 2], "b": true}));
}

#[tokio::test]
async fn array_map_extracts_fields() {
    let out = transform_previous(
        orders(),
        json!({"transformType": "array_map", "field": "status", "transform": "uppercase"}),
    )
    .await;
    assert_eq!(out, json!(["PAID", "OPEN", "PAID"]));

    let out = transform_previous(
        orders(),
        json!({"transformType": "array_map", "mappings": {"orderId": "id"}}),
    )
    .await;
    assert_eq!(out, json!([{"orderId": 1}, {"orderId": 2}, {"orderId": 3}]));
}

#[tokio::test]
async fn array_filter_uses_condition_trees() {
    let out = transform_previous(
        orders(),
        json!({
            "transformType": "array_filter",
            "condition": {"logic": "and", "conditions": [
                {"field": "status", "operator": "eq", "value": "paid"},
                {"field": "total", "operator": "gt", "value": 5}
            ]}
        }),
    )
    .await;
    assert_eq!(out.as_array().unwrap().len(), 1);
    assert_eq!(out[0]["id"], 1);
}

#[parameterized(
    sum = { "sum", Some("total"), json!(19.5) },
    count = { "count", None, json!(3) },
    min = { "min", Some("total"), json!(4) },
    max = { "max", Some("total"), json!(10) },
    avg = { "avg", Some("total"), json!(6.5) },
    concat = { "concat", Some("tags"), json!(["a", "b", "c", "a"]) },
    join = { "join", Some("id"), json!("1,2,3") },
    unique = { "unique", Some("status"), json!(["paid", "open"]) },
    first = { "first", Some("id"), json!(1) },
    last = { "last", Some("id"), json!(3) },
)]
fn reduce_operations(operation: &str, field: Option<&str>, expected: Value) {
    let items = orders().as_array().unwrap().clone();
    assert_eq!(reduce(&items, operation, field, ",").unwrap(), expected);
}

#[test]
fn group_by_collects_items_per_key() {
    let items = orders().as_array().unwrap().clone();
    let grouped = reduce(&items, "group_by", Some("status"), ",").unwrap();
    assert_eq!(grouped["paid"].as_array().unwrap().len(), 2);
    assert_eq!(grouped["open"][0]["id"], 2);
    assert!(reduce(&items, "group_by", None, ",").is_err());
}

#[test]
fn reduce_on_empty_input() {
    assert_eq!(reduce(&[], "sum", None, ",").unwrap(), json!(0));
    assert_eq!(reduce(&[], "avg", None, ",").unwrap(), Value::Null);
    assert_eq!(reduce(&[], "first", None, ",").unwrap(), Value::Null);
}

#[tokio::test]
async fn template_fills_from_source_after_context() {
    let mut ctx = ctx_with_previous(json!({"name": "Ada", "count": 3}));
    ctx.set_variable("greeting", json!("Hello"));
    let out = run(
        &TransformAction::new(),
        &ctx,
        json!({"transformType": "template", "template": "{{greeting}} {{name}}, you have {{count}} {{unknown}}"}),
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(out, json!("Hello Ada, you have 3 {{unknown}}"));
}

#[tokio::test]
async fn template_can_produce_json() {
    let out = transform_previous(
        json!({"id": 7}),
        json!({"transformType": "template", "template": "{\"ref\": {{id}}}", "parseJson": true}),
    )
    .await;
    assert_eq!(out, json!({"ref": 7}));
}

#[tokio::test]
async fn jsonpath_queries_the_source() {
    let previous = json!({"data": {"items": [{"v": 1}, {"v": 2}]}});
    let all = transform_previous(
        previous.clone(),
        json!({"transformType": "jsonpath", "path": "$.data.items[*].v"}),
    )
    .await;
    assert_eq!(all, json!([1, 2]));

    let first = transform_previous(
        previous,
        json!({"transformType": "jsonpath", "path": "$..v", "first": true}),
    )
    .await;
    assert_eq!(first, json!(1));
}

#[tokio::test]
async fn source_placeholder_keeps_value_type() {
    let mut ctx = context();
    ctx.set_action_output("fetch", json!({"body": {"items": [1, 2, 3]}}));
    ctx.set_action_output("other", json!("later"));
    let out = run(
        &TransformAction::new(),
        &ctx,
        json!({"transformType": "array_reduce", "operation": "sum", "source": "{{action.fetch.body.items}}"}),
    )
    .await
    .unwrap()
    .data
    .unwrap();
    assert_eq!(out, json!(6));
}

#[tokio::test]
async fn source_accepts_paths_and_inline_json() {
    let mut ctx = context();
    ctx.set_variable("nums", json!([4, 5]));
    let action = TransformAction::new();

    let by_path = run(
        &action,
        &ctx,
        json!({"transformType": "array_reduce", "operation": "max", "source": "nums"}),
    )
    .await
    .unwrap();
    assert_eq!(by_path.data.unwrap(), json!(5));

    let inline = run(
        &action,
        &ctx,
        json!({"transformType": "array_reduce", "operation": "count", "source": "[1, 2, 3]"}),
    )
    .await
    .unwrap();
    assert_eq!(inline.data.unwrap(), json!(3));
}

#[tokio::test]
async fn array_operations_reject_non_arrays() {
    let ctx = ctx_with_previous(json!({"not": "an array"}));
    let err = run(
        &TransformAction::new(),
        &ctx,
        json!({"transformType": "array_reduce", "operation": "count"}),
    )
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Source must be an array, got object");
}

#[test]
fn validate_checks_type_specific_fields() {
    let action = TransformAction::new();
    let cases = [
        (json!({"transformType": "map"}), vec!["Missing required field: mappings"]),
        (json!({"transformType": "pick"}), vec!["Missing required field: fields"]),
        (
            json!({"transformType": "array_map"}),
            vec!["array_map requires mappings or field"],
        ),
        (
            json!({"transformType": "array_reduce", "operation": "group_by"}),
            vec!["group_by requires a field"],
        ),
        (
            json!({"transformType": "explode"}),
            vec!["Field 'transformType' must be one of: map, pick, omit, flatten, merge, array_map, array_filter, array_reduce, template, jsonpath"],
        ),
    ];
    for (config, errors) in cases {
        assert_eq!(action.validate(config.as_object().unwrap()).errors, errors);
    }
}

#[test]
fn set_and_remove_paths() {
    let mut map = Map::new();
    set_path(&mut map, "a.b.c", json!(1));
    set_path(&mut map, "a.d", json!(2));
    let mut value = Value::Object(map);
    assert_eq!(value, json!({"a": {"b": {"c": 1}, "d": 2}}));

    remove_path(&mut value, "a.b.c");
    remove_path(&mut value, "x.y");
    assert_eq!(value, json!({"a": {"b": {}, "d": 2}}));
}
