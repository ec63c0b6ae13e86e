// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;
use yare::parameterized;

fn store() -> Value {
    json!({
        "store": {
            "books": [
                {"title": "A", "price": 8, "author": {"name": "Ann"}},
                {"title": "B", "price": 12, "author": {"name": "Bo"}}
            ],
            "owner": {"name": "Cy"}
        }
    })
}

#[parameterized(
    root = { "$", vec![store()] },
    dotted = { "$.store.owner.name", vec![json!("Cy")] },
    bracket_key = { "$['store']['owner'].name", vec![json!("Cy")] },
    index = { "$.store.books[1].title", vec![json!("B")] },
    negative_index = { "$.store.books[-1].price", vec![json!(12)] },
    wildcard = { "$.store.books[*].title", vec![json!("A"), json!("B")] },
    dot_wildcard = { "$.store.owner.*", vec![json!("Cy")] },
    recursive = { "$..name", vec![json!("Ann"), json!("Bo"), json!("Cy")] },
    missing = { "$.store.nope", Vec::<Value>::new() },
    out_of_range = { "$.store.books[5]", Vec::<Value>::new() },
    no_dollar = { "store.books[0].title", vec![json!("A")] },
)]
fn queries(path: &str, expected: Vec<Value>) {
    assert_eq!(query(&store(), path).unwrap(), expected);
}

#[parameterized(
    unclosed = { "$.a[0" },
    filter = { "$.a[?(@.x)]" },
    empty_key = { "$.a.." },
)]
fn unsupported_paths_fail(path: &str) {
    assert!(query(&store(), path).is_err());
}
