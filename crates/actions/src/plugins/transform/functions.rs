// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed library of value transforms usable in field mappings
//!
//! A transform is named by a string (`"uppercase"`) or an object with
//! arguments (`{"name": "split", "args": [","]}`). Lists apply in order.

use crate::error::ActionError;
use base64::{engine::general_purpose::STANDARD, Engine};
use botwork_core::value::{as_number, to_display_string};
use serde_json::{Number, Value};

pub const FUNCTIONS: &[&str] = &[
    "uppercase",
    "lowercase",
    "capitalize",
    "title_case",
    "camel_case",
    "snake_case",
    "kebab_case",
    "trim",
    "split",
    "join",
    "slice",
    "replace",
    "base64_encode",
    "base64_decode",
    "url_encode",
    "url_decode",
    "json_parse",
    "json_stringify",
    "to_number",
    "to_string",
    "length",
];

/// Apply a transform spec (string, `{name, args}` or a list of either)
pub fn apply_spec(spec: &Value, value: Value) -> Result<Value, ActionError> {
    match spec {
        Value::String(name) => apply(name, &[], value),
        Value::Object(map) => {
            let name = map
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| ActionError::config("Transform function needs a name"))?;
            let args = map
                .get("args")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            apply(name, args, value)
        }
        Value::Array(steps) => steps.iter().try_fold(value, |v, step| apply_spec(step, v)),
        Value::Null => Ok(value),
        other => Err(ActionError::config(format!(
            "Invalid transform function: {}",
            other
        ))),
    }
}

fn arg_str(args: &[Value], i: usize, default: &str) -> String {
    args.get(i)
        .map(to_display_string)
        .unwrap_or_else(|| default.to_string())
}

fn arg_index(args: &[Value], i: usize) -> Option<i64> {
    args.get(i).and_then(as_number).map(|n| n as i64)
}

/// Resolve a possibly negative slice bound against `len`
fn bound(index: Option<i64>, len: usize, default: usize) -> usize {
    match index {
        None => default,
        Some(i) if i < 0 => len.saturating_sub(i.unsigned_abs() as usize),
        Some(i) => (i as usize).min(len),
    }
}

fn words(s: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in s.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            out.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_numeric();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn text(value: &Value) -> String {
    to_display_string(value)
}

pub fn apply(name: &str, args: &[Value], value: Value) -> Result<Value, ActionError> {
    let out = match name {
        "uppercase" => Value::String(text(&value).to_uppercase()),
        "lowercase" => Value::String(text(&value).to_lowercase()),
        "capitalize" => Value::String(capitalize(&text(&value))),
        "title_case" => Value::String(
            words(&text(&value))
                .iter()
                .map(|w| capitalize(w))
                .collect::<Vec<_>>()
                .join(" "),
        ),
        "camel_case" => {
            let words = words(&text(&value));
            let mut out = String::new();
            for (i, w) in words.iter().enumerate() {
                if i == 0 {
                    out.push_str(w);
                } else {
                    out.push_str(&capitalize(w));
                }
            }
            Value::String(out)
        }
        "snake_case" => Value::String(words(&text(&value)).join("_")),
        "kebab_case" => Value::String(words(&text(&value)).join("-")),
        "trim" => Value::String(text(&value).trim().to_string()),
        "split" => {
            let sep = arg_str(args, 0, ",");
            Value::Array(
                text(&value)
                    .split(sep.as_str())
                    .map(|s| Value::String(s.to_string()))
                    .collect(),
            )
        }
        "join" => {
            let sep = arg_str(args, 0, ",");
            match &value {
                Value::Array(items) => Value::String(
                    items.iter().map(to_display_string).collect::<Vec<_>>().join(&sep),
                ),
                other => Value::String(text(other)),
            }
        }
        "slice" => {
            let (start, end) = (arg_index(args, 0), arg_index(args, 1));
            match &value {
                Value::Array(items) => {
                    let len = items.len();
                    let (s, e) = (bound(start, len, 0), bound(end, len, len));
                    Value::Array(items.get(s..e.max(s)).unwrap_or(&[]).to_vec())
                }
                other => {
                    let chars: Vec<char> = text(other).chars().collect();
                    let len = chars.len();
                    let (s, e) = (bound(start, len, 0), bound(end, len, len));
                    Value::String(chars.get(s..e.max(s)).unwrap_or(&[]).iter().collect())
                }
            }
        }
        "replace" => {
            let from = arg_str(args, 0, "");
            let to = arg_str(args, 1, "");
            if from.is_empty() {
                value
            } else {
                Value::String(text(&value).replace(&from, &to))
            }
        }
        "base64_encode" => Value::String(STANDARD.encode(text(&value))),
        "base64_decode" => {
            let bytes = STANDARD
                .decode(text(&value).trim())
                .map_err(|e| ActionError::failed(format!("base64_decode failed: {}", e)))?;
            Value::String(String::from_utf8_lossy(&bytes).into_owned())
        }
        "url_encode" => Value::String(urlencoding::encode(&text(&value)).into_owned()),
        "url_decode" => Value::String(
            urlencoding::decode(&text(&value))
                .map_err(|e| ActionError::failed(format!("url_decode failed: {}", e)))?
                .into_owned(),
        ),
        "json_parse" => match &value {
            Value::String(s) => serde_json::from_str(s)
                .map_err(|e| ActionError::failed(format!("json_parse failed: {}", e)))?,
            other => other.clone(),
        },
        "json_stringify" => Value::String(value.to_string()),
        "to_number" => match as_number(&value) {
            Some(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Value::from(n as i64),
            Some(n) => Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null),
            None => Value::Null,
        },
        "to_string" => Value::String(text(&value)),
        "length" => match &value {
            Value::Array(items) => Value::from(items.len()),
            Value::Object(map) => Value::from(map.len()),
            Value::Null => Value::from(0),
            other => Value::from(text(other).chars().count()),
        },
        other => {
            return Err(ActionError::config(format!(
                "Unknown transform function: {} (available: {})",
                other,
                FUNCTIONS.join(", ")
            )))
        }
    };
    Ok(out)
}

#[cfg(test)]
#[path = "functions_tests.rs"]
mod tests;
