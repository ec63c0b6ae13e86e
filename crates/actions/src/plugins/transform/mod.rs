// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Data reshaping between actions
//!
//! Every transform reads a source value (a run-state path, inline JSON,
//! or the previous action's output by default) and returns the reshaped
//! value as its output.

mod functions;
mod jsonpath;

use super::filter::FilterCondition;
use crate::action::{Action, ActionInput, ActionOutput};
use crate::config::ConfigExt;
use crate::error::ActionError;
use crate::schema::{ConfigSchema, FieldSpec, FieldType, ValidationResult};
use async_trait::async_trait;
use botwork_core::value::{as_number, lookup_path, to_display_string};
use botwork_core::{ActionType, ExecutionContext};
use regex::Regex;
use serde_json::{json, Map, Number, Value};
use std::sync::LazyLock;

pub const TRANSFORM_TYPES: &[&str] = &[
    "map",
    "pick",
    "omit",
    "flatten",
    "merge",
    "array_map",
    "array_filter",
    "array_reduce",
    "template",
    "jsonpath",
];

pub const REDUCE_OPERATIONS: &[&str] = &[
    "sum", "count", "min", "max", "avg", "concat", "join", "group_by", "unique", "first", "last",
];

// Constant patterns, compile-time verified
#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^{}]+?)\s*\}\}").expect("constant regex pattern is valid")
});
#[allow(clippy::expect_used)]
static SINGLE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\{\{\s*([^{}]+?)\s*\}\}\s*$").expect("constant regex pattern is valid")
});

pub struct TransformAction {
    schema: ConfigSchema,
}

impl Default for TransformAction {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformAction {
    pub fn new() -> Self {
        let schema = ConfigSchema::new()
            .field(
                FieldSpec::required("transformType", FieldType::String).one_of(TRANSFORM_TYPES),
            )
            .field(
                FieldSpec::optional("source", FieldType::Any)
                    .describe("Path, JSON or literal; defaults to the previous output"),
            )
            .field(FieldSpec::optional("mappings", FieldType::Object))
            .field(FieldSpec::optional("fields", FieldType::Array))
            .field(FieldSpec::optional("separator", FieldType::String))
            .field(FieldSpec::optional("merge", FieldType::Array))
            .field(FieldSpec::optional("condition", FieldType::Object))
            .field(
                FieldSpec::optional("operation", FieldType::String).one_of(REDUCE_OPERATIONS),
            )
            .field(FieldSpec::optional("field", FieldType::String))
            .field(FieldSpec::optional("transform", FieldType::Any))
            .field(FieldSpec::optional("template", FieldType::String))
            .field(FieldSpec::optional("parseJson", FieldType::Boolean))
            .field(FieldSpec::optional("path", FieldType::String))
            .field(FieldSpec::optional("first", FieldType::Boolean));
        Self { schema }
    }
}

/// Resolve the `source` setting
///
/// A lone `{{path}}` in the authored config keeps the value's type.
/// Otherwise the interpolated string is tried as a path, then as JSON,
/// then taken literally.
fn resolve_source(
    ctx: &ExecutionContext,
    raw: Option<&Value>,
    interpolated: Option<&Value>,
) -> Value {
    let single = raw
        .and_then(Value::as_str)
        .and_then(|s| SINGLE_PLACEHOLDER.captures(s));
    if let Some(caps) = single {
        if let Some(value) = ctx.resolve_path(&caps[1]) {
            return value;
        }
    }
    match interpolated {
        None | Some(Value::Null) => ctx.previous_output().cloned().unwrap_or(Value::Null),
        Some(Value::String(s)) => {
            let s = s.trim();
            ctx.resolve_path(s)
                .or_else(|| serde_json::from_str(s).ok())
                .unwrap_or_else(|| Value::String(s.to_string()))
        }
        Some(other) => other.clone(),
    }
}

fn missing(value: Option<&Value>) -> bool {
    value.is_none_or(Value::is_null)
}

fn number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Path lookup where `""`, `"."`, `"$"` and `"this"` mean the value itself
fn get<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    match path.trim() {
        "" | "." | "$" | "this" => Some(value),
        p => lookup_path(value, p),
    }
}

/// Write `value` at a dotted path, creating objects along the way
pub fn set_path(target: &mut Map<String, Value>, path: &str, value: Value) {
    let mut parts = path.split('.').peekable();
    let mut current = target;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            current.insert(part.to_string(), value);
            return;
        }
        let slot = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !slot.is_object() {
            *slot = Value::Object(Map::new());
        }
        match slot {
            Value::Object(map) => current = map,
            _ => return,
        }
    }
}

pub fn remove_path(target: &mut Value, path: &str) {
    let parts: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = parts.split_last() else {
        return;
    };
    let mut current = target;
    for part in parents {
        match current.get_mut(*part) {
            Some(next) => current = next,
            None => return,
        }
    }
    if let Value::Object(map) = current {
        map.remove(*last);
    }
}

fn flatten_into(value: &Value, prefix: &str, separator: &str, out: &mut Map<String, Value>) {
    let key = |k: &str| {
        if prefix.is_empty() {
            k.to_string()
        } else {
            format!("{}{}{}", prefix, separator, k)
        }
    };
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (k, v) in map {
                flatten_into(v, &key(k), separator, out);
            }
        }
        Value::Array(items) if !items.is_empty() => {
            for (i, v) in items.iter().enumerate() {
                flatten_into(v, &key(&i.to_string()), separator, out);
            }
        }
        other => {
            out.insert(prefix.to_string(), other.clone());
        }
    }
}

pub fn flatten(value: &Value, separator: &str) -> Value {
    let mut out = Map::new();
    match value {
        Value::Object(_) | Value::Array(_) => flatten_into(value, "", separator, &mut out),
        other => return other.clone(),
    }
    Value::Object(out)
}

/// Objects merge recursively, arrays concatenate, anything else is replaced
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut a), Value::Object(b)) => {
            for (k, v) in b {
                let merged = match a.remove(&k) {
                    Some(existing) => deep_merge(existing, v),
                    None => v,
                };
                a.insert(k, merged);
            }
            Value::Object(a)
        }
        (Value::Array(mut a), Value::Array(b)) => {
            a.extend(b);
            Value::Array(a)
        }
        (_, overlay) => overlay,
    }
}

fn apply_mappings(item: &Value, mappings: &Map<String, Value>) -> Result<Value, ActionError> {
    let mut out = Map::new();
    for (target, spec) in mappings {
        let (from, transform, default) = match spec {
            Value::String(path) => (path.as_str(), None, None),
            Value::Object(m) => (
                m.get("from")
                    .or_else(|| m.get("path"))
                    .and_then(Value::as_str)
                    .unwrap_or(target),
                m.get("transform"),
                m.get("default"),
            ),
            literal => {
                set_path(&mut out, target, literal.clone());
                continue;
            }
        };
        let value = match get(item, from).filter(|v| !v.is_null()) {
            Some(v) => v.clone(),
            None => match default {
                Some(d) => d.clone(),
                None => continue,
            },
        };
        let value = match transform {
            Some(spec) => functions::apply_spec(spec, value)?,
            None => value,
        };
        set_path(&mut out, target, value);
    }
    Ok(Value::Object(out))
}

fn pick(item: &Value, fields: &[String]) -> Value {
    let mut out = Map::new();
    for field in fields {
        if let Some(v) = get(item, field) {
            set_path(&mut out, field, v.clone());
        }
    }
    Value::Object(out)
}

fn omit(item: &Value, fields: &[String]) -> Value {
    let mut out = item.clone();
    for field in fields {
        remove_path(&mut out, field);
    }
    out
}

/// Apply `f` to each element of an array, or to the value itself
fn each(value: &Value, f: impl Fn(&Value) -> Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(f).collect()),
        other => f(other),
    }
}

fn require_array(value: Value) -> Result<Vec<Value>, ActionError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(ActionError::config(format!(
            "Source must be an array, got {}",
            botwork_core::value::type_name(&other)
        ))),
    }
}

pub fn reduce(
    items: &[Value],
    operation: &str,
    field: Option<&str>,
    separator: &str,
) -> Result<Value, ActionError> {
    let values: Vec<Value> = match field {
        Some(f) => items
            .iter()
            .map(|i| get(i, f).cloned().unwrap_or(Value::Null))
            .collect(),
        None => items.to_vec(),
    };
    let numbers: Vec<f64> = values.iter().filter_map(as_number).collect();

    let out = match operation {
        "sum" => number(numbers.iter().sum()),
        "count" => Value::from(items.len()),
        "min" => numbers
            .iter()
            .copied()
            .reduce(f64::min)
            .map(number)
            .unwrap_or(Value::Null),
        "max" => numbers
            .iter()
            .copied()
            .reduce(f64::max)
            .map(number)
            .unwrap_or(Value::Null),
        "avg" => {
            if numbers.is_empty() {
                Value::Null
            } else {
                number(numbers.iter().sum::<f64>() / numbers.len() as f64)
            }
        }
        "concat" => {
            let mut out = Vec::new();
            for v in values {
                match v {
                    Value::Array(inner) => out.extend(inner),
                    other => out.push(other),
                }
            }
            Value::Array(out)
        }
        "join" => Value::String(
            values
                .iter()
                .map(to_display_string)
                .collect::<Vec<_>>()
                .join(separator),
        ),
        "group_by" => {
            let field = field.ok_or_else(|| ActionError::config("group_by requires a field"))?;
            let mut groups = Map::new();
            for item in items {
                let key = match get(item, field) {
                    Some(v) if !v.is_null() => to_display_string(v),
                    _ => "undefined".to_string(),
                };
                if let Value::Array(group) = groups
                    .entry(key)
                    .or_insert_with(|| Value::Array(Vec::new()))
                {
                    group.push(item.clone());
                }
            }
            Value::Object(groups)
        }
        "unique" => {
            let mut out: Vec<Value> = Vec::new();
            for v in values {
                if !out.contains(&v) {
                    out.push(v);
                }
            }
            Value::Array(out)
        }
        "first" => values.into_iter().next().unwrap_or(Value::Null),
        "last" => values.into_iter().last().unwrap_or(Value::Null),
        other => {
            return Err(ActionError::config(format!(
                "Unknown reduce operation: {}",
                other
            )))
        }
    };
    Ok(out)
}

/// Fill `{{path}}` placeholders left after context interpolation from `data`
pub fn render_template(template: &str, data: &Value) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures| match get(data, &caps[1]) {
            Some(v) => to_display_string(v),
            None => caps[0].to_string(),
        })
        .into_owned()
}

fn string_list(config: &Map<String, Value>, key: &str) -> Result<Vec<String>, ActionError> {
    let list = config
        .array(key)
        .ok_or_else(|| ActionError::config(format!("Missing required field: {}", key)))?;
    Ok(list.iter().map(to_display_string).collect())
}

fn transform(input: &ActionInput<'_>) -> Result<Value, ActionError> {
    let config = input.config;
    let kind = config.require_str("transformType")?;
    let source = resolve_source(
        input.context,
        input.action.config.get("source"),
        config.get("source"),
    );

    match kind {
        "map" => {
            let mappings = config
                .object("mappings")
                .ok_or_else(|| ActionError::config("Missing required field: mappings"))?;
            apply_mappings(&source, mappings)
        }
        "pick" => {
            let fields = string_list(config, "fields")?;
            Ok(each(&source, |item| pick(item, &fields)))
        }
        "omit" => {
            let fields = string_list(config, "fields")?;
            Ok(each(&source, |item| omit(item, &fields)))
        }
        "flatten" => Ok(flatten(&source, config.str_or("separator", "."))),
        "merge" => {
            let others = config
                .array("merge")
                .ok_or_else(|| ActionError::config("Missing required field: merge"))?;
            let raw_others = input.action.config.get("merge").and_then(Value::as_array);
            let merged = others.iter().enumerate().fold(source, |acc, (i, other)| {
                let raw = raw_others.and_then(|r| r.get(i));
                deep_merge(acc, resolve_source(input.context, raw, Some(other)))
            });
            Ok(merged)
        }
        "array_map" => {
            let items = require_array(source)?;
            let mut out = Vec::with_capacity(items.len());
            for item in &items {
                let value = match (config.object("mappings"), config.str("field")) {
                    (Some(mappings), _) => apply_mappings(item, mappings)?,
                    (None, Some(field)) => get(item, field).cloned().unwrap_or(Value::Null),
                    (None, None) => {
                        return Err(ActionError::config(
                            "array_map requires mappings or field",
                        ))
                    }
                };
                let value = match config.get("transform") {
                    Some(spec) if config.object("mappings").is_none() => {
                        functions::apply_spec(spec, value)?
                    }
                    _ => value,
                };
                out.push(value);
            }
            Ok(Value::Array(out))
        }
        "array_filter" => {
            let items = require_array(source)?;
            let raw = config
                .get("condition")
                .ok_or_else(|| ActionError::config("Missing required field: condition"))?;
            let condition = FilterCondition::from_value(raw).map_err(ActionError::Config)?;
            Ok(Value::Array(
                items
                    .into_iter()
                    .filter(|item| condition.evaluate_on(item))
                    .collect(),
            ))
        }
        "array_reduce" => {
            let items = require_array(source)?;
            let operation = config.require_str("operation")?;
            reduce(
                &items,
                operation,
                config.str("field"),
                config.str_or("separator", ","),
            )
        }
        "template" => {
            let template = config.require_str("template")?;
            let rendered = render_template(template, &source);
            if config.bool_or("parseJson", false) {
                serde_json::from_str(&rendered).map_err(|e| {
                    ActionError::failed(format!("Template output is not valid JSON: {}", e))
                })
            } else {
                Ok(Value::String(rendered))
            }
        }
        "jsonpath" => {
            let path = config.require_str("path")?;
            let matches = jsonpath::query(&source, path).map_err(ActionError::Config)?;
            if config.bool_or("first", false) {
                Ok(matches.into_iter().next().unwrap_or(Value::Null))
            } else {
                Ok(Value::Array(matches))
            }
        }
        other => Err(ActionError::config(format!(
            "Unknown transform type: {}",
            other
        ))),
    }
}

#[async_trait]
impl Action for TransformAction {
    fn action_type(&self) -> ActionType {
        ActionType::Transform
    }

    fn name(&self) -> &str {
        "Transform Data"
    }

    fn description(&self) -> &str {
        "Reshape data from earlier actions or the trigger"
    }

    fn schema(&self) -> &ConfigSchema {
        &self.schema
    }

    fn validate(&self, config: &Map<String, Value>) -> ValidationResult {
        let mut result = self.schema.validate(config);
        let required: &[&str] = match config.str("transformType") {
            Some("map") => &["mappings"],
            Some("pick" | "omit") => &["fields"],
            Some("merge") => &["merge"],
            Some("array_filter") => &["condition"],
            Some("array_reduce") => &["operation"],
            Some("template") => &["template"],
            Some("jsonpath") => &["path"],
            _ => &[],
        };
        for key in required {
            if missing(config.get(*key)) {
                result.error(format!("Missing required field: {}", key));
            }
        }
        if config.str("transformType") == Some("array_map")
            && missing(config.get("mappings"))
            && missing(config.get("field"))
        {
            result.error("array_map requires mappings or field");
        }
        if config.str("operation") == Some("group_by") && config.str("field").is_none() {
            result.error("group_by requires a field");
        }
        if let Some(raw) = config.get("condition").filter(|v| v.is_object()) {
            match FilterCondition::from_value(raw) {
                Ok(condition) => {
                    for problem in condition.problems() {
                        result.error(problem);
                    }
                }
                Err(e) => result.error(e),
            }
        }
        result
    }

    async fn execute(&self, input: ActionInput<'_>) -> Result<ActionOutput, ActionError> {
        let data = transform(&input)?;
        let kind = input.config.str_or("transformType", "");
        tracing::debug!(transform_type = kind, "transformed");
        Ok(ActionOutput::data(data).with_metadata(json!({ "transformType": kind })))
    }
}

#[cfg(test)]
mod tests;
