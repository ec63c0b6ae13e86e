// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Condition trees evaluated over run state

use botwork_core::value::{
    compare, is_empty, loose_eq, lookup_path, to_display_string, type_name,
};
use botwork_core::ExecutionContext;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Logic {
    #[serde(alias = "AND")]
    And,
    #[serde(alias = "OR")]
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    #[serde(alias = "equals")]
    Eq,
    #[serde(alias = "not_equals")]
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
    Contains,
    NotContains,
    StartsWith,
    EndsWith,
    Matches,
    In,
    NotIn,
    Exists,
    NotExists,
    #[serde(alias = "is_empty")]
    Empty,
    NotEmpty,
    IsType,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Neq => "neq",
            Operator::Gt => "gt",
            Operator::Gte => "gte",
            Operator::Lt => "lt",
            Operator::Lte => "lte",
            Operator::Contains => "contains",
            Operator::NotContains => "not_contains",
            Operator::StartsWith => "starts_with",
            Operator::EndsWith => "ends_with",
            Operator::Matches => "matches",
            Operator::In => "in",
            Operator::NotIn => "not_in",
            Operator::Exists => "exists",
            Operator::NotExists => "not_exists",
            Operator::Empty => "empty",
            Operator::NotEmpty => "not_empty",
            Operator::IsType => "is_type",
        }
    }

    /// Whether the operator reads the `value` operand
    pub fn takes_value(&self) -> bool {
        !matches!(
            self,
            Operator::Exists | Operator::NotExists | Operator::Empty | Operator::NotEmpty
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    /// Dotted path, e.g. `trigger.user.id` or `action.fetch.body.items`
    pub field: String,
    pub operator: Operator,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    #[serde(alias = "operator")]
    pub logic: Logic,
    pub conditions: Vec<FilterCondition>,
}

/// A single rule or an AND/OR group of nested conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterCondition {
    Group(Group),
    Rule(Rule),
}

impl FilterCondition {
    pub fn from_value(value: &Value) -> Result<Self, String> {
        serde_json::from_value(value.clone()).map_err(|e| format!("Invalid condition: {}", e))
    }

    /// Evaluate with fields resolved against the run context
    pub fn evaluate(&self, ctx: &ExecutionContext) -> bool {
        self.eval(&|field| ctx.resolve_path(strip_braces(field)))
    }

    /// Evaluate with fields resolved inside a plain value
    pub fn evaluate_on(&self, data: &Value) -> bool {
        self.eval(&|field| lookup_path(data, strip_braces(field)).cloned())
    }

    fn eval(&self, resolve: &dyn Fn(&str) -> Option<Value>) -> bool {
        match self {
            FilterCondition::Group(group) => match group.logic {
                Logic::And => group.conditions.iter().all(|c| c.eval(resolve)),
                Logic::Or => group.conditions.iter().any(|c| c.eval(resolve)),
            },
            FilterCondition::Rule(rule) => {
                let actual = resolve(&rule.field);
                apply(rule.operator, actual.as_ref(), rule.value.as_ref())
            }
        }
    }

    /// Structural problems that would make evaluation meaningless
    pub fn problems(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_problems("condition", &mut out);
        out
    }

    fn collect_problems(&self, at: &str, out: &mut Vec<String>) {
        match self {
            FilterCondition::Group(group) => {
                if group.conditions.is_empty() {
                    out.push(format!("{}: group has no conditions", at));
                }
                for (i, c) in group.conditions.iter().enumerate() {
                    c.collect_problems(&format!("{}.conditions[{}]", at, i), out);
                }
            }
            FilterCondition::Rule(rule) => {
                if rule.field.trim().is_empty() {
                    out.push(format!("{}: field is required", at));
                }
                if rule.operator.takes_value() && rule.value.is_none() {
                    out.push(format!("{}: operator {} needs a value", at, rule.operator.as_str()));
                }
                match (rule.operator, rule.value.as_ref()) {
                    (Operator::Matches, Some(Value::String(p))) if !p.contains("{{") => {
                        if let Err(e) = Regex::new(p) {
                            out.push(format!("{}: invalid pattern: {}", at, e));
                        }
                    }
                    (Operator::In | Operator::NotIn, Some(v))
                        if !v.is_array() && !is_template(v) =>
                    {
                        out.push(format!("{}: value must be an array", at));
                    }
                    _ => {}
                }
            }
        }
    }
}

fn is_template(value: &Value) -> bool {
    value.as_str().is_some_and(|s| s.contains("{{"))
}

fn strip_braces(field: &str) -> &str {
    let trimmed = field.trim();
    trimmed
        .strip_prefix("{{")
        .and_then(|s| s.strip_suffix("}}"))
        .map(str::trim)
        .unwrap_or(trimmed)
}

fn present(actual: Option<&Value>) -> Option<&Value> {
    actual.filter(|v| !v.is_null())
}

/// Apply one operator; a missing field only satisfies the negative checks
pub fn apply(operator: Operator, actual: Option<&Value>, expected: Option<&Value>) -> bool {
    let null = Value::Null;
    let expected_or_null = expected.unwrap_or(&null);
    match operator {
        Operator::Exists => present(actual).is_some(),
        Operator::NotExists => present(actual).is_none(),
        Operator::Empty => match present(actual) {
            Some(v) => is_empty(v),
            None => true,
        },
        Operator::NotEmpty => present(actual).is_some_and(|v| !is_empty(v)),
        Operator::Eq => loose_eq(actual.unwrap_or(&null), expected_or_null),
        Operator::Neq => !loose_eq(actual.unwrap_or(&null), expected_or_null),
        Operator::Gt => ordering(actual, expected) == Some(Ordering::Greater),
        Operator::Gte => matches!(
            ordering(actual, expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Operator::Lt => ordering(actual, expected) == Some(Ordering::Less),
        Operator::Lte => matches!(
            ordering(actual, expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
        Operator::Contains => present(actual).is_some_and(|a| holds(a, expected_or_null)),
        Operator::NotContains => !present(actual).is_some_and(|a| holds(a, expected_or_null)),
        Operator::StartsWith => present(actual).is_some_and(|a| {
            to_display_string(a).starts_with(&to_display_string(expected_or_null))
        }),
        Operator::EndsWith => present(actual).is_some_and(|a| {
            to_display_string(a).ends_with(&to_display_string(expected_or_null))
        }),
        Operator::Matches => match (present(actual), expected.and_then(Value::as_str)) {
            (Some(a), Some(pattern)) => Regex::new(pattern)
                .map(|re| re.is_match(&to_display_string(a)))
                .unwrap_or(false),
            _ => false,
        },
        Operator::In => member_of(actual.unwrap_or(&null), expected_or_null),
        Operator::NotIn => !member_of(actual.unwrap_or(&null), expected_or_null),
        Operator::IsType => {
            let actual_type = actual.map_or("undefined", type_name);
            expected
                .and_then(Value::as_str)
                .is_some_and(|t| t.eq_ignore_ascii_case(actual_type))
        }
    }
}

fn ordering(actual: Option<&Value>, expected: Option<&Value>) -> Option<Ordering> {
    compare(present(actual)?, expected?)
}

fn holds(haystack: &Value, needle: &Value) -> bool {
    match haystack {
        Value::Array(items) => items.iter().any(|item| loose_eq(item, needle)),
        Value::Object(map) => map.contains_key(&to_display_string(needle)),
        other => to_display_string(other).contains(&to_display_string(needle)),
    }
}

fn member_of(actual: &Value, list: &Value) -> bool {
    match list {
        Value::Array(items) => items.iter().any(|item| loose_eq(actual, item)),
        Value::String(s) => !actual.is_null() && s.contains(&to_display_string(actual)),
        _ => false,
    }
}

fn rule(field: &str, operator: Operator, value: Option<Value>) -> FilterCondition {
    FilterCondition::Rule(Rule {
        field: field.to_string(),
        operator,
        value,
    })
}

pub fn equals(field: &str, value: impl Into<Value>) -> FilterCondition {
    rule(field, Operator::Eq, Some(value.into()))
}

pub fn not_equals(field: &str, value: impl Into<Value>) -> FilterCondition {
    rule(field, Operator::Neq, Some(value.into()))
}

pub fn greater_than(field: &str, value: impl Into<Value>) -> FilterCondition {
    rule(field, Operator::Gt, Some(value.into()))
}

pub fn less_than(field: &str, value: impl Into<Value>) -> FilterCondition {
    rule(field, Operator::Lt, Some(value.into()))
}

pub fn contains(field: &str, value: impl Into<Value>) -> FilterCondition {
    rule(field, Operator::Contains, Some(value.into()))
}

pub fn matches(field: &str, pattern: &str) -> FilterCondition {
    rule(field, Operator::Matches, Some(Value::String(pattern.to_string())))
}

pub fn is_in<I, V>(field: &str, values: I) -> FilterCondition
where
    I: IntoIterator<Item = V>,
    V: Into<Value>,
{
    let list = values.into_iter().map(Into::into).collect();
    rule(field, Operator::In, Some(Value::Array(list)))
}

pub fn exists(field: &str) -> FilterCondition {
    rule(field, Operator::Exists, None)
}

pub fn not_exists(field: &str) -> FilterCondition {
    rule(field, Operator::NotExists, None)
}

pub fn and(conditions: impl IntoIterator<Item = FilterCondition>) -> FilterCondition {
    FilterCondition::Group(Group {
        logic: Logic::And,
        conditions: conditions.into_iter().collect(),
    })
}

pub fn or(conditions: impl IntoIterator<Item = FilterCondition>) -> FilterCondition {
    FilterCondition::Group(Group {
        logic: Logic::Or,
        conditions: conditions.into_iter().collect(),
    })
}

#[cfg(test)]
#[path = "condition_tests.rs"]
mod tests;
