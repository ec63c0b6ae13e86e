// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative config schemas for action plugins
//!
//! A schema lists the fields a plugin understands. Validation reports hard
//! errors (missing, mistyped, out-of-range) separately from warnings
//! (unknown fields), so newer configs still load on older engines.

use botwork_core::value::{as_number, type_name};
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Any,
}

impl FieldType {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => as_number(value).is_some() && !value.is_boolean(),
            FieldType::Integer => {
                !value.is_boolean() && as_number(value).is_some_and(|n| n.fract() == 0.0)
            }
            FieldType::Boolean => {
                value.is_boolean() || matches!(value.as_str(), Some("true" | "false"))
            }
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
            FieldType::Any => true,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Object => "object",
            FieldType::Array => "array",
            FieldType::Any => "any",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub types: Vec<FieldType>,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<&'static str>,
    #[serde(skip)]
    pattern: Option<Regex>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<&'static [&'static str]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    pub sensitive: bool,
}

impl FieldSpec {
    fn new(name: &'static str, field_type: FieldType, required: bool) -> Self {
        Self {
            name,
            types: vec![field_type],
            required,
            description: None,
            pattern: None,
            enum_values: None,
            min: None,
            max: None,
            sensitive: false,
        }
    }

    pub fn required(name: &'static str, field_type: FieldType) -> Self {
        Self::new(name, field_type, true)
    }

    pub fn optional(name: &'static str, field_type: FieldType) -> Self {
        Self::new(name, field_type, false)
    }

    /// Also accept another type
    pub fn or(mut self, field_type: FieldType) -> Self {
        self.types.push(field_type);
        self
    }

    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// String values must match; an invalid pattern disables the check
    pub fn pattern(mut self, pattern: &str) -> Self {
        self.pattern = Regex::new(pattern).ok();
        self
    }

    pub fn one_of(mut self, values: &'static [&'static str]) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.sensitive = true;
        self
    }

    fn check(&self, value: &Value, result: &mut ValidationResult) {
        // Templates are only resolvable at run time
        if value.as_str().is_some_and(|s| s.contains("{{")) {
            return;
        }

        if !self.types.iter().any(|t| t.accepts(value)) {
            let expected: Vec<&str> = self.types.iter().map(FieldType::as_str).collect();
            result.error(format!(
                "Field '{}' must be of type {}, got {}",
                self.name,
                expected.join(" | "),
                type_name(value)
            ));
            return;
        }

        if let (Some(pattern), Some(s)) = (&self.pattern, value.as_str()) {
            if !pattern.is_match(s) {
                result.error(format!(
                    "Field '{}' does not match the expected format",
                    self.name
                ));
            }
        }

        if let (Some(allowed), Some(s)) = (self.enum_values, value.as_str()) {
            if !allowed.iter().any(|a| a.eq_ignore_ascii_case(s)) {
                result.error(format!(
                    "Field '{}' must be one of: {}",
                    self.name,
                    allowed.join(", ")
                ));
            }
        }

        if let Some(n) = as_number(value).filter(|_| !value.is_boolean()) {
            if let Some(min) = self.min.filter(|min| n < *min) {
                result.error(format!("Field '{}' must be at least {}", self.name, min));
            }
            if let Some(max) = self.max.filter(|max| n > *max) {
                result.error(format!("Field '{}' must be at most {}", self.name, max));
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigSchema {
    pub fields: Vec<FieldSpec>,
}

impl ConfigSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, spec: FieldSpec) -> Self {
        self.fields.push(spec);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of fields whose values must never be logged
    pub fn sensitive_fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|f| f.sensitive).map(|f| f.name)
    }

    pub fn validate(&self, config: &Map<String, Value>) -> ValidationResult {
        let mut result = ValidationResult::ok();

        for spec in &self.fields {
            match config.get(spec.name) {
                None | Some(Value::Null) => {
                    if spec.required {
                        result.error(format!("Missing required field: {}", spec.name));
                    }
                }
                Some(Value::String(s)) if s.is_empty() && spec.required => {
                    result.error(format!("Missing required field: {}", spec.name));
                }
                Some(value) => spec.check(value, &mut result),
            }
        }

        for key in config.keys() {
            if self.get(key).is_none() {
                result.warning(format!("Unknown field: {}", key));
            }
        }

        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        let mut result = Self::ok();
        result.error(message);
        result
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.valid = false;
        self.errors.push(message.into());
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Fold another result in, prefixing its messages
    pub fn absorb(&mut self, prefix: &str, other: ValidationResult) {
        for e in other.errors {
            self.error(format!("{}{}", prefix, e));
        }
        for w in other.warnings {
            self.warning(format!("{}{}", prefix, w));
        }
    }
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
