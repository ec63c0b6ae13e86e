// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed accessors over an action's opaque config map

use crate::error::ActionError;
use botwork_core::value::as_number;
use serde_json::{Map, Value};

pub trait ConfigExt {
    fn str(&self, key: &str) -> Option<&str>;
    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str;
    fn require_str(&self, key: &str) -> Result<&str, ActionError>;
    fn bool_or(&self, key: &str, default: bool) -> bool;
    fn f64(&self, key: &str) -> Option<f64>;
    fn u64(&self, key: &str) -> Option<u64>;
    fn object(&self, key: &str) -> Option<&Map<String, Value>>;
    fn array(&self, key: &str) -> Option<&Vec<Value>>;
}

impl ConfigExt for Map<String, Value> {
    fn str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    fn str_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.str(key).unwrap_or(default)
    }

    fn require_str(&self, key: &str) -> Result<&str, ActionError> {
        self.str(key)
            .ok_or_else(|| ActionError::config(format!("Missing required field: {}", key)))
    }

    /// Accepts booleans and the strings `"true"`/`"false"`
    fn bool_or(&self, key: &str, default: bool) -> bool {
        match self.get(key) {
            Some(Value::Bool(b)) => *b,
            Some(Value::String(s)) if s == "true" => true,
            Some(Value::String(s)) if s == "false" => false,
            _ => default,
        }
    }

    fn f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(as_number)
    }

    fn u64(&self, key: &str) -> Option<u64> {
        self.f64(key).filter(|n| *n >= 0.0).map(|n| n as u64)
    }

    fn object(&self, key: &str) -> Option<&Map<String, Value>> {
        self.get(key).and_then(Value::as_object)
    }

    fn array(&self, key: &str) -> Option<&Vec<Value>> {
        self.get(key).and_then(Value::as_array)
    }
}
