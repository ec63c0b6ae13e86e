// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action `condition` expressions
//!
//! The grammar is intentionally tiny: a literal `true`/`false`, a single
//! binary comparison, or a bare path tested for truthiness. Nothing is ever
//! evaluated as code.

use super::ExecutionContext;
use crate::value::{compare, is_truthy, loose_eq, parse_operand, strict_eq};
use std::cmp::Ordering;

/// Checked in order; the first operator found in the expression wins
const OPERATORS: [&str; 8] = ["===", "!==", "==", "!=", ">=", "<=", ">", "<"];

impl ExecutionContext {
    pub fn evaluate_condition(&self, condition: &str) -> bool {
        let expanded = self.interpolate(condition);
        let expr = expanded.trim();

        match expr {
            "true" => return true,
            "false" => return false,
            _ => {}
        }

        for op in OPERATORS {
            if let Some(idx) = expr.find(op) {
                let left = parse_operand(&expr[..idx]);
                let right = parse_operand(&expr[idx + op.len()..]);
                return match op {
                    "===" => strict_eq(&left, &right),
                    "!==" => !strict_eq(&left, &right),
                    "==" => loose_eq(&left, &right),
                    "!=" => !loose_eq(&left, &right),
                    ">=" => matches!(compare(&left, &right), Some(Ordering::Greater | Ordering::Equal)),
                    "<=" => matches!(compare(&left, &right), Some(Ordering::Less | Ordering::Equal)),
                    ">" => compare(&left, &right) == Some(Ordering::Greater),
                    _ => compare(&left, &right) == Some(Ordering::Less),
                };
            }
        }

        let path = condition
            .trim()
            .trim_start_matches("{{")
            .trim_end_matches("}}")
            .trim();
        self.resolve_path(path).is_some_and(|v| is_truthy(&v))
    }
}
