// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Five-field cron expressions: `minute hour day month weekday`
//!
//! Supported field syntax: `*`, single integers, comma lists, `a-b` ranges,
//! and `*/n` or `a-b/n` steps. Weekday 0 is Sunday. All five fields must
//! match; there is no OR between day-of-month and weekday.

use chrono::{DateTime, Datelike, TimeDelta, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// One year of minutes; the search horizon for [`CronParser::next_run`]
pub const MAX_SEARCH_MINUTES: u32 = 525_600;

const FIELDS: [(&str, u32, u32); 5] = [
    ("minute", 0, 59),
    ("hour", 0, 23),
    ("day of month", 1, 31),
    ("month", 1, 12),
    ("day of week", 0, 6),
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CronError {
    #[error("invalid cron expression: expected 5 fields, got {0}")]
    FieldCount(usize),
    #[error("invalid {field} field '{value}': {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },
    #[error("{field} value {value} out of range ({min}-{max})")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("no matching time found for '{0}' within one year")]
    NoMatch(String),
}

/// Outcome of [`CronParser::validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CronValidation {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// A parsed expression, reusable across many match checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CronSchedule {
    expression: String,
    minutes: BTreeSet<u32>,
    hours: BTreeSet<u32>,
    days: BTreeSet<u32>,
    months: BTreeSet<u32>,
    weekdays: BTreeSet<u32>,
}

impl CronSchedule {
    /// Parse without bounds checks; see [`CronParser::validate`] for those
    pub fn parse(expr: &str) -> Result<Self, CronError> {
        let fields = split_fields(expr)?;
        let parse = |i: usize| {
            let (name, min, max) = FIELDS[i];
            parse_named_field(fields[i], name, min, max)
        };
        Ok(Self {
            minutes: parse(0)?,
            hours: parse(1)?,
            days: parse(2)?,
            months: parse(3)?,
            weekdays: parse(4)?,
            expression: fields.join(" "),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.expression
    }

    pub fn matches<Tz: TimeZone>(&self, date: &DateTime<Tz>) -> bool {
        self.minutes.contains(&date.minute())
            && self.hours.contains(&date.hour())
            && self.days.contains(&date.day())
            && self.months.contains(&date.month())
            && self.weekdays.contains(&date.weekday().num_days_from_sunday())
    }

    /// First matching minute strictly after `from`
    pub fn next_after(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let mut candidate = next_whole_minute(from);
        for _ in 0..MAX_SEARCH_MINUTES {
            if self.matches(&candidate) {
                return Some(candidate);
            }
            candidate += TimeDelta::minutes(1);
        }
        None
    }
}

fn next_whole_minute(from: DateTime<Utc>) -> DateTime<Utc> {
    let truncated = from
        .with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(from);
    truncated + TimeDelta::minutes(1)
}

fn split_fields(expr: &str) -> Result<Vec<&str>, CronError> {
    let fields: Vec<&str> = expr.split_whitespace().collect();
    if fields.len() != 5 {
        return Err(CronError::FieldCount(fields.len()));
    }
    Ok(fields)
}

fn parse_number(field: &'static str, raw: &str, part: &str) -> Result<u32, CronError> {
    part.parse::<u32>().map_err(|_| CronError::InvalidField {
        field,
        value: raw.to_string(),
        reason: format!("'{}' is not a number", part),
    })
}

/// One comma-separated element of a field, before expansion
#[derive(Debug, Clone, Copy)]
struct FieldPart {
    start: u32,
    end: u32,
    step: u32,
}

impl FieldPart {
    /// First written value outside `min..=max`
    fn out_of_range(&self, min: u32, max: u32) -> Option<u32> {
        [self.start, self.end]
            .into_iter()
            .find(|v| *v < min || *v > max)
    }
}

fn parse_parts(
    raw: &str,
    field: &'static str,
    min: u32,
    max: u32,
) -> Result<Vec<FieldPart>, CronError> {
    let invalid = |reason: &str| CronError::InvalidField {
        field,
        value: raw.to_string(),
        reason: reason.to_string(),
    };

    let mut parts = Vec::new();
    for part in raw.split(',') {
        if part.is_empty() {
            return Err(invalid("empty list element"));
        }
        let (range, step) = match part.split_once('/') {
            Some((range, step)) => (range, Some(parse_number(field, raw, step)?)),
            None => (part, None),
        };
        if step == Some(0) {
            return Err(invalid("step must be greater than zero"));
        }

        let (start, end) = if range == "*" {
            (min, max)
        } else if let Some((a, b)) = range.split_once('-') {
            (parse_number(field, raw, a)?, parse_number(field, raw, b)?)
        } else {
            let value = parse_number(field, raw, range)?;
            // `5/15` steps from 5 to the end of the field
            (value, if step.is_some() { max.max(value) } else { value })
        };
        if start > end {
            return Err(invalid("range start is greater than range end"));
        }
        parts.push(FieldPart {
            start,
            end,
            step: step.unwrap_or(1),
        });
    }
    Ok(parts)
}

/// Expand parts into values; ranges stop at `max` so oversized ends stay cheap
fn expand(parts: &[FieldPart], max: u32) -> BTreeSet<u32> {
    let mut values = BTreeSet::new();
    for part in parts {
        values.insert(part.start);
        values.extend(
            (part.start..=part.end)
                .step_by(part.step as usize)
                .take_while(|v| *v <= max),
        );
    }
    values
}

fn parse_named_field(
    raw: &str,
    field: &'static str,
    min: u32,
    max: u32,
) -> Result<BTreeSet<u32>, CronError> {
    Ok(expand(&parse_parts(raw, field, min, max)?, max))
}

/// Stateless helpers over cron expression strings
pub struct CronParser;

impl CronParser {
    /// Expand one field into the set of values it selects
    ///
    /// Written values are not bounds-checked here, but ranges never expand
    /// past `max`.
    pub fn parse_field(field: &str, min: u32, max: u32) -> Result<BTreeSet<u32>, CronError> {
        parse_named_field(field, "cron", min, max)
    }

    /// Never fails; malformed expressions simply do not match
    pub fn matches<Tz: TimeZone>(expr: &str, date: &DateTime<Tz>) -> bool {
        CronSchedule::parse(expr).is_ok_and(|schedule| schedule.matches(date))
    }

    /// First matching minute strictly after `from`, searching up to one year
    pub fn next_run(expr: &str, from: DateTime<Utc>) -> Result<DateTime<Utc>, CronError> {
        let schedule = CronSchedule::parse(expr)?;
        schedule
            .next_after(from)
            .ok_or_else(|| CronError::NoMatch(schedule.expression.clone()))
    }

    /// The next `count` run times after `from`
    pub fn upcoming(
        expr: &str,
        from: DateTime<Utc>,
        count: usize,
    ) -> Result<Vec<DateTime<Utc>>, CronError> {
        let schedule = CronSchedule::parse(expr)?;
        let mut runs = Vec::with_capacity(count);
        let mut cursor = from;
        for _ in 0..count {
            match schedule.next_after(cursor) {
                Some(next) => {
                    runs.push(next);
                    cursor = next;
                }
                None => break,
            }
        }
        if runs.is_empty() && count > 0 {
            return Err(CronError::NoMatch(schedule.expression));
        }
        Ok(runs)
    }

    /// Structural and range check, reporting the first problem found
    pub fn check(expr: &str) -> Result<(), CronError> {
        let fields = split_fields(expr)?;
        for (raw, (name, min, max)) in fields.iter().zip(FIELDS) {
            let parts = parse_parts(raw, name, min, max)?;
            if let Some(value) = parts.iter().find_map(|p| p.out_of_range(min, max)) {
                return Err(CronError::OutOfRange {
                    field: name,
                    value,
                    min,
                    max,
                });
            }
        }
        Ok(())
    }

    pub fn validate(expr: &str) -> CronValidation {
        match Self::check(expr) {
            Ok(()) => CronValidation {
                valid: true,
                error: None,
            },
            Err(e) => CronValidation {
                valid: false,
                error: Some(e.to_string()),
            },
        }
    }

    /// Human-readable rendering of common idioms, else the raw expression
    pub fn describe(expr: &str) -> String {
        let fields: Vec<&str> = expr.split_whitespace().collect();
        let [minute, hour, day, month, weekday] = fields[..] else {
            return expr.to_string();
        };
        let every_day = day == "*" && month == "*";

        if every_day && weekday == "*" {
            if minute == "*" && hour == "*" {
                return "Every minute".to_string();
            }
            if minute == "0" && hour == "*" {
                return "Every hour".to_string();
            }
            if hour == "*" {
                if let Some(n) = step_of(minute) {
                    return plural(n, "minute");
                }
            }
            if minute == "0" {
                if let Some(n) = step_of(hour) {
                    return plural(n, "hour");
                }
            }
        }

        if every_day {
            if let (Ok(m), Ok(h)) = (minute.parse::<u32>(), hour.parse::<u32>()) {
                match weekday {
                    "*" => return format!("Every day at {}:{:02}", h, m),
                    "1-5" => return format!("Weekdays at {}:{:02}", h, m),
                    _ => {}
                }
            }
        }

        expr.to_string()
    }
}

fn step_of(field: &str) -> Option<u32> {
    field.strip_prefix("*/")?.parse().ok().filter(|n| *n > 0)
}

fn plural(n: u32, unit: &str) -> String {
    if n == 1 {
        format!("Every {}", unit)
    } else {
        format!("Every {} {}s", n, unit)
    }
}

#[cfg(test)]
#[path = "cron_tests.rs"]
mod tests;
