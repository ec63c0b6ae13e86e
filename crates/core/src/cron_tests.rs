// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use yare::parameterized;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
}

fn set(values: &[u32]) -> BTreeSet<u32> {
    values.iter().copied().collect()
}

#[parameterized(
    star = { "*", 0, 5, &[0, 1, 2, 3, 4, 5] },
    single = { "7", 0, 59, &[7] },
    list = { "1,15,30", 0, 59, &[1, 15, 30] },
    range = { "1-5", 0, 6, &[1, 2, 3, 4, 5] },
    step = { "*/15", 0, 59, &[0, 15, 30, 45] },
    range_step = { "10-30/10", 0, 59, &[10, 20, 30] },
    start_step = { "5/20", 0, 59, &[5, 25, 45] },
    mixed = { "1,3-4,*/10", 0, 20, &[0, 1, 3, 4, 10, 20] },
)]
fn parse_field_expands(field: &str, min: u32, max: u32, expected: &[u32]) {
    assert_eq!(CronParser::parse_field(field, min, max).unwrap(), set(expected));
}

#[test]
fn parse_field_does_not_bounds_check() {
    assert_eq!(CronParser::parse_field("60", 0, 59).unwrap(), set(&[60]));
}

#[parameterized(
    zero_step = { "*/0" },
    not_a_number = { "abc" },
    empty_element = { "1,,2" },
    reversed_range = { "9-3" },
)]
fn parse_field_rejects(field: &str) {
    assert!(CronParser::parse_field(field, 0, 59).is_err());
}

#[test]
fn every_minute_matches_anything() {
    assert!(CronParser::matches("* * * * *", &at(2026, 3, 14, 15, 9)));
    assert!(CronParser::matches("* * * * *", &at(2030, 12, 31, 23, 59)));
}

#[parameterized(
    too_few = { "* * *" },
    too_many = { "* * * * * *" },
    empty = { "" },
    garbage = { "a b c d e" },
)]
fn malformed_expressions_never_match(expr: &str) {
    assert!(!CronParser::matches(expr, &at(2026, 1, 1, 0, 0)));
}

#[test]
fn day_of_month_and_weekday_are_anded() {
    // 2026-03-13 is a Friday
    let friday_13 = at(2026, 3, 13, 9, 0);
    assert!(CronParser::matches("0 9 13 * 5", &friday_13));
    // 13th but not a Monday: no match
    assert!(!CronParser::matches("0 9 13 * 1", &friday_13));
}

#[test]
fn weekday_zero_is_sunday() {
    // 2026-03-15 is a Sunday
    assert!(CronParser::matches("0 0 * * 0", &at(2026, 3, 15, 0, 0)));
    assert!(!CronParser::matches("0 0 * * 0", &at(2026, 3, 16, 0, 0)));
}

#[test]
fn next_run_for_every_five_minutes() {
    assert_eq!(
        CronParser::next_run("*/5 * * * *", at(2026, 1, 1, 10, 3)).unwrap(),
        at(2026, 1, 1, 10, 5)
    );
    // An exact boundary is not returned again
    assert_eq!(
        CronParser::next_run("*/5 * * * *", at(2026, 1, 1, 10, 0)).unwrap(),
        at(2026, 1, 1, 10, 5)
    );
}

#[test]
fn next_run_truncates_seconds() {
    let from = Utc.with_ymd_and_hms(2026, 1, 1, 10, 3, 42).unwrap();
    assert_eq!(
        CronParser::next_run("* * * * *", from).unwrap(),
        at(2026, 1, 1, 10, 4)
    );
}

#[test]
fn next_run_rolls_over_year() {
    assert_eq!(
        CronParser::next_run("0 0 1 1 *", at(2026, 6, 1, 0, 0)).unwrap(),
        at(2027, 1, 1, 0, 0)
    );
}

#[test]
fn next_run_fails_for_impossible_dates() {
    let err = CronParser::next_run("0 0 30 2 *", at(2026, 1, 1, 0, 0)).unwrap_err();
    assert!(matches!(err, CronError::NoMatch(_)));
}

#[test]
fn next_run_rejects_malformed_expression() {
    let err = CronParser::next_run("* *", at(2026, 1, 1, 0, 0)).unwrap_err();
    assert_eq!(err, CronError::FieldCount(2));
}

#[test]
fn upcoming_returns_successive_runs() {
    let runs = CronParser::upcoming("0 */6 * * *", at(2026, 1, 1, 1, 0), 3).unwrap();
    assert_eq!(
        runs,
        vec![at(2026, 1, 1, 6, 0), at(2026, 1, 1, 12, 0), at(2026, 1, 1, 18, 0)]
    );
}

#[test]
fn validate_accepts_common_expressions() {
    for expr in ["* * * * *", "*/5 * * * *", "0 9 * * 1-5", "30 2 1,15 * *"] {
        assert_eq!(
            CronParser::validate(expr),
            CronValidation {
                valid: true,
                error: None
            },
            "{expr}"
        );
    }
}

#[parameterized(
    minute = { "60 * * * *", "minute value 60 out of range" },
    hour = { "0 24 * * *", "hour value 24 out of range" },
    day = { "0 0 0 * *", "day of month value 0 out of range" },
    month = { "0 0 1 13 *", "month value 13 out of range" },
    weekday = { "0 0 * * 7", "day of week value 7 out of range" },
    count = { "* * * *", "expected 5 fields" },
    malformed = { "x * * * *", "invalid minute field" },
)]
fn validate_reports_field_specific_errors(expr: &str, fragment: &str) {
    let result = CronParser::validate(expr);
    assert!(!result.valid);
    let error = result.error.unwrap();
    assert!(error.contains(fragment), "{error}");
}

#[test]
fn oversized_range_is_rejected_without_expanding() {
    let result = CronParser::validate("0-4294967295 * * * *");
    assert!(!result.valid);
    let error = result.error.unwrap();
    assert!(error.contains("minute value 4294967295 out of range"), "{error}");
    assert!(CronParser::check("*/4294967295 * * * *").is_ok());
}

#[test]
fn oversized_range_matches_only_in_range_values() {
    let values = CronParser::parse_field("58-4294967295", 0, 59).unwrap();
    assert_eq!(values, set(&[58, 59]));
    assert!(CronParser::matches("0-4294967295 * * * *", &at(2026, 1, 1, 0, 7)));
}

#[parameterized(
    every_minute = { "* * * * *", "Every minute" },
    every_hour = { "0 * * * *", "Every hour" },
    every_n_minutes = { "*/15 * * * *", "Every 15 minutes" },
    every_n_hours = { "0 */2 * * *", "Every 2 hours" },
    daily = { "0 9 * * *", "Every day at 9:00" },
    daily_with_minutes = { "30 14 * * *", "Every day at 14:30" },
    weekdays = { "0 8 * * 1-5", "Weekdays at 8:00" },
    fallback = { "0 0 1 * *", "0 0 1 * *" },
)]
fn describe_common_idioms(expr: &str, expected: &str) {
    assert_eq!(CronParser::describe(expr), expected);
}

#[test]
fn schedule_parses_once_and_matches_many() {
    let schedule = CronSchedule::parse("  0   12 * *  * ").unwrap();
    assert_eq!(schedule.as_str(), "0 12 * * *");
    assert!(schedule.matches(&at(2026, 5, 5, 12, 0)));
    assert!(!schedule.matches(&at(2026, 5, 5, 12, 1)));
}

proptest! {
    #[test]
    fn next_run_is_strictly_after_and_matches(
        step in 1u32..30,
        minutes in 0i64..(60 * 24 * 60),
    ) {
        let expr = format!("*/{step} * * * *");
        let from = at(2026, 1, 1, 0, 0) + TimeDelta::minutes(minutes) + TimeDelta::seconds(17);
        let next = CronParser::next_run(&expr, from).unwrap();
        prop_assert!(next > from);
        prop_assert!(CronParser::matches(&expr, &next));
        prop_assert!(next - from <= TimeDelta::minutes(i64::from(step) + 60));
    }

    #[test]
    fn matches_implies_valid(
        minute in 0u32..60,
        hour in 0u32..24,
        day in 1u32..29,
        month in 1u32..13,
    ) {
        let expr = format!("{minute} {hour} {day} {month} *");
        let date = at(2026, month, day, hour, minute);
        prop_assert!(CronParser::matches(&expr, &date));
        prop_assert!(CronParser::validate(&expr).valid);
    }
}
