// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use yare::parameterized;

#[parameterized(
    star = { "*", EventPattern::All },
    double_star = { "**", EventPattern::All },
    any_any = { "*:*", EventPattern::All },
    category = { "action:*", EventPattern::Category("action".to_string()) },
    category_deep = { "execution:**", EventPattern::Category("execution".to_string()) },
    kind = { "*:failed", EventPattern::Kind("failed".to_string()) },
    exact = { "action:skipped", EventPattern::Exact("action:skipped".to_string()) },
    empty = { "", EventPattern::Never },
    bare_word = { "action", EventPattern::Never },
    nested = { "action:*:*", EventPattern::Never },
    missing_kind = { "action:", EventPattern::Never },
)]
fn parses(pattern: &str, expected: EventPattern) {
    assert_eq!(EventPattern::parse(pattern), expected);
}

#[test]
fn category_pattern_selects_one_category() {
    let pattern = EventPattern::from("execution:*");
    assert!(pattern.matches_name("execution:completed"));
    assert!(pattern.matches_name("execution:failed"));
    assert!(!pattern.matches_name("action:completed"));
}

#[test]
fn kind_pattern_spans_categories() {
    let pattern = EventPattern::from("*:failed");
    assert!(pattern.matches_name("action:failed"));
    assert!(pattern.matches_name("execution:failed"));
    assert!(!pattern.matches_name("action:skipped"));
}

#[test]
fn exact_pattern_matches_only_itself() {
    let pattern = EventPattern::from("execution:completed");
    assert!(pattern.matches_name("execution:completed"));
    assert!(!pattern.matches_name("execution:failed"));
    assert!(!pattern.matches_name("action:completed"));
}

#[test]
fn never_matches_nothing() {
    assert!(!EventPattern::Never.matches_name(""));
    assert!(!EventPattern::Never.matches_name("action:failed"));
}
