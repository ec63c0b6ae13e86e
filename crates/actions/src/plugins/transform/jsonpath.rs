// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small JSONPath subset
//!
//! Supported: `$`, `.key`, `['key']`, `[n]` (negative counts from the
//! end), `[*]`, `.*` and `..key` recursive descent. Filters and slices
//! are not.

use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Key(String),
    Index(i64),
    Wildcard,
    Descend(String),
}

fn parse(path: &str) -> Result<Vec<Segment>, String> {
    let path = path.trim();
    let rest = path.strip_prefix('$').unwrap_or(path);
    let chars: Vec<char> = rest.chars().collect();
    let mut segments = Vec::new();
    let mut i = 0;

    let read_ident = |i: &mut usize| -> String {
        let start = *i;
        while *i < chars.len() && chars[*i] != '.' && chars[*i] != '[' {
            *i += 1;
        }
        chars[start..*i].iter().collect()
    };

    // A bare leading key, e.g. `items[0]`
    if i < chars.len() && chars[i] != '.' && chars[i] != '[' {
        segments.push(Segment::Key(read_ident(&mut i)));
    }

    while i < chars.len() {
        match chars[i] {
            '.' if chars.get(i + 1) == Some(&'.') => {
                i += 2;
                let key = read_ident(&mut i);
                if key.is_empty() {
                    return Err(format!("Expected a key after '..' in {}", path));
                }
                segments.push(Segment::Descend(key));
            }
            '.' => {
                i += 1;
                let key = read_ident(&mut i);
                match key.as_str() {
                    "" => return Err(format!("Empty key in {}", path)),
                    "*" => segments.push(Segment::Wildcard),
                    _ => segments.push(Segment::Key(key)),
                }
            }
            '[' => {
                let close = chars[i..]
                    .iter()
                    .position(|c| *c == ']')
                    .map(|p| p + i)
                    .ok_or_else(|| format!("Unclosed '[' in {}", path))?;
                let inner: String = chars[i + 1..close].iter().collect();
                let inner = inner.trim();
                let segment = if inner == "*" {
                    Segment::Wildcard
                } else if let Some(quoted) = inner
                    .strip_prefix('\'')
                    .and_then(|s| s.strip_suffix('\''))
                    .or_else(|| inner.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
                {
                    Segment::Key(quoted.to_string())
                } else {
                    let index = inner
                        .parse::<i64>()
                        .map_err(|_| format!("Unsupported selector [{}] in {}", inner, path))?;
                    Segment::Index(index)
                };
                segments.push(segment);
                i = close + 1;
            }
            c => return Err(format!("Unexpected '{}' in {}", c, path)),
        }
    }
    Ok(segments)
}

fn descend<'a>(value: &'a Value, key: &str, out: &mut Vec<&'a Value>) {
    match value {
        Value::Object(map) => {
            if let Some(v) = map.get(key) {
                out.push(v);
            }
            for v in map.values() {
                descend(v, key, out);
            }
        }
        Value::Array(items) => {
            for v in items {
                descend(v, key, out);
            }
        }
        _ => {}
    }
}

/// Every value matched by `path`, in document order
pub fn query(root: &Value, path: &str) -> Result<Vec<Value>, String> {
    let segments = parse(path)?;
    let mut current: Vec<&Value> = vec![root];

    for segment in &segments {
        let mut next = Vec::new();
        for value in current {
            match segment {
                Segment::Key(key) => {
                    if let Some(v) = value.get(key.as_str()) {
                        next.push(v);
                    }
                }
                Segment::Index(index) => {
                    if let Value::Array(items) = value {
                        let len = items.len() as i64;
                        let at = if *index < 0 { len + index } else { *index };
                        if (0..len).contains(&at) {
                            next.push(&items[at as usize]);
                        }
                    }
                }
                Segment::Wildcard => match value {
                    Value::Array(items) => next.extend(items.iter()),
                    Value::Object(map) => next.extend(map.values()),
                    _ => {}
                },
                Segment::Descend(key) => descend(value, key, &mut next),
            }
        }
        current = next;
    }

    Ok(current.into_iter().cloned().collect())
}

#[cfg(test)]
#[path = "jsonpath_tests.rs"]
mod tests;
