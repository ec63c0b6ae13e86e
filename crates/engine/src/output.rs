// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run output assembled from per-action results

use botwork_core::ActionResult;
use serde_json::{json, Map, Value};

/// Aggregate counts, every produced output by action id, and `result`
///
/// `result` is the last action's output, `null` when that action was skipped
/// or produced none; consumers treat it as the bot's return value.
pub fn build_final_output(results: &[ActionResult]) -> Value {
    let mut outputs = Map::new();
    for result in results {
        if let Some(output) = &result.output {
            outputs.insert(result.action_id.clone(), output.clone());
        }
    }
    let last = results
        .last()
        .and_then(|r| r.output.clone())
        .unwrap_or(Value::Null);

    json!({
        "actionCount": results.len(),
        "successCount": results.iter().filter(|r| r.is_success()).count(),
        "failedCount": results.iter().filter(|r| r.is_failed()).count(),
        "skippedCount": results.iter().filter(|r| r.skipped).count(),
        "outputs": outputs,
        "result": last,
    })
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
