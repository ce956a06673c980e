//! Field-level differences between two serialized records

use std::collections::BTreeSet;

use serde_json::Value;

/// Bumped on every save, so never interesting
const SKIPPED: &[&str] = &["updated_at"];

const MAX_CHARS: usize = 50;

/// "field: old -> new" for each top-level field that differs, in key order
pub fn changed_fields(before: &Value, after: &Value) -> Vec<String> {
    let (Value::Object(old), Value::Object(new)) = (before, after) else {
        return if before == after {
            Vec::new()
        } else {
            vec![format!("{} -> {}", brief(before), brief(after))]
        };
    };

    let keys: BTreeSet<&String> = old.keys().chain(new.keys()).collect();
    keys.into_iter()
        .filter(|key| !SKIPPED.contains(&key.as_str()))
        .filter_map(|key| match (old.get(key), new.get(key)) {
            (Some(a), Some(b)) if a == b => None,
            (a, b) => Some(format!(
                "{}: {} -> {}",
                key,
                a.map_or_else(|| "(none)".to_string(), brief),
                b.map_or_else(|| "(none)".to_string(), brief)
            )),
        })
        .collect()
}

/// Short rendering of a JSON value for one-line summaries
fn brief(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > MAX_CHARS => {
            let head: String = s.chars().take(MAX_CHARS - 3).collect();
            format!("\"{}...\"", head)
        }
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}
