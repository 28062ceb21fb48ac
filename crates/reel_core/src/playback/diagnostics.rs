use serde::Serialize;
use serde_json::Value;

/// Shown when a diagnostic payload cannot be rendered.
pub const PRETTIFY_FAILED: &str = "(failed prettify)";

/// Renders `value` as pretty-printed JSON with object keys sorted.
pub fn prettify<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_value(value)
        .map(sorted)
        .and_then(|value| serde_json::to_string_pretty(&value))
        .unwrap_or_else(|_| PRETTIFY_FAILED.to_string())
}

fn sorted(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(entries.into_iter().map(|(k, v)| (k, sorted(v))).collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sorted).collect()),
        other => other,
    }
}
