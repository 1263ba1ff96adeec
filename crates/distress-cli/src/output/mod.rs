pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The `result` member of an envelope, or the value itself.
pub(crate) fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Flatten nested objects into dotted field names, e.g.
/// `profitability.return_on_assets.passed`. Arrays of objects are indexed.
pub(crate) fn flatten_fields(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    let child = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten_fields(&child(key), val, out);
            }
        }
        Value::Array(items) if items.iter().any(Value::is_object) => {
            for (i, item) in items.iter().enumerate() {
                flatten_fields(&child(&i.to_string()), item, out);
            }
        }
        other => out.push((prefix.to_string(), scalar(other))),
    }
}

pub(crate) fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(scalar).collect::<Vec<_>>().join(", "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_signals() {
        let value = json!({
            "f_score": 7,
            "profitability": { "return_on_assets": { "current": "0.0800", "passed": true } },
            "components": [ { "name": "X1", "weighted_value": "0.12" } ],
        });
        let mut fields = Vec::new();
        flatten_fields("", &value, &mut fields);
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "components.0.name",
                "components.0.weighted_value",
                "f_score",
                "profitability.return_on_assets.current",
                "profitability.return_on_assets.passed",
            ]
        );
        assert_eq!(fields[4].1, "true");
    }

    #[test]
    fn test_result_of_unwraps_envelope() {
        let value = json!({ "result": { "score": "2.265" }, "warnings": [] });
        assert_eq!(result_of(&value), &json!({ "score": "2.265" }));
        let bare = json!(1);
        assert_eq!(result_of(&bare), &bare);
    }

    #[test]
    fn test_scalar_rendering() {
        assert_eq!(scalar(&Value::Null), "");
        assert_eq!(scalar(&json!(["a", "b"])), "a, b");
        assert_eq!(scalar(&json!("grey zone")), "grey zone");
    }
}
