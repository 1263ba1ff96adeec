use serde_json::Value;

use super::{result_of, scalar};

/// Print just the headline figure of the output.
///
/// Looks for well-known score fields in order of priority, then falls back
/// to the first field in the result object.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);
    let priority_keys = ["f_score", "score", "o_score", "probability"];

    if let Value::Object(map) = result {
        // Skip nulls so a partial report falls through to the next model
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", scalar(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, scalar(val));
            return;
        }
    }

    println!("{}", scalar(result));
}
