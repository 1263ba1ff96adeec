use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{flatten_fields, result_of, scalar};

/// Field/value table of the result, then its weighted components, warnings
/// and methodology.
pub fn print_table(value: &Value) {
    let result = result_of(value);

    let mut fields = Vec::new();
    let mut components: Option<&Vec<Value>> = None;
    match result {
        Value::Object(map) => {
            for (key, val) in map {
                if key == "components" {
                    components = val.as_array();
                } else {
                    flatten_fields(key, val, &mut fields);
                }
            }
        }
        other => {
            println!("{}", scalar(other));
            return;
        }
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in &fields {
        builder.push_record([key.as_str(), val.as_str()]);
    }
    println!("{}", Table::from(builder));

    if let Some(rows) = components {
        print_components(rows);
    }

    let envelope = value.as_object();
    if let Some(Value::Array(warnings)) = envelope.and_then(|m| m.get("warnings")) {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                println!("  - {}", scalar(w));
            }
        }
    }
    if let Some(Value::String(meth)) = envelope.and_then(|m| m.get("methodology")) {
        println!("\nMethodology: {}", meth);
    }
}

fn print_components(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for row in rows {
        if let Value::Object(map) = row {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(scalar).unwrap_or_default()),
            );
        }
    }
    println!("\nComponents:");
    println!("{}", Table::from(builder));
}
