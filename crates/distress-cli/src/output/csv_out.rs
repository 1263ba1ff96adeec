use serde_json::Value;
use std::io;

use super::{flatten_fields, result_of};

/// Two-column `field,value` CSV of the flattened result.
pub fn print_csv(value: &Value) {
    let mut fields = Vec::new();
    flatten_fields("", result_of(value), &mut fields);

    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in &fields {
        let _ = wtr.write_record([key.as_str(), val.as_str()]);
    }
    let _ = wtr.flush();
}
