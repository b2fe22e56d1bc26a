use serde_json::Value;
use std::io;

use super::{format_scalar, ROW_FIELDS};

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    if let Err(e) = write_csv(value, stdout.lock()) {
        eprintln!("CSV write error: {}", e);
    }
}

/// The first row-shaped result field (schedule, deltas, ...) becomes a
/// table; otherwise the result is written as `field,value` pairs.
pub(crate) fn write_csv<W: io::Write>(value: &Value, out: W) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(out);
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Object(map) => {
            let rows = ROW_FIELDS
                .iter()
                .find_map(|key| map.get(*key).and_then(Value::as_array));
            match rows {
                Some(rows) => write_rows(&mut wtr, rows)?,
                None => {
                    wtr.write_record(["field", "value"])?;
                    for (key, val) in map {
                        wtr.write_record([key.as_str(), &format_scalar(val)])?;
                    }
                }
            }
        }
        Value::Array(arr) => write_rows(&mut wtr, arr)?,
        other => wtr.write_record([format_scalar(other)])?,
    }

    wtr.flush()?;
    Ok(())
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    let Some(Value::Object(first)) = arr.first() else {
        for item in arr {
            wtr.write_record([format_scalar(item)])?;
        }
        return Ok(());
    };

    let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
    wtr.write_record(&headers)?;
    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                .collect();
            wtr.write_record(&row)?;
        }
    }
    Ok(())
}
