use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, ROW_FIELDS};

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    println!("{}", render(value));
}

pub(crate) fn render(value: &Value) -> String {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(result) => render_envelope(result, map),
            None => field_table(map),
        },
        Value::Array(arr) => row_table(arr),
        _ => format_scalar(value),
    }
}

fn render_envelope(result: &Value, envelope: &Map<String, Value>) -> String {
    let mut sections = Vec::new();

    match result {
        Value::Object(res_map) => {
            let scalars: Map<String, Value> = res_map
                .iter()
                .filter(|(key, _)| !ROW_FIELDS.contains(&key.as_str()))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            sections.push(field_table(&scalars));
            for key in ROW_FIELDS {
                if let Some(Value::Array(rows)) = res_map.get(key) {
                    sections.push(format!("{}:\n{}", key, row_table(rows)));
                }
            }
        }
        other => sections.push(render(other)),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            let mut block = String::from("Warnings:");
            for w in warnings {
                let code = w.get("code").map(format_scalar).unwrap_or_default();
                let message = w.get("message").map(format_scalar).unwrap_or_default();
                block.push_str(&format!("\n  - [{}] {}", code, message));
            }
            sections.push(block);
        }
    }

    if let Some(Value::Object(explanation)) = envelope.get("explanation") {
        sections.push(explanation_table(explanation));
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        sections.push(format!("Methodology: {}", meth));
    }

    sections.join("\n\n")
}

fn explanation_table(explanation: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Step", "Formula", "Value"]);
    if let Some(Value::Array(steps)) = explanation.get("steps") {
        for step in steps {
            let cell = |key: &str| step.get(key).map(format_scalar).unwrap_or_default();
            builder.push_record([cell("name"), cell("formula"), cell("value")]);
        }
    }
    let summary = explanation
        .get("summary")
        .map(format_scalar)
        .unwrap_or_default();
    format!("Explanation: {}\n{}", summary, Table::from(builder))
}

fn field_table(map: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_cell(val)]);
    }
    Table::from(builder).to_string()
}

fn row_table(arr: &[Value]) -> String {
    let Some(first) = arr.first() else {
        return "(empty)".to_string();
    };

    if let Value::Object(first) = first {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(headers.clone());
        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_cell).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }
        Table::from(builder).to_string()
    } else {
        arr.iter().map(format_cell).collect::<Vec<_>>().join("\n")
    }
}

fn format_cell(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Array(arr) if arr.iter().all(|v| !v.is_object() && !v.is_array()) => arr
            .iter()
            .map(format_scalar)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        _ => format_scalar(value),
    }
}
