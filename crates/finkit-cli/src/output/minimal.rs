use serde_json::Value;

use super::format_scalar;

/// Headline fields, most specific first. The first non-null one present wins.
const PRIORITY_KEYS: [&str; 16] = [
    "monthly_payment",
    "final_value",
    "price",
    "yield_rate",
    "macaulay_duration",
    "convexity",
    "wacc",
    "cost_of_equity",
    "npv",
    "irr",
    "total_value",
    "median",
    "stressed_value",
    "new_value",
    "required_extra_payment",
    "affordable",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

pub(crate) fn minimal_line(value: &Value) -> String {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                return format_scalar(val);
            }
        }
        // goal solutions are tagged {kind, value}
        if let Some(Value::Object(solution)) = map.get("solution") {
            if let Some(val) = solution.get("value") {
                return format_scalar(val);
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_scalar(val));
        }
    }

    format_scalar(result)
}
