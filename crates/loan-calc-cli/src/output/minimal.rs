use serde_json::Value;

/// Fields that answer "what do I pay?", in order of preference
const PRIORITY_KEYS: [&str; 2] = ["payment_with_insurance", "payment"];

/// Print just the key answer value from the output.
///
/// Loan results print the payment; conversions print every field as `key: value`.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let summary = result_obj.get("summary").unwrap_or(result_obj);

    if let Value::Object(map) = summary {
        for key in &PRIORITY_KEYS {
            if let Some(val) = map.get(*key) {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        for (key, val) in map {
            println!("{}: {}", key, format_minimal(val));
        }
        return;
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
