use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Schedule columns and the result field that totals each one
const COLUMN_TOTALS: [(&str, &str); 4] = [
    ("principal", "total_principal"),
    ("interest", "total_interest"),
    ("insurance", "total_insurance"),
    ("total_due", "total_cost"),
];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_section(None, result);
                print_envelope(map);
            } else {
                print_section(None, value);
            }
        }
        Value::Array(arr) => print_rows(arr, None),
        _ => println!("{}", value),
    }
}

/// Scalars as a Field/Value table, then nested objects and row arrays beneath.
fn print_section(title: Option<&str>, value: &Value) {
    let Value::Object(map) = value else {
        println!("{}", format_value(value));
        return;
    };

    if let Some(t) = title {
        println!("\n{}", t);
    }

    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut has_scalars = false;
    for (key, val) in map {
        if !val.is_object() && !is_row_array(val) {
            builder.push_record([key.as_str(), &format_value(val)]);
            has_scalars = true;
        }
    }
    if has_scalars {
        println!("{}", Table::from(builder));
    }

    for (key, val) in map {
        match val {
            Value::Object(_) => print_section(Some(&heading(key)), val),
            Value::Array(arr) if is_row_array(val) => {
                println!("\n{}", heading(key));
                print_rows(arr, Some(map));
            }
            _ => {}
        }
    }
}

/// Rows table. When the parent carries schedule totals a Total row is appended.
fn print_rows(arr: &[Value], parent: Option<&Map<String, Value>>) {
    let Some(Value::Object(first)) = arr.first() else {
        println!("(empty)");
        return;
    };

    let headers: Vec<String> = first.keys().cloned().collect();
    let mut builder = Builder::default();
    builder.push_record(&headers);

    for item in arr {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                .collect();
            builder.push_record(row);
        }
    }

    if let Some(parent) = parent {
        if parent.contains_key("total_cost") {
            builder.push_record(totals_row(&headers, parent));
        }
    }

    println!("{}", Table::from(builder));
}

fn totals_row(headers: &[String], parent: &Map<String, Value>) -> Vec<String> {
    headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if i == 0 {
                return "Total".to_string();
            }
            COLUMN_TOTALS
                .iter()
                .find(|(col, _)| *col == h.as_str())
                .and_then(|(_, total)| parent.get(*total))
                .map(format_value)
                .unwrap_or_default()
        })
        .collect()
}

fn print_envelope(envelope: &Map<String, Value>) {
    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn is_row_array(value: &Value) -> bool {
    matches!(value, Value::Array(arr) if arr.first().is_some_and(Value::is_object))
}

fn heading(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect::<String>().replace('_', " "),
        None => String::new(),
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_totals_row_maps_columns() {
        let headers: Vec<String> = ["period", "payment", "interest", "total_due"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let parent = json!({"total_interest": "661.85", "total_cost": "10661.85"});
        let row = totals_row(&headers, parent.as_object().unwrap());
        assert_eq!(row, vec!["Total", "", "661.85", "10661.85"]);
    }

    #[test]
    fn test_heading() {
        assert_eq!(heading("summary"), "Summary");
        assert_eq!(heading("total_due"), "Total due");
    }
}
