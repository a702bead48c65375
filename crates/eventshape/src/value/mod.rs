//! Helpers for raw parameter values.
//!
//! Raw values arrive as `serde_json::Value` regardless of the source format:
//! CSV cells become strings, JSON lines keep their native numbers, arrays
//! and objects.

pub mod shapes;
pub mod temporal;

use serde_json::Value;

/// Check if a value represents a missing/null value.
pub fn is_null(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => is_null_text(s),
        _ => false,
    }
}

/// Check if a text value is a null marker.
pub fn is_null_text(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("null")
        || trimmed.eq_ignore_ascii_case("none")
        || trimmed.eq_ignore_ascii_case("nan")
        || trimmed.eq_ignore_ascii_case("undefined")
}

/// Coerce a value to a finite number.
///
/// Accepts JSON numbers and strings that parse as numbers. Booleans,
/// containers and non-finite values are not numbers.
pub fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// Text used to compare values for set membership and cache keys.
///
/// Strings are taken verbatim; everything else uses its compact JSON form,
/// so the number `2` and the string `"2"` share the text `2`.
pub fn canonical_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Interpret a value as an object or an array of objects.
///
/// Strings are decoded as JSON first. Returns the objects found, or `None`
/// when the value is not structured. An empty array yields no objects.
pub fn as_objects(value: &Value) -> Option<Vec<serde_json::Map<String, Value>>> {
    match value {
        Value::Object(map) => Some(vec![map.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Object(map) => Some(map.clone()),
                _ => None,
            })
            .collect(),
        Value::String(s) => {
            let trimmed = s.trim();
            if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
                return None;
            }
            let decoded: Value = serde_json::from_str(trimmed).ok()?;
            match decoded {
                Value::Object(_) | Value::Array(_) => as_objects(&decoded),
                _ => None,
            }
        }
        _ => None,
    }
}

/// Interpret a value as a list of scalar items.
///
/// Accepts native arrays, JSON-encoded arrays, loose bracketed lists
/// (`[a, b]`) and comma-delimited text (`a,b`). Quotes around loose items
/// are stripped. A bare word without commas is not a list.
pub fn parse_list(value: &Value) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items.clone()),
        Value::String(s) => parse_list_text(s),
        _ => None,
    }
}

fn parse_list_text(text: &str) -> Option<Vec<Value>> {
    let trimmed = text.trim();

    if trimmed.starts_with('[') && trimmed.ends_with(']') {
        if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed) {
            return Some(items);
        }
        let inner = trimmed[1..trimmed.len() - 1].trim();
        if inner.is_empty() {
            return Some(Vec::new());
        }
        return split_items(inner);
    }

    if trimmed.contains(',') {
        return split_items(trimmed);
    }

    None
}

fn split_items(text: &str) -> Option<Vec<Value>> {
    let mut items = Vec::new();
    for part in text.split(',') {
        let item = part.trim().trim_matches(|c| c == '"' || c == '\'');
        if item.is_empty() {
            return None;
        }
        items.push(Value::String(item.to_string()));
    }
    Some(items)
}

/// Check if a value is a scalar (not an array or object).
pub fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}
