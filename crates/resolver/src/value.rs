//! Coercion helpers for loosely-typed field values.
//!
//! Field data arrives from serialized form storage, so "a number" may be a
//! JSON number, a numeric string, or an empty string meaning unset. These
//! helpers centralize the emptiness and integer rules the resolver applies.

use serde_json::Value;

/// Whether a field value counts as unset.
///
/// Mirrors loose form-storage semantics: `null`, `false`, `0`, `""`, `"0"`,
/// and empty containers are all "empty".
pub(crate) fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_none_or(|f| f == 0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}

/// Coerce a field value to an integer, taking leading digits from strings.
pub(crate) fn to_integer(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => leading_integer(s),
        Value::Bool(true) => 1,
        _ => 0,
    }
}

/// Strict integer id: a JSON number or a string that is entirely numeric.
pub(crate) fn numeric_id(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

fn leading_integer(s: &str) -> i64 {
    let trimmed = s.trim_start();
    let mut end = 0;
    for (i, c) in trimmed.char_indices() {
        if c.is_ascii_digit() || (i == 0 && (c == '-' || c == '+')) {
            end = i + c.len_utf8();
        } else {
            break;
        }
    }
    trimmed[..end].parse::<i64>().unwrap_or(0)
}
