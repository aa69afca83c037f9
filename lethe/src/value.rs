//! Value encoding and decoding
//!
//! Structured values (arrays and objects) are stored as JSON text; scalars
//! pass through in their canonical text form so that a stored string is
//! byte-identical to what the caller wrote. Decoding is best-effort: text
//! that does not parse as JSON is handed back untouched.

use serde_json::Value;

/// Encode a value ready for storage.
///
/// Returns `None` for `Null` - a null value is never written, it is the
/// caller's signal to clear the key instead.
pub(crate) fn encode(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Decode a raw stored string back into structured form.
///
/// Returns `None` when the text is not meaningful JSON, in which case the
/// caller falls back to the raw string. Never fails for plain scalar text.
pub(crate) fn decode(raw: &str) -> Option<Value> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Null) => None,
        Ok(value) => Some(value),
        Err(_) => None,
    }
}
