//! Inline SQL literals for key/value filters.
//!
//! Text is quoted verbatim with no escaping of embedded quotes, and the
//! catch-all branch renders values unquoted. Both are carried unchanged from
//! the existing generated SQL; callers handling untrusted input should use
//! typed parameters instead.

use crate::value::Value;

/// Token emitted for null and empty-string values.
pub const NULL_LITERAL: &str = "null";

/// Convert a raw value into inline SQL text.
pub fn to_literal(value: &Value) -> String {
    match value {
        Value::Null => NULL_LITERAL.to_string(),
        Value::Text(s) if s.is_empty() => NULL_LITERAL.to_string(),
        Value::Bool(b) => String::from(if *b { "1" } else { "0" }),
        Value::DateTime(dt) => format!("'{}'", dt.date().format("%Y-%m-%d")),
        Value::Enum(n) => n.to_string(),
        Value::Text(s) => format!("'{s}'"),
        other => other.to_string(),
    }
}

/// Whether `to_literal` renders this value as the null token.
pub fn is_null_literal(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(s) => s.is_empty(),
        _ => false,
    }
}
