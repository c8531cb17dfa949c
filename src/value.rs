//! Raw values carried by filters, bound parameters and result rows.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MapperError, MapperResult};

/// Dynamic value type for filters and bindings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
    /// Enum member carried as its underlying discriminant.
    Enum(i64),
    /// Any other scalar, already rendered to text.
    Other(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Build an enum value from a fieldless enum member.
    pub fn enumeration(discriminant: impl Into<i64>) -> Self {
        Self::Enum(discriminant.into())
    }

    /// Short name of the variant, used in decode errors.
    pub fn type_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::UInt(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::DateTime(_) => "datetime",
            Self::Enum(_) => "enum",
            Self::Other(_) => "other",
        }
    }

    /// Best-effort parse of command-line text: null, booleans, integers,
    /// floats, ISO dates, then plain text.
    pub fn parse_loose(text: &str) -> Self {
        if text.eq_ignore_ascii_case("null") {
            Self::Null
        } else if let Ok(n) = text.parse::<i64>() {
            Self::Int(n)
        } else if let Ok(f) = text.parse::<f64>() {
            Self::Float(f)
        } else if text == "true" {
            Self::Bool(true)
        } else if text == "false" {
            Self::Bool(false)
        } else if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S") {
            Self::DateTime(dt)
        } else if let Ok(d) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
            Self::DateTime(d.and_time(chrono::NaiveTime::MIN))
        } else {
            Self::Text(text.to_string())
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "null"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) | Self::Enum(v) => write!(f, "{v}"),
            Self::UInt(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) | Self::Other(v) => f.write_str(v),
            Self::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

macro_rules! signed_values {
    ($($ty:ty),+) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::Int(i64::from(v))
            }
        })+
    };
}

macro_rules! unsigned_values {
    ($($ty:ty),+) => {
        $(impl From<$ty> for Value {
            fn from(v: $ty) -> Self {
                Value::UInt(u64::from(v))
            }
        })+
    };
}

signed_values!(i8, i16, i32, i64);
unsigned_values!(u8, u16, u32, u64);

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<char> for Value {
    fn from(v: char) -> Self {
        Value::Other(v.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::DateTime(v.and_time(chrono::NaiveTime::MIN))
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::DateTime(v.naive_utc())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Conversion out of a [`Value`] when materializing rows.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, String>;
}

fn mismatch<T>(expected: &str, value: &Value) -> Result<T, String> {
    Err(format!("expected {expected}, found {}", value.type_label()))
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Bool(v) => Ok(*v),
            Value::Int(v) => Ok(*v != 0),
            Value::UInt(v) => Ok(*v != 0),
            other => mismatch("bool", other),
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Int(v) | Value::Enum(v) => Ok(*v),
            Value::UInt(v) => i64::try_from(*v).map_err(|e| e.to_string()),
            Value::Bool(v) => Ok(i64::from(*v)),
            other => mismatch("integer", other),
        }
    }
}

impl FromValue for i32 {
    fn from_value(value: &Value) -> Result<Self, String> {
        let wide = i64::from_value(value)?;
        i32::try_from(wide).map_err(|e| e.to_string())
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::UInt(v) => Ok(*v),
            Value::Int(v) | Value::Enum(v) => u64::try_from(*v).map_err(|e| e.to_string()),
            other => mismatch("unsigned integer", other),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Float(v) => Ok(*v),
            #[allow(clippy::cast_precision_loss)]
            Value::Int(v) => Ok(*v as f64),
            other => mismatch("float", other),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Text(v) | Value::Other(v) => Ok(v.clone()),
            other => mismatch("text", other),
        }
    }
}

impl FromValue for NaiveDateTime {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::DateTime(v) => Ok(*v),
            Value::Text(v) => NaiveDateTime::parse_from_str(v, "%Y-%m-%d %H:%M:%S")
                .or_else(|_| NaiveDateTime::parse_from_str(v, "%Y-%m-%dT%H:%M:%S"))
                .map_err(|e| e.to_string()),
            other => mismatch("datetime", other),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

/// Convert with the column name attached to any failure.
pub fn decode<T: FromValue>(column: &str, value: &Value) -> MapperResult<T> {
    T::from_value(value).map_err(|message| MapperError::decode(column, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_from() {
        assert_eq!(Value::from(42i32), Value::Int(42));
        assert_eq!(Value::from(7u8), Value::UInt(7));
        assert_eq!(Value::from("hello"), Value::Text("hello".into()));
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some(true)), Value::Bool(true));
    }

    #[test]
    fn test_parse_loose() {
        assert_eq!(Value::parse_loose("3"), Value::Int(3));
        assert_eq!(Value::parse_loose("2.5"), Value::Float(2.5));
        assert_eq!(Value::parse_loose("NULL"), Value::Null);
        assert_eq!(Value::parse_loose("false"), Value::Bool(false));
        assert_eq!(Value::parse_loose("Walking"), Value::Text("Walking".into()));
        assert!(matches!(Value::parse_loose("2024-03-01"), Value::DateTime(_)));
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode::<i32>("Id", &Value::Int(3)).unwrap(), 3);
        assert_eq!(decode::<Option<String>>("Name", &Value::Null).unwrap(), None);

        let err = decode::<bool>("IsActive", &Value::Text("yes".into())).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot decode column 'IsActive': expected bool, found text"
        );
    }
}
