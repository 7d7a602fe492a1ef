//! Scalar cell values and rows

use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::core::model::{Attribute, EntityKind, ValueKind};

/// Date format used for order dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single stored value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    /// Parse user input into a value of the given kind
    pub fn parse(kind: ValueKind, raw: &str) -> Result<Value, ParseValueError> {
        let err = || ParseValueError {
            kind,
            raw: raw.to_string(),
        };
        match kind {
            ValueKind::Text => Ok(Value::Text(raw.to_string())),
            ValueKind::Integer => raw.trim().parse::<i64>().map(Value::Integer).map_err(|_| err()),
            ValueKind::Real => match raw.trim().parse::<f64>() {
                Ok(f) if f.is_finite() => Ok(Value::Real(f)),
                _ => Err(err()),
            },
            ValueKind::Date => NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
                .map(|d| Value::Text(d.format(DATE_FORMAT).to_string()))
                .map_err(|_| err()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Real(r) => write!(f, "{}", r),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Real(f)
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(f) => ToSqlOutput::Borrowed(ValueRef::Real(*f)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl FromSql for Value {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        Ok(match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(f) => Value::Real(f),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
        })
    }
}

/// Input that does not parse as the attribute's value kind
#[derive(Debug, Clone, PartialEq, Error)]
#[error("'{raw}' is not a valid {kind}")]
pub struct ParseValueError {
    pub kind: ValueKind,
    pub raw: String,
}

/// One row of an entity, all columns in declaration order
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub entity: EntityKind,
    pub values: Vec<Value>,
}

impl Record {
    /// Primary key of this row
    pub fn id(&self) -> i64 {
        self.values.first().and_then(Value::as_i64).unwrap_or_default()
    }

    pub fn get(&self, attribute: Attribute) -> Option<&Value> {
        self.entity
            .position(attribute)
            .and_then(|i| self.values.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_numbers() {
        assert_eq!(Value::parse(ValueKind::Integer, " 12 "), Ok(Value::Integer(12)));
        assert_eq!(Value::parse(ValueKind::Real, "2499.99"), Ok(Value::Real(2499.99)));
        assert!(Value::parse(ValueKind::Real, "abc").is_err());
        assert!(Value::parse(ValueKind::Real, "NaN").is_err());
        assert!(Value::parse(ValueKind::Integer, "1.5").is_err());
        assert!(Value::parse(ValueKind::Integer, "").is_err());
    }

    #[test]
    fn test_parse_text_is_verbatim() {
        assert_eq!(
            Value::parse(ValueKind::Text, "  Kraków "),
            Ok(Value::Text("  Kraków ".to_string()))
        );
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            Value::parse(ValueKind::Date, "2023-06-01"),
            Ok(Value::Text("2023-06-01".to_string()))
        );
        let err = Value::parse(ValueKind::Date, "01/06/2023").unwrap_err();
        assert_eq!(err.raw, "01/06/2023");
        assert!(err.to_string().contains("date"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Real(150.0).to_string(), "150");
        assert_eq!(Value::Real(499.99).to_string(), "499.99");
        assert_eq!(Value::Null.to_string(), "");
    }
}
