//! Dynamically typed SQL parameter values.
//!
//! A [`Value`] is what a `FieldSet` or `FilterSet` carries for each column.
//! It binds to PostgreSQL through [`ToSql`], adapting integer, float and
//! timestamp widths to the column type the server reports for the placeholder.

use crate::error::{OrmError, OrmResult};
use bytes::BytesMut;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A single SQL parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the value kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::Timestamp(_) => "timestamp",
        }
    }

    /// Compare two values of compatible kinds.
    ///
    /// Returns `None` when either side is `Null` or the kinds do not compare,
    /// which makes an in-memory predicate false the same way SQL `NULL` does.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Float(b)) => (*a as f64).partial_cmp(b),
            (Value::Float(a), Value::Int(b)) => a.partial_cmp(&(*b as f64)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Date(b)) => Some(a.cmp(&midnight(*b))),
            (Value::Date(a), Value::Timestamp(b)) => Some(midnight(*a).cmp(b)),
            _ => None,
        }
    }
}

fn midnight(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Float(v) => match *ty {
                Type::FLOAT4 => (*v as f32).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Date(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => match *ty {
                Type::TIMESTAMP => v.naive_utc().to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::BOOL
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::UNKNOWN
                | Type::DATE
                | Type::TIMESTAMP
                | Type::TIMESTAMPTZ
        )
    }

    tokio_postgres::types::to_sql_checked!();
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f64(*v),
            Value::Text(v) => serializer.serialize_str(v),
            Value::Date(v) => v.serialize(serializer),
            Value::Timestamp(v) => v.serialize(serializer),
        }
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

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Value::Timestamp(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

/// Convert a [`Value`] back into a typed field.
pub trait FromValue: Sized {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self>;
}

fn mismatch(column: &str, expected: &str, got: &Value) -> OrmError {
    OrmError::decode(
        column,
        format!("expected {expected}, got {}", got.kind_name()),
    )
}

impl FromValue for String {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Text(s) => Ok(s.clone()),
            other => Err(mismatch(column, "text", other)),
        }
    }
}

impl FromValue for i64 {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Int(v) => Ok(*v),
            other => Err(mismatch(column, "integer", other)),
        }
    }
}

impl FromValue for i32 {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Int(v) => i32::try_from(*v)
                .map_err(|_| OrmError::decode(column, format!("{v} is out of range for integer"))),
            other => Err(mismatch(column, "integer", other)),
        }
    }
}

impl FromValue for bool {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Bool(v) => Ok(*v),
            other => Err(mismatch(column, "boolean", other)),
        }
    }
}

impl FromValue for DateTime<Utc> {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Timestamp(v) => Ok(*v),
            Value::Date(d) => Ok(midnight(*d)),
            other => Err(mismatch(column, "timestamp", other)),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(column: &str, value: &Value) -> OrmResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(column, other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn option_none_becomes_null() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::Text("x".into()));
    }

    #[test]
    fn serializes_as_plain_json() {
        let json = serde_json::to_value(vec![
            Value::from("Ayşe"),
            Value::Null,
            Value::from(42i64),
        ])
        .unwrap();
        assert_eq!(json, serde_json::json!(["Ayşe", null, 42]));
    }

    #[test]
    fn compare_null_is_none() {
        assert_eq!(Value::Null.compare(&Value::Int(1)), None);
        assert_eq!(Value::Int(1).compare(&Value::Null), None);
    }

    #[test]
    fn compare_timestamp_with_date() {
        let ts = Value::Timestamp(Utc.with_ymd_and_hms(2025, 1, 1, 9, 30, 0).unwrap());
        let day = Value::Date(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert_eq!(ts.compare(&day), Some(Ordering::Greater));
        assert_eq!(day.compare(&ts), Some(Ordering::Less));
    }

    #[test]
    fn accepts_common_column_types() {
        assert!(<Value as ToSql>::accepts(&Type::INT4));
        assert!(<Value as ToSql>::accepts(&Type::TIMESTAMPTZ));
        assert!(!<Value as ToSql>::accepts(&Type::JSONB));
    }

    #[test]
    fn int_binds_to_int4_with_range_check() {
        let mut buf = BytesMut::new();
        assert!(Value::Int(42).to_sql_checked(&Type::INT4, &mut buf).is_ok());
        assert_eq!(buf.len(), 4);

        let mut buf = BytesMut::new();
        assert!(Value::Int(i64::MAX).to_sql_checked(&Type::INT4, &mut buf).is_err());
    }

    #[test]
    fn text_does_not_bind_to_integer_column() {
        let mut buf = BytesMut::new();
        assert!(Value::from("abc").to_sql_checked(&Type::INT8, &mut buf).is_err());
    }

    #[test]
    fn from_value_decodes_typed_fields() {
        assert_eq!(String::from_value("c", &Value::from("a")).unwrap(), "a");
        assert_eq!(i32::from_value("c", &Value::Int(30)).unwrap(), 30);
        assert_eq!(Option::<String>::from_value("c", &Value::Null).unwrap(), None);
        assert!(i64::from_value("c", &Value::from("x")).is_err());
    }
}
