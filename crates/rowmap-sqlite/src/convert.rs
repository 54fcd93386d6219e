//! Conversions between driver values and `SQLite` storage classes.
//!
//! `SQLite` has no native uuid, date, timestamp or json types, so those are
//! stored as text and decoded by the mapper's field coercions.

use anyhow::{Context, Result};
use rowmap::DataType;
use rusqlite::types::{Value, ValueRef};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub(crate) fn to_sqlite(data: &DataType) -> Value {
    match data {
        DataType::Boolean(Some(b)) => Value::Integer(i64::from(*b)),
        DataType::Int32(Some(i)) => Value::Integer(i64::from(*i)),
        DataType::Int64(Some(i)) => Value::Integer(*i),
        DataType::Float(Some(f)) => Value::Real(f64::from(*f)),
        DataType::Double(Some(f)) => Value::Real(*f),
        DataType::Str(Some(s)) => Value::Text(s.clone()),
        DataType::Binary(Some(b)) => Value::Blob(b.clone()),
        DataType::Uuid(Some(u)) => Value::Text(u.hyphenated().to_string()),
        DataType::Date(Some(d)) => Value::Text(d.format("%Y-%m-%d").to_string()),
        DataType::Timestamp(Some(ts)) => Value::Text(ts.format(TIMESTAMP_FORMAT).to_string()),
        DataType::TimestampTz(Some(ts)) => Value::Text(ts.to_rfc3339()),
        DataType::Json(Some(json)) => Value::Text(json.to_string()),
        // all None variants map to NULL
        _ => Value::Null,
    }
}

pub(crate) fn from_sqlite(value: ValueRef<'_>) -> Result<DataType> {
    match value {
        ValueRef::Null => Ok(DataType::Str(None)),
        ValueRef::Integer(i) => Ok(DataType::Int64(Some(i))),
        ValueRef::Real(f) => Ok(DataType::Double(Some(f))),
        ValueRef::Text(t) => {
            let s = std::str::from_utf8(t).context("invalid UTF-8 in text value")?;
            Ok(DataType::Str(Some(s.to_string())))
        }
        ValueRef::Blob(b) => Ok(DataType::Binary(Some(b.to_vec()))),
    }
}
