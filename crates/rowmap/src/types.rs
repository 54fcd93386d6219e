//! Values exchanged with the database driver.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

/// A driver-facing value.
///
/// `None` in any variant is the driver's null sentinel: the variant still
/// carries the type so drivers can bind a typed `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    /// Boolean.
    Boolean(Option<bool>),
    /// 32-bit integer.
    Int32(Option<i32>),
    /// 64-bit integer.
    Int64(Option<i64>),
    /// Single-precision float.
    Float(Option<f32>),
    /// Double-precision float.
    Double(Option<f64>),
    /// Text.
    Str(Option<String>),
    /// Raw bytes.
    Binary(Option<Vec<u8>>),
    /// UUID.
    Uuid(Option<Uuid>),
    /// Calendar date.
    Date(Option<NaiveDate>),
    /// Timestamp without time zone.
    Timestamp(Option<NaiveDateTime>),
    /// Timestamp with time zone, normalized to UTC.
    TimestampTz(Option<DateTime<Utc>>),
    /// JSON document.
    Json(Option<serde_json::Value>),
}

impl DataType {
    /// Whether the value is the null sentinel.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(
            self,
            Self::Boolean(None)
                | Self::Int32(None)
                | Self::Int64(None)
                | Self::Float(None)
                | Self::Double(None)
                | Self::Str(None)
                | Self::Binary(None)
                | Self::Uuid(None)
                | Self::Date(None)
                | Self::Timestamp(None)
                | Self::TimestampTz(None)
                | Self::Json(None)
        )
    }

    /// Short name of the variant, used in conversion errors.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Int32(_) => "int32",
            Self::Int64(_) => "int64",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Str(_) => "string",
            Self::Binary(_) => "binary",
            Self::Uuid(_) => "uuid",
            Self::Date(_) => "date",
            Self::Timestamp(_) => "timestamp",
            Self::TimestampTz(_) => "timestamptz",
            Self::Json(_) => "json",
        }
    }

    /// The null sentinel for the given database type.
    #[must_use]
    pub const fn null(db_type: DbType) -> Self {
        match db_type {
            DbType::Boolean => Self::Boolean(None),
            DbType::Smallint | DbType::Integer => Self::Int32(None),
            DbType::Bigint => Self::Int64(None),
            DbType::Real => Self::Float(None),
            DbType::DoublePrecision => Self::Double(None),
            DbType::Text | DbType::Varchar => Self::Str(None),
            DbType::Bytea => Self::Binary(None),
            DbType::Uuid => Self::Uuid(None),
            DbType::Date => Self::Date(None),
            DbType::Timestamp => Self::Timestamp(None),
            DbType::TimestampTz => Self::TimestampTz(None),
            DbType::Jsonb => Self::Json(None),
        }
    }
}

/// Semantic type of a mapped field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Boolean.
    Boolean,
    /// 32-bit integer.
    Int32,
    /// 64-bit integer.
    Int64,
    /// Single-precision float.
    Float,
    /// Double-precision float.
    Double,
    /// Text.
    Text,
    /// Raw bytes.
    Binary,
    /// UUID.
    Uuid,
    /// Calendar date.
    Date,
    /// Timestamp without time zone.
    Timestamp,
    /// Timestamp with time zone.
    TimestampTz,
    /// JSON document.
    Json,
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Boolean => "boolean",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Float => "float",
            Self::Double => "double",
            Self::Text => "text",
            Self::Binary => "binary",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamptz",
            Self::Json => "json",
        };
        f.write_str(name)
    }
}

/// Driver-specific type tag bound alongside each parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DbType {
    /// `boolean`
    Boolean,
    /// `smallint`
    Smallint,
    /// `integer`
    Integer,
    /// `bigint`
    Bigint,
    /// `real`
    Real,
    /// `double precision`
    DoublePrecision,
    /// `text`
    Text,
    /// `varchar`
    Varchar,
    /// `bytea`
    Bytea,
    /// `uuid`
    Uuid,
    /// `date`
    Date,
    /// `timestamp`
    Timestamp,
    /// `timestamptz`
    TimestampTz,
    /// `jsonb`
    Jsonb,
}

impl DbType {
    /// SQL name of the type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Smallint => "smallint",
            Self::Integer => "integer",
            Self::Bigint => "bigint",
            Self::Real => "real",
            Self::DoublePrecision => "double precision",
            Self::Text => "text",
            Self::Varchar => "varchar",
            Self::Bytea => "bytea",
            Self::Uuid => "uuid",
            Self::Date => "date",
            Self::Timestamp => "timestamp",
            Self::TimestampTz => "timestamptz",
            Self::Jsonb => "jsonb",
        }
    }
}

impl fmt::Display for DbType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named value in a result row.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Column name as reported by the driver (the alias for mapped selects).
    pub name: String,

    /// Column value.
    pub value: DataType,
}

/// A result row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    /// Row fields in the order the driver returned them.
    pub fields: Vec<Field>,
}

impl Row {
    /// Appends a field to the row.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: DataType) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value,
        });
        self
    }
}

/// Row accessor keyed by column alias.
pub trait RowAccess {
    /// Returns the value of the named column, or `None` when the row has no
    /// such column. A database `NULL` is `Some` of a null [`DataType`].
    fn value(&self, alias: &str) -> Option<&DataType>;
}

impl RowAccess for Row {
    fn value(&self, alias: &str) -> Option<&DataType> {
        self.fields.iter().find(|field| field.name == alias).map(|field| &field.value)
    }
}

impl RowAccess for HashMap<String, DataType> {
    fn value(&self, alias: &str) -> Option<&DataType> {
        self.get(alias)
    }
}

impl<R: RowAccess + ?Sized> RowAccess for &R {
    fn value(&self, alias: &str) -> Option<&DataType> {
        (**self).value(alias)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_sentinel_matches_db_type() {
        assert_eq!(DataType::null(DbType::Uuid), DataType::Uuid(None));
        assert_eq!(DataType::null(DbType::Varchar), DataType::Str(None));
        assert_eq!(DataType::null(DbType::Smallint), DataType::Int32(None));
        assert!(DataType::null(DbType::TimestampTz).is_null());
        assert!(!DataType::Int64(Some(0)).is_null());
    }

    #[test]
    fn row_lookup_by_alias() {
        let row = Row::default()
            .with("orders_id", DataType::Int64(Some(7)))
            .with("orders_status", DataType::Str(None));

        assert_eq!(row.value("orders_id"), Some(&DataType::Int64(Some(7))));
        assert!(row.value("orders_status").is_some_and(DataType::is_null));
        assert!(row.value("orders_missing").is_none());
    }

    #[test]
    fn map_lookup_by_alias() {
        let mut row = HashMap::new();
        row.insert("t_a".to_string(), DataType::Boolean(Some(true)));
        assert_eq!(row.value("t_a"), Some(&DataType::Boolean(Some(true))));
        assert_eq!(row.value("t_b"), None);
    }
}
