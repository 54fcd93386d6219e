use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sea_query::{Nullable, Value};
use uuid::Uuid;

use crate::error::ConversionError;
use crate::types::{DataType, DbType, ValueType};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Trait for field types that can be mapped to a column.
///
/// Outbound, a field becomes a ``SeaQuery`` [`Value`] through `Into<Value>`.
/// Inbound, [`FieldValue::from_data`] decodes a driver value with coercion:
/// nulls become `Default::default()` (which is `None` for `Option<T>`).
pub trait FieldValue: Clone + Default + Into<Value> + Send + Sync + 'static {
    /// Semantic type of the field.
    const VALUE_TYPE: ValueType;

    /// Database type tag used when none is configured explicitly.
    const DB_TYPE: DbType;

    /// Decode a non-null driver value.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be coerced to the field type.
    fn decode(data: &DataType) -> Result<Self, ConversionError>;

    /// Decode a driver value, mapping nulls to the field's default.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be coerced to the field type.
    fn from_data(data: &DataType) -> Result<Self, ConversionError> {
        if data.is_null() { Ok(Self::default()) } else { Self::decode(data) }
    }
}

impl FieldValue for bool {
    const DB_TYPE: DbType = DbType::Boolean;
    const VALUE_TYPE: ValueType = ValueType::Boolean;

    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        match data {
            DataType::Boolean(Some(v)) => Ok(*v),
            DataType::Int32(Some(v)) => Ok(*v != 0),
            DataType::Int64(Some(v)) => Ok(*v != 0),
            _ => Err(mismatch(Self::VALUE_TYPE, data)),
        }
    }
}

impl FieldValue for i32 {
    const DB_TYPE: DbType = DbType::Integer;
    const VALUE_TYPE: ValueType = ValueType::Int32;

    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        match data {
            DataType::Int32(Some(v)) => Ok(*v),
            DataType::Int64(Some(v)) => Self::try_from(*v).map_err(|_e| {
                ConversionError::new(Self::VALUE_TYPE, format!("int64 {v} out of range"))
            }),
            _ => Err(mismatch(Self::VALUE_TYPE, data)),
        }
    }
}

impl FieldValue for i64 {
    const DB_TYPE: DbType = DbType::Bigint;
    const VALUE_TYPE: ValueType = ValueType::Int64;

    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        match data {
            DataType::Int64(Some(v)) => Ok(*v),
            DataType::Int32(Some(v)) => Ok(Self::from(*v)),
            _ => Err(mismatch(Self::VALUE_TYPE, data)),
        }
    }
}

impl FieldValue for f32 {
    const DB_TYPE: DbType = DbType::Real;
    const VALUE_TYPE: ValueType = ValueType::Float;

    #[allow(clippy::cast_possible_truncation)]
    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        match data {
            DataType::Float(Some(v)) => Ok(*v),
            DataType::Double(Some(v)) => Ok(*v as Self),
            _ => Err(mismatch(Self::VALUE_TYPE, data)),
        }
    }
}

impl FieldValue for f64 {
    const DB_TYPE: DbType = DbType::DoublePrecision;
    const VALUE_TYPE: ValueType = ValueType::Double;

    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        match data {
            DataType::Double(Some(v)) => Ok(*v),
            DataType::Float(Some(v)) => Ok(Self::from(*v)),
            _ => Err(mismatch(Self::VALUE_TYPE, data)),
        }
    }
}

impl FieldValue for String {
    const DB_TYPE: DbType = DbType::Text;
    const VALUE_TYPE: ValueType = ValueType::Text;

    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        match data {
            DataType::Str(Some(raw)) => Ok(raw.clone()),
            _ => Err(mismatch(Self::VALUE_TYPE, data)),
        }
    }
}

impl FieldValue for Vec<u8> {
    const DB_TYPE: DbType = DbType::Bytea;
    const VALUE_TYPE: ValueType = ValueType::Binary;

    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        match data {
            DataType::Binary(Some(bytes)) => Ok(bytes.clone()),
            _ => Err(mismatch(Self::VALUE_TYPE, data)),
        }
    }
}

impl FieldValue for Uuid {
    const DB_TYPE: DbType = DbType::Uuid;
    const VALUE_TYPE: ValueType = ValueType::Uuid;

    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        match data {
            DataType::Uuid(Some(v)) => Ok(*v),
            DataType::Str(Some(raw)) => Self::parse_str(raw)
                .map_err(|_e| ConversionError::new(Self::VALUE_TYPE, format!("string {raw:?}"))),
            DataType::Binary(Some(bytes)) => Self::from_slice(bytes).map_err(|_e| {
                ConversionError::new(Self::VALUE_TYPE, format!("{} bytes", bytes.len()))
            }),
            _ => Err(mismatch(Self::VALUE_TYPE, data)),
        }
    }
}

impl FieldValue for NaiveDate {
    const DB_TYPE: DbType = DbType::Date;
    const VALUE_TYPE: ValueType = ValueType::Date;

    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        match data {
            DataType::Date(Some(v)) => Ok(*v),
            DataType::Str(Some(raw)) => Self::parse_from_str(raw, DATE_FORMAT)
                .map_err(|_e| ConversionError::new(Self::VALUE_TYPE, format!("string {raw:?}"))),
            _ => Err(mismatch(Self::VALUE_TYPE, data)),
        }
    }
}

impl FieldValue for NaiveDateTime {
    const DB_TYPE: DbType = DbType::Timestamp;
    const VALUE_TYPE: ValueType = ValueType::Timestamp;

    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        match data {
            DataType::Timestamp(Some(v)) => Ok(*v),
            DataType::Str(Some(raw)) => Self::parse_from_str(raw, TIMESTAMP_FORMAT)
                .map_err(|_e| ConversionError::new(Self::VALUE_TYPE, format!("string {raw:?}"))),
            _ => Err(mismatch(Self::VALUE_TYPE, data)),
        }
    }
}

impl FieldValue for DateTime<Utc> {
    const DB_TYPE: DbType = DbType::TimestampTz;
    const VALUE_TYPE: ValueType = ValueType::TimestampTz;

    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        match data {
            DataType::TimestampTz(Some(v)) => Ok(*v),
            // stored without a zone: the wall-clock value is taken as UTC, not shifted
            DataType::Timestamp(Some(v)) => Ok(v.and_utc()),
            DataType::Str(Some(raw)) => {
                if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
                    return Ok(parsed.with_timezone(&Utc));
                }
                if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT) {
                    return Ok(parsed.and_utc());
                }
                Err(ConversionError::new(Self::VALUE_TYPE, format!("string {raw:?}")))
            }
            _ => Err(mismatch(Self::VALUE_TYPE, data)),
        }
    }
}

impl FieldValue for serde_json::Value {
    const DB_TYPE: DbType = DbType::Jsonb;
    const VALUE_TYPE: ValueType = ValueType::Json;

    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        match data {
            DataType::Json(Some(v)) => Ok(v.clone()),
            DataType::Str(Some(raw)) => serde_json::from_str(raw)
                .map_err(|e| ConversionError::new(Self::VALUE_TYPE, format!("string ({e})"))),
            DataType::Binary(Some(bytes)) => serde_json::from_slice(bytes)
                .map_err(|e| ConversionError::new(Self::VALUE_TYPE, format!("binary ({e})"))),
            _ => Err(mismatch(Self::VALUE_TYPE, data)),
        }
    }
}

impl<T: FieldValue + Nullable> FieldValue for Option<T> {
    const DB_TYPE: DbType = T::DB_TYPE;
    const VALUE_TYPE: ValueType = T::VALUE_TYPE;

    fn decode(data: &DataType) -> Result<Self, ConversionError> {
        T::decode(data).map(Some)
    }
}

fn mismatch(expected: ValueType, found: &DataType) -> ConversionError {
    ConversionError::new(expected, found.kind())
}

/// Translate a ``SeaQuery`` value into its driver representation.
///
/// # Errors
///
/// Returns a description of the value when it has no driver representation.
pub fn to_data_type(value: Value) -> Result<DataType, String> {
    let data_type = match value {
        Value::Bool(v) => DataType::Boolean(v),
        Value::TinyInt(v) => DataType::Int32(v.map(i32::from)),
        Value::SmallInt(v) => DataType::Int32(v.map(i32::from)),
        Value::Int(v) => DataType::Int32(v),
        Value::BigInt(v) => DataType::Int64(v),
        Value::TinyUnsigned(v) => DataType::Int32(v.map(i32::from)),
        Value::SmallUnsigned(v) => DataType::Int32(v.map(i32::from)),
        Value::Unsigned(v) => DataType::Int64(v.map(i64::from)),
        Value::BigUnsigned(v) => match v.map(i64::try_from).transpose() {
            Ok(v) => DataType::Int64(v),
            Err(_) => return Err("unsigned value exceeds bigint range".to_string()),
        },
        Value::Float(v) => DataType::Float(v),
        Value::Double(v) => DataType::Double(v),
        Value::String(v) => DataType::Str(v.map(|value| *value)),
        Value::Char(v) => DataType::Str(v.map(|ch| ch.to_string())),
        Value::Bytes(v) => DataType::Binary(v.map(|bytes| *bytes)),
        Value::Uuid(v) => DataType::Uuid(v.map(|value| *value)),
        Value::Json(v) => DataType::Json(v.map(|value| *value)),
        Value::ChronoDate(v) => DataType::Date(v.map(|value| *value)),
        Value::ChronoDateTime(v) => DataType::Timestamp(v.map(|value| *value)),
        Value::ChronoDateTimeUtc(v) => DataType::TimestampTz(v.map(|value| *value)),
        other => return Err(format!("{other:?}")),
    };
    Ok(data_type)
}
