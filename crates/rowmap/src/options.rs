use std::fmt;
use std::sync::Arc;

use heck::ToSnakeCase;
use indexmap::IndexMap;
use indexmap::map::Entry;
use sea_query::Value;

use crate::error::{ConversionError, MapError, Result};
use crate::types::{DataType, DbType, ValueType};
use crate::value::FieldValue;

/// Metadata binding one entity property to one database column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMap {
    property: String,
    key: String,
    column: String,
    value_type: ValueType,
    db_type: DbType,
}

impl ColumnMap {
    fn new(property: &str, value_type: ValueType, db_type: DbType) -> Self {
        let key = property.to_snake_case();
        Self {
            property: property.to_string(),
            column: key.clone(),
            key,
            value_type,
            db_type,
        }
    }

    /// Map the property to an explicit column name instead of the
    /// snake-cased property name.
    pub fn with_column(&mut self, column: impl Into<String>) -> &mut Self {
        self.column = column.into();
        self
    }

    /// Override the driver type tag.
    pub const fn with_db_type(&mut self, db_type: DbType) -> &mut Self {
        self.db_type = db_type;
        self
    }

    /// Property name as registered.
    #[must_use]
    pub fn property(&self) -> &str {
        &self.property
    }

    /// Snake-cased property name used in aliases and parameter names.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Database column name.
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Semantic value type.
    #[must_use]
    pub const fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Driver type tag.
    #[must_use]
    pub const fn db_type(&self) -> DbType {
        self.db_type
    }
}

type Getter<E> = Arc<dyn Fn(&E) -> Value + Send + Sync>;
type Setter<E> = Arc<dyn Fn(&mut E, &DataType) -> Result<(), ConversionError> + Send + Sync>;

/// Resolved get/set pair for one mapped field.
pub(crate) struct FieldAccessor<E> {
    get: Getter<E>,
    set: Setter<E>,
}

impl<E: 'static> FieldAccessor<E> {
    fn new<T: FieldValue>(get: fn(&E) -> &T, get_mut: fn(&mut E) -> &mut T) -> Self {
        Self {
            get: Arc::new(move |entity: &E| -> Value { get(entity).clone().into() }),
            set: Arc::new(move |entity: &mut E, data: &DataType| -> Result<(), ConversionError> {
                *get_mut(entity) = T::from_data(data)?;
                Ok(())
            }),
        }
    }

    pub(crate) fn get(&self, entity: &E) -> Value {
        (self.get)(entity)
    }

    pub(crate) fn set(&self, entity: &mut E, data: &DataType) -> Result<(), ConversionError> {
        (self.set)(entity, data)
    }
}

impl<E> Clone for FieldAccessor<E> {
    fn clone(&self) -> Self {
        Self {
            get: Arc::clone(&self.get),
            set: Arc::clone(&self.set),
        }
    }
}

impl<E> fmt::Debug for FieldAccessor<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FieldAccessor")
    }
}

/// Options populated by an entity's configuration callback.
///
/// # Examples
///
/// ```ignore
/// impl Entity for Order {
///     type Base = ();
///
///     fn configure(options: &mut MapOptions<Self>) -> Result<()> {
///         options.table("orders");
///         options.field("Id", |o| &o.id, |o| &mut o.id)?;
///         options.field("TenantCode", |o| &o.tenant_code, |o| &mut o.tenant_code)?;
///         options.field("Status", |o| &o.status, |o| &mut o.status)?.with_db_type(DbType::Varchar);
///         Ok(())
///     }
/// }
/// ```
pub struct MapOptions<E> {
    entity: &'static str,
    schema: Option<String>,
    table: Option<String>,
    columns: IndexMap<String, (ColumnMap, FieldAccessor<E>)>,
}

impl<E: 'static> MapOptions<E> {
    pub(crate) fn new(entity: &'static str) -> Self {
        Self {
            entity,
            schema: None,
            table: None,
            columns: IndexMap::new(),
        }
    }

    /// Sets the table schema.
    pub fn schema(&mut self, schema: impl Into<String>) -> &mut Self {
        self.schema = Some(schema.into());
        self
    }

    /// Sets the table name.
    pub fn table(&mut self, table: impl Into<String>) -> &mut Self {
        self.table = Some(table.into());
        self
    }

    /// Registers a property, its column and its accessor pair.
    ///
    /// The column name defaults to the snake-cased property name and the
    /// types to the field type's defaults; adjust them through the returned
    /// [`ColumnMap`].
    ///
    /// # Errors
    ///
    /// Returns [`MapError::DuplicateColumn`] if the property is already
    /// registered.
    pub fn field<T: FieldValue>(
        &mut self, property: &str, get: fn(&E) -> &T, get_mut: fn(&mut E) -> &mut T,
    ) -> Result<&mut ColumnMap> {
        match self.columns.entry(property.to_string()) {
            Entry::Occupied(_) => Err(MapError::DuplicateColumn {
                entity: self.entity,
                property: property.to_string(),
            }),
            Entry::Vacant(slot) => {
                let map = ColumnMap::new(property, T::VALUE_TYPE, T::DB_TYPE);
                let (map, _) = slot.insert((map, FieldAccessor::new(get, get_mut)));
                Ok(map)
            }
        }
    }

    /// Whether the property has been registered.
    #[must_use]
    pub fn contains(&self, property: &str) -> bool {
        self.columns.contains_key(property)
    }

    pub(crate) fn into_parts(
        self,
    ) -> (Option<String>, Option<String>, IndexMap<String, (ColumnMap, FieldAccessor<E>)>) {
        (self.schema, self.table, self.columns)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Sample {
        service_client_id: i64,
        key_hash: String,
    }

    #[test]
    fn column_name_is_snake_cased() {
        let mut options = MapOptions::<Sample>::new("Sample");
        let map = options
            .field("ServiceClientId", |s| &s.service_client_id, |s| &mut s.service_client_id)
            .unwrap();

        assert_eq!(map.property(), "ServiceClientId");
        assert_eq!(map.column(), "service_client_id");
        assert_eq!(map.key(), "service_client_id");
        assert_eq!(map.value_type(), ValueType::Int64);
        assert_eq!(map.db_type(), DbType::Bigint);
    }

    #[test]
    fn explicit_column_and_type() {
        let mut options = MapOptions::<Sample>::new("Sample");
        options
            .field("KeyHash", |s| &s.key_hash, |s| &mut s.key_hash)
            .unwrap()
            .with_column("hash")
            .with_db_type(DbType::Varchar);

        let (_, _, columns) = options.into_parts();
        let (map, _) = &columns["KeyHash"];
        assert_eq!(map.column(), "hash");
        assert_eq!(map.key(), "key_hash");
        assert_eq!(map.db_type(), DbType::Varchar);
    }

    #[test]
    fn duplicate_property_is_rejected() {
        let mut options = MapOptions::<Sample>::new("Sample");
        options.field("KeyHash", |s| &s.key_hash, |s| &mut s.key_hash).unwrap();
        let err = options.field("KeyHash", |s| &s.key_hash, |s| &mut s.key_hash).unwrap_err();

        assert!(matches!(err, MapError::DuplicateColumn { property, .. } if property == "KeyHash"));
    }

    #[test]
    fn accessor_reads_and_writes() {
        let accessor = FieldAccessor::<Sample>::new(|s| &s.key_hash, |s| &mut s.key_hash);
        let mut sample = Sample::default();

        accessor.set(&mut sample, &DataType::Str(Some("abc".to_string()))).unwrap();
        assert_eq!(sample.key_hash, "abc");
        assert_eq!(accessor.get(&sample), Value::String(Some(Box::new("abc".to_string()))));
    }
}
