use sea_query::Value;

use crate::command::{Command, Parameter};
use crate::entity::Entity;
use crate::error::{MapError, Result};
use crate::mapper::{Column, EXPECTED_VERSION_SUFFIX, Mapper, VERSION};
use crate::types::{DataType, DbType};
use crate::value::to_data_type;

impl<E: Entity> Mapper<E> {
    /// Binds every mapped field of `entity` under its parameter name and
    /// database type.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnsupportedValue`] if a field value has no driver
    /// representation.
    pub fn bind<C: Command + ?Sized>(&self, command: &mut C, entity: &E) -> Result<()> {
        for column in self.columns.values() {
            let value = to_data(column, &column.parameter, column.accessor.get(entity))?;
            command.bind(&column.parameter, column.map.db_type(), value);
        }
        Ok(())
    }

    /// Binds every mapped field with `suffix` appended to each parameter
    /// name, so the same columns can be bound twice in one command.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnsupportedValue`] if a field value has no driver
    /// representation.
    pub fn bind_with_suffix<C: Command + ?Sized>(
        &self, command: &mut C, entity: &E, suffix: &str,
    ) -> Result<()> {
        for column in self.columns.values() {
            let name = format!("{}{suffix}", column.parameter);
            let value = to_data(column, &name, column.accessor.get(entity))?;
            command.bind(&name, column.map.db_type(), value);
        }
        Ok(())
    }

    /// Binds an ad-hoc value for the property's parameter, typically the
    /// operand of a predicate built with [`Mapper::r#where`].
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] if the property was never registered, or
    /// [`MapError::UnsupportedValue`] if the value has no driver representation.
    pub fn bind_value<C: Command + ?Sized>(
        &self, command: &mut C, property: &str, value: impl Into<Value>,
    ) -> Result<()> {
        self.bind_value_with_suffix(command, property, "", value)
    }

    /// Binds an ad-hoc value under the property's suffixed parameter name.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] if the property was never registered, or
    /// [`MapError::UnsupportedValue`] if the value has no driver representation.
    pub fn bind_value_with_suffix<C: Command + ?Sized>(
        &self, command: &mut C, property: &str, suffix: &str, value: impl Into<Value>,
    ) -> Result<()> {
        let (_, column) = self.column(property)?;
        let name = format!("{}{suffix}", column.parameter);
        let value = to_data(column, &name, value.into())?;
        command.bind(&name, column.map.db_type(), value);
        Ok(())
    }

    /// Binds the version a versioned update expects to find, see
    /// [`Mapper::update_versioned_command`].
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] if the entity does not map `Version`.
    pub fn bind_expected_version<C: Command + ?Sized>(
        &self, command: &mut C, version: i64,
    ) -> Result<()> {
        self.bind_value_with_suffix(command, VERSION, EXPECTED_VERSION_SUFFIX, version)
    }

    /// The parameters [`Mapper::bind`] would bind, in column order.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnsupportedValue`] if a field value has no driver
    /// representation.
    pub fn parameters(&self, entity: &E) -> Result<Vec<Parameter>> {
        let mut params = Vec::with_capacity(self.columns.len());
        self.bind(&mut params, entity)?;
        Ok(params)
    }

    /// Field values in column order, for a binary bulk writer driving
    /// [`Mapper::copy_command`].
    ///
    /// # Errors
    ///
    /// Returns [`MapError::UnsupportedValue`] if a field value has no driver
    /// representation.
    pub fn copy_values(&self, entity: &E) -> Result<Vec<(DbType, DataType)>> {
        self.columns
            .values()
            .map(|column| {
                let value = to_data(column, &column.parameter, column.accessor.get(entity))?;
                Ok((column.map.db_type(), value))
            })
            .collect()
    }
}

fn to_data<E>(column: &Column<E>, parameter: &str, value: Value) -> Result<DataType> {
    let data = to_data_type(value).map_err(|kind| MapError::UnsupportedValue {
        parameter: parameter.to_string(),
        kind,
    })?;
    if data.is_null() {
        return Ok(DataType::null(column.map.db_type()));
    }
    Ok(data)
}
