use crate::entity::Entity;
use crate::error::{MapError, Result};
use crate::mapper::Mapper;
use crate::types::RowAccess;

impl<E: Entity> Mapper<E> {
    /// Builds a new entity from a result row.
    ///
    /// Every mapped column is read by its alias (`<table>_<property>`).
    /// Database nulls become `None` (or the field's default for
    /// non-optional fields); no validation is performed.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::MissingAlias`] if the row does not carry a mapped
    /// column, or [`MapError::Conversion`] if a value cannot be coerced to
    /// its field type.
    pub fn materialize(&self, row: &impl RowAccess) -> Result<E> {
        let mut entity = E::default();
        self.materialize_into(row, &mut entity)?;
        Ok(entity)
    }

    /// Fills an existing entity from a result row.
    ///
    /// # Errors
    ///
    /// See [`Mapper::materialize`]. Fields assigned before the failing
    /// column keep their new values.
    pub fn materialize_into(&self, row: &impl RowAccess, entity: &mut E) -> Result<()> {
        for column in self.columns.values() {
            let data = row.value(&column.alias).ok_or_else(|| MapError::MissingAlias {
                entity: self.entity_name(),
                alias: column.alias.clone(),
            })?;
            column.accessor.set(entity, data).map_err(|source| MapError::Conversion {
                entity: self.entity_name(),
                property: column.map.property().to_string(),
                source,
            })?;
        }
        Ok(())
    }

    /// Builds one entity per row.
    ///
    /// # Errors
    ///
    /// See [`Mapper::materialize`].
    pub fn materialize_all<R: RowAccess>(&self, rows: impl IntoIterator<Item = R>) -> Result<Vec<E>> {
        rows.into_iter().map(|row| self.materialize(&row)).collect()
    }
}
