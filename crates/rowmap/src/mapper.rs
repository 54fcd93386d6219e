//! Per-entity column registry and command cache.

use std::fmt;

use dashmap::DashMap;
use indexmap::IndexMap;

use crate::clause::{Operator, Predicate, SortDirection, SortTerm};
use crate::entity::{BaseRecord, Entity};
use crate::error::{MapError, Result};
use crate::options::{ColumnMap, FieldAccessor, MapOptions};

/// Property every mapped entity is scoped by.
pub const TENANT_CODE: &str = "TenantCode";

/// Property updates are keyed by.
pub const ID: &str = "Id";

/// Property holding the optimistic-concurrency version.
pub const VERSION: &str = "Version";

/// Parameter suffix carrying the version a versioned update expects to find.
pub const EXPECTED_VERSION_SUFFIX: &str = "_old";

pub(crate) struct Column<E> {
    pub(crate) map: ColumnMap,
    pub(crate) alias: String,
    pub(crate) parameter: String,
    pub(crate) accessor: FieldAccessor<E>,
}

#[derive(Debug, Default)]
struct Commands {
    select: String,
    insert: String,
    update: String,
    delete: String,
    copy: String,
    exists: String,
}

/// Column registry, command cache and clause caches for one entity type.
///
/// A mapper is configured once, on construction, and is read-only afterwards
/// except for the clause caches, which are concurrent maps. Share it as
/// `Arc<Mapper<E>>`.
pub struct Mapper<E: Entity> {
    configured: bool,
    entity: &'static str,
    schema: Option<String>,
    table: String,
    qualified_table: String,
    pub(crate) columns: IndexMap<String, Column<E>>,
    commands: Commands,
    tenant: Predicate,
    tenant_and_id: Predicate,
    predicates: DashMap<(usize, Operator), Predicate>,
    orderings: DashMap<(usize, SortDirection), SortTerm>,
}

impl<E: Entity> Mapper<E> {
    /// Creates and configures a mapper for `E`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the entity's mapping is invalid.
    pub fn new() -> Result<Self> {
        let mut mapper = Self {
            configured: false,
            entity: E::entity_name(),
            schema: None,
            table: String::new(),
            qualified_table: String::new(),
            columns: IndexMap::new(),
            commands: Commands::default(),
            tenant: Predicate::new(""),
            tenant_and_id: Predicate::new(""),
            predicates: DashMap::new(),
            orderings: DashMap::new(),
        };
        mapper.configure()?;
        Ok(mapper)
    }

    /// Populates the column registry and renders every cached command.
    ///
    /// Runs the base record's columns first, then [`Entity::configure`].
    /// Calling it again is a no-op. Nothing is cached unless the whole
    /// configuration succeeds.
    ///
    /// # Errors
    ///
    /// Returns a configuration error when no table name is set, a column is
    /// registered twice or has an empty name, two properties share a column
    /// or snake-cased key, or the tenant code or
    /// identifier is not mapped.
    pub fn configure(&mut self) -> Result<()> {
        if self.configured {
            return Ok(());
        }

        let entity = self.entity;
        let mut options = MapOptions::new(entity);
        <E::Base as BaseRecord<E>>::inherit(&mut options)?;
        E::configure(&mut options)?;
        let (schema, table, registered) = options.into_parts();

        let table = table.filter(|name| !name.is_empty()).ok_or(MapError::MissingTable { entity })?;
        let qualified_table =
            schema.as_ref().map_or_else(|| table.clone(), |schema| format!("{schema}.{table}"));
        let prefix =
            schema.as_ref().map_or_else(|| table.clone(), |schema| format!("{schema}_{table}"));

        let mut columns: IndexMap<String, Column<E>> = IndexMap::with_capacity(registered.len());
        for (property, (map, accessor)) in registered {
            if map.column().is_empty() {
                return Err(MapError::EmptyColumnName { entity, property });
            }
            // aliases and parameters derive from the key, so keys and column
            // names must both be unique
            let collision = columns.values().find_map(|existing| {
                let name = if existing.map.key() == map.key() {
                    map.key()
                } else if existing.map.column() == map.column() {
                    map.column()
                } else {
                    return None;
                };
                Some((existing.map.property(), name))
            });
            if let Some((other, name)) = collision {
                return Err(MapError::ColumnCollision {
                    entity,
                    other: other.to_string(),
                    name: name.to_string(),
                    property,
                });
            }
            let column = Column {
                alias: format!("{table}_{}", map.key()),
                parameter: format!("@{prefix}_{}", map.key()),
                map,
                accessor,
            };
            columns.insert(property, column);
        }

        let key_predicate = |property: &'static str| -> Result<(usize, Predicate)> {
            let (index, _, column) = columns
                .get_full(property)
                .ok_or(MapError::MissingKeyColumn { entity, property })?;
            let sql = render_predicate(&qualified_table, column, Operator::Equal, &column.parameter);
            Ok((index, Predicate::new(sql)))
        };
        let (tenant_index, tenant) = key_predicate(TENANT_CODE)?;
        let (id_index, id) = key_predicate(ID)?;
        let tenant_and_id = tenant.and(&id);

        let commands = render_commands(&qualified_table, &columns, &tenant, &tenant_and_id);

        self.predicates.insert((tenant_index, Operator::Equal), tenant.clone());
        self.predicates.insert((id_index, Operator::Equal), id);
        self.schema = schema;
        self.table = table;
        self.qualified_table = qualified_table;
        self.columns = columns;
        self.commands = commands;
        self.tenant = tenant;
        self.tenant_and_id = tenant_and_id;
        self.configured = true;

        tracing::debug!(
            entity,
            table = %self.qualified_table,
            columns = self.columns.len(),
            "configured entity mapping"
        );

        Ok(())
    }

    /// Entity name used in errors and logs.
    #[must_use]
    pub const fn entity_name(&self) -> &'static str {
        self.entity
    }

    /// Table schema, if one was configured.
    #[must_use]
    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    /// Unqualified table name.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// `schema.table`, or `table` when no schema is set.
    #[must_use]
    pub fn qualified_table(&self) -> &str {
        &self.qualified_table
    }

    /// Registered columns in registration order.
    pub fn columns(&self) -> impl Iterator<Item = &ColumnMap> {
        self.columns.values().map(|column| &column.map)
    }

    /// Returns the column map registered for `property`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] if the property was never registered.
    pub fn column_map(&self, property: &str) -> Result<&ColumnMap> {
        self.column(property).map(|(_, column)| &column.map)
    }

    /// Result-set alias of the property's column: `<table>_<property>`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] if the property was never registered.
    pub fn alias(&self, property: &str) -> Result<&str> {
        self.column(property).map(|(_, column)| column.alias.as_str())
    }

    pub(crate) fn column(&self, property: &str) -> Result<(usize, &Column<E>)> {
        self.columns.get_full(property).map(|(index, _, column)| (index, column)).ok_or_else(|| {
            MapError::NotFound {
                entity: self.entity,
                property: property.to_string(),
            }
        })
    }

    // Cached commands

    /// `SELECT <columns> FROM <table> WHERE <tenant predicate>`
    #[must_use]
    pub fn select_command(&self) -> &str {
        &self.commands.select
    }

    /// `INSERT INTO <table> (<columns>) VALUES (<parameters>);`
    #[must_use]
    pub fn insert_command(&self) -> &str {
        &self.commands.insert
    }

    /// `UPDATE <table> SET <column = parameter, ...> WHERE <tenant and id predicate>`
    #[must_use]
    pub fn update_command(&self) -> &str {
        &self.commands.update
    }

    /// `DELETE FROM <table> WHERE <tenant predicate>`
    #[must_use]
    pub fn delete_command(&self) -> &str {
        &self.commands.delete
    }

    /// `COPY <table> (<columns>) FROM STDIN (FORMAT BINARY);`
    #[must_use]
    pub fn copy_command(&self) -> &str {
        &self.commands.copy
    }

    /// Predicate scoping every command to one tenant.
    #[must_use]
    pub const fn tenant_predicate(&self) -> &Predicate {
        &self.tenant
    }

    /// Tenant predicate combined with the identifier predicate.
    #[must_use]
    pub const fn tenant_and_id_predicate(&self) -> &Predicate {
        &self.tenant_and_id
    }

    // Ad-hoc composition over the cached commands

    /// Select command narrowed by an additional predicate.
    #[must_use]
    pub fn select_where(&self, predicate: &Predicate) -> String {
        format!("{} AND ({predicate})", self.commands.select)
    }

    /// Select command narrowed by a predicate and sorted.
    #[must_use]
    pub fn select_where_ordered(&self, predicate: &Predicate, order: &SortTerm) -> String {
        format!("{} AND ({predicate}) ORDER BY {order}", self.commands.select)
    }

    /// Select command narrowed by a predicate and paged.
    #[must_use]
    pub fn select_where_paged(&self, predicate: &Predicate, limit: u64, offset: u64) -> String {
        format!("{} AND ({predicate}) LIMIT {limit} OFFSET {offset}", self.commands.select)
    }

    /// Select command narrowed by a predicate, sorted and paged.
    #[must_use]
    pub fn select_where_ordered_paged(
        &self, predicate: &Predicate, order: &SortTerm, limit: u64, offset: u64,
    ) -> String {
        format!(
            "{} AND ({predicate}) ORDER BY {order} LIMIT {limit} OFFSET {offset}",
            self.commands.select
        )
    }

    /// Select command sorted.
    #[must_use]
    pub fn select_ordered(&self, order: &SortTerm) -> String {
        format!("{} ORDER BY {order}", self.commands.select)
    }

    /// Select command sorted and paged.
    #[must_use]
    pub fn select_ordered_paged(&self, order: &SortTerm, limit: u64, offset: u64) -> String {
        format!("{} ORDER BY {order} LIMIT {limit} OFFSET {offset}", self.commands.select)
    }

    /// `SELECT EXISTS (...)` over the tenant's rows matching the predicate.
    #[must_use]
    pub fn exists_where(&self, predicate: &Predicate) -> String {
        format!("{} AND ({predicate}))", self.commands.exists)
    }

    /// Update command additionally narrowed by a predicate.
    #[must_use]
    pub fn update_where(&self, predicate: &Predicate) -> String {
        format!("{} AND ({predicate})", self.commands.update)
    }

    /// Delete command narrowed by a predicate.
    #[must_use]
    pub fn delete_where(&self, predicate: &Predicate) -> String {
        format!("{} AND ({predicate})", self.commands.delete)
    }

    /// Update command that only applies when the stored version still equals
    /// the version bound under the [`EXPECTED_VERSION_SUFFIX`] parameter.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] if the entity does not map `Version`.
    pub fn update_versioned_command(&self) -> Result<String> {
        let guard =
            self.where_with_parameter_suffix(VERSION, EXPECTED_VERSION_SUFFIX, Operator::Equal)?;
        Ok(format!("{} AND {guard}", self.commands.update))
    }

    // Clause builder

    /// Predicate comparing the property's column to its parameter.
    ///
    /// Memoized per (property, operator): repeated calls return clones of
    /// the same value.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] if the property was never registered.
    pub fn r#where(&self, property: &str, operator: Operator) -> Result<Predicate> {
        let (index, column) = self.column(property)?;
        let key = (index, operator);
        if let Some(hit) = self.predicates.get(&key) {
            return Ok(hit.value().clone());
        }

        let sql = render_predicate(&self.qualified_table, column, operator, &column.parameter);
        tracing::trace!(entity = self.entity, property, ?operator, sql = %sql, "rendered predicate");
        Ok(self.predicates.entry(key).or_insert_with(|| Predicate::new(sql)).value().clone())
    }

    /// Equality predicate for the property.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] if the property was never registered.
    pub fn where_equal(&self, property: &str) -> Result<Predicate> {
        self.r#where(property, Operator::Equal)
    }

    /// Predicate bound to the suffixed parameter name, for commands that bind
    /// the same column twice. Not cached.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] if the property was never registered.
    pub fn where_with_parameter_suffix(
        &self, property: &str, suffix: &str, operator: Operator,
    ) -> Result<Predicate> {
        let (_, column) = self.column(property)?;
        let parameter = format!("{}{suffix}", column.parameter);
        Ok(Predicate::new(render_predicate(&self.qualified_table, column, operator, &parameter)))
    }

    /// Sort term for the property. Memoized per (property, direction).
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] if the property was never registered.
    pub fn order_by(&self, property: &str, direction: SortDirection) -> Result<SortTerm> {
        let (index, column) = self.column(property)?;
        let key = (index, direction);
        if let Some(hit) = self.orderings.get(&key) {
            return Ok(hit.value().clone());
        }

        let sql = format!("{}.{} {}", self.qualified_table, column.map.column(), direction.as_sql());
        tracing::trace!(entity = self.entity, property, ?direction, sql = %sql, "rendered sort term");
        Ok(self.orderings.entry(key).or_insert_with(|| SortTerm::new(sql)).value().clone())
    }

    /// Parameter name of the property: `@<schema>_<table>_<property>` or
    /// `@<table>_<property>`.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] if the property was never registered.
    pub fn parameter_name(&self, property: &str) -> Result<&str> {
        self.column(property).map(|(_, column)| column.parameter.as_str())
    }

    /// Parameter name of the property with `suffix` appended.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::NotFound`] if the property was never registered.
    pub fn parameter_name_with_suffix(&self, property: &str, suffix: &str) -> Result<String> {
        self.parameter_name(property).map(|name| format!("{name}{suffix}"))
    }
}

impl<E: Entity> fmt::Debug for Mapper<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mapper")
            .field("entity", &self.entity)
            .field("table", &self.qualified_table)
            .field("columns", &self.columns.len())
            .field("configured", &self.configured)
            .finish_non_exhaustive()
    }
}

fn render_predicate<E>(
    qualified_table: &str, column: &Column<E>, operator: Operator, parameter: &str,
) -> String {
    let column = column.map.column();
    if operator.takes_parameter() {
        format!("{qualified_table}.{column} {} {parameter}", operator.as_sql())
    } else {
        format!("{qualified_table}.{column} {}", operator.as_sql())
    }
}

fn render_commands<E>(
    qualified_table: &str, columns: &IndexMap<String, Column<E>>, tenant: &Predicate,
    tenant_and_id: &Predicate,
) -> Commands {
    let mut projection = Vec::with_capacity(columns.len());
    let mut names = Vec::with_capacity(columns.len());
    let mut parameters = Vec::with_capacity(columns.len());
    let mut assignments = Vec::with_capacity(columns.len());

    for column in columns.values() {
        let name = column.map.column();
        projection.push(format!("{qualified_table}.{name} AS \"{}\"", column.alias));
        names.push(name);
        parameters.push(column.parameter.as_str());
        assignments.push(format!("{name} = {}", column.parameter));
    }

    let projection = projection.join(", ");
    let names = names.join(", ");

    Commands {
        select: format!("SELECT {projection} FROM {qualified_table} WHERE {tenant}"),
        insert: format!(
            "INSERT INTO {qualified_table} ({names}) VALUES ({});",
            parameters.join(", ")
        ),
        update: format!(
            "UPDATE {qualified_table} SET {} WHERE {tenant_and_id}",
            assignments.join(", ")
        ),
        delete: format!("DELETE FROM {qualified_table} WHERE {tenant}"),
        copy: format!("COPY {qualified_table} ({names}) FROM STDIN (FORMAT BINARY);"),
        exists: format!("SELECT EXISTS (SELECT 1 FROM {qualified_table} WHERE {tenant}"),
    }
}
