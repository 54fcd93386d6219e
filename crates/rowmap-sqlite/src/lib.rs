#![doc = include_str!("../README.md")]

//! # SQLite Driver
//!
//! Executes [`rowmap`] statements against `SQLite`. Lightweight and meant for
//! development and tests only.

#![forbid(unsafe_code)]
#![allow(clippy::significant_drop_tightening)]

mod convert;

use std::sync::Arc;

use anyhow::{Context, Result};
use fromenv::FromEnv;
use rowmap::{Field, Row, Statement};
use tracing::instrument;

use crate::convert::{from_sqlite, to_sqlite};

/// Options used to connect to the SQL database.
///
/// This struct is used to load connection options from environment variables.
#[derive(Debug, Clone, FromEnv)]
pub struct ConnectOptions {
    /// Database path or `SQLite` URI.
    #[env(from = "SQL_DATABASE", default = "file::memory:?cache=shared")]
    pub database: String,
}

impl ConnectOptions {
    /// Load options from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is present but cannot be parsed.
    pub fn load() -> Result<Self> {
        Self::from_env().finalize().context("issue loading connection options")
    }
}

/// `SQLite` implementation of [`rowmap::Connection`].
///
/// Parameters are bound by name. A bound parameter the statement does not
/// reference is skipped, so a full entity binding can drive a `DELETE` that
/// only uses the key columns.
#[derive(Debug, Clone)]
pub struct SqliteConnection {
    // rusqlite::Connection isn't `Sync`
    conn: Arc<parking_lot::Mutex<rusqlite::Connection>>,
}

impl SqliteConnection {
    /// Open a connection using explicit options.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    #[instrument]
    pub fn connect_with(options: ConnectOptions) -> Result<Self> {
        tracing::debug!("initializing SQLite connection to: {}", options.database);

        let conn = rusqlite::Connection::open(&options.database)
            .context("failed to open SQLite database")?;

        Ok(Self {
            conn: Arc::new(parking_lot::Mutex::new(conn)),
        })
    }

    /// Open a connection using options loaded from the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the options cannot be loaded or the database
    /// cannot be opened.
    pub fn connect() -> Result<Self> {
        Self::connect_with(ConnectOptions::load()?)
    }

    /// Run one or more parameterless statements, e.g. schema setup.
    ///
    /// # Errors
    ///
    /// Returns an error if any statement fails.
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        tracing::debug!("executing batch: {sql}");
        self.conn.lock().execute_batch(sql).context("failed to execute batch")
    }
}

impl rowmap::Connection for SqliteConnection {
    fn query(&self, statement: &Statement) -> Result<Vec<Row>> {
        tracing::debug!(params = statement.params.len(), "executing query: {}", statement.sql);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&statement.sql).context("failed to prepare statement")?;
        bind(&mut stmt, statement)?;

        let column_names: Vec<String> =
            stmt.column_names().iter().map(ToString::to_string).collect();

        let mut rows = stmt.raw_query();
        let mut result_rows = Vec::new();
        while let Some(row) = rows.next().context("failed to fetch row")? {
            let mut fields = Vec::with_capacity(column_names.len());
            for (i, name) in column_names.iter().enumerate() {
                let value = row.get_ref(i).context("failed to get column value")?;
                fields.push(Field {
                    name: name.clone(),
                    value: from_sqlite(value)?,
                });
            }
            result_rows.push(Row { fields });
        }

        tracing::trace!(rows = result_rows.len(), "query complete");
        Ok(result_rows)
    }

    fn execute(&self, statement: &Statement) -> Result<u64> {
        tracing::debug!(params = statement.params.len(), "executing statement: {}", statement.sql);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&statement.sql).context("failed to prepare statement")?;
        bind(&mut stmt, statement)?;

        let rows_affected = stmt.raw_execute().context("failed to execute statement")?;
        Ok(rows_affected as u64)
    }
}

fn bind(stmt: &mut rusqlite::Statement<'_>, statement: &Statement) -> Result<()> {
    for param in &statement.params {
        let Some(index) = stmt
            .parameter_index(&param.name)
            .with_context(|| format!("invalid parameter name {}", param.name))?
        else {
            tracing::trace!(name = %param.name, "parameter not referenced by statement");
            continue;
        };
        stmt.raw_bind_parameter(index, to_sqlite(&param.value))
            .with_context(|| format!("failed to bind {}", param.name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rowmap::{Command, Connection, DataType, DbType};

    use super::*;

    fn memory() -> SqliteConnection {
        SqliteConnection::connect_with(ConnectOptions {
            database: ":memory:".to_string(),
        })
        .expect("connect")
    }

    #[test]
    fn sqlite_operations() {
        let conn = memory();
        conn.execute_batch("CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT, age INTEGER)")
            .expect("create table");

        for (name, age) in [("Alice", 30), ("Bob", 25)] {
            let mut insert = Statement::new("INSERT INTO users (name, age) VALUES (@name, @age)");
            insert.bind("@name", DbType::Text, DataType::Str(Some(name.to_string())));
            insert.bind("@age", DbType::Integer, DataType::Int32(Some(age)));
            assert_eq!(conn.execute(&insert).expect("insert"), 1);
        }

        let rows = conn
            .query(&Statement::new("SELECT id, name, age FROM users ORDER BY name"))
            .expect("query");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields[1].name, "name");
        assert_eq!(rows[0].fields[1].value, DataType::Str(Some("Alice".to_string())));
        assert_eq!(rows[1].fields[2].value, DataType::Int64(Some(25)));
    }

    #[test]
    fn unreferenced_parameters_are_skipped() {
        let conn = memory();
        conn.execute_batch(
            "CREATE TABLE t (id INTEGER, name TEXT); INSERT INTO t VALUES (1, 'a'), (2, 'b');",
        )
        .expect("setup");

        let mut delete = Statement::new("DELETE FROM t WHERE id = @id");
        delete.bind("@id", DbType::Bigint, DataType::Int64(Some(1)));
        delete.bind("@name", DbType::Text, DataType::Str(Some("ignored".to_string())));

        assert_eq!(conn.execute(&delete).expect("delete"), 1);
        let rows = conn.query(&Statement::new("SELECT name FROM t")).expect("query");
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn null_parameters_bind_null() {
        let conn = memory();
        conn.execute_batch("CREATE TABLE t (note TEXT)").expect("setup");

        let mut insert = Statement::new("INSERT INTO t (note) VALUES (@note)");
        insert.bind("@note", DbType::Text, DataType::Str(None));
        conn.execute(&insert).expect("insert");

        let rows =
            conn.query(&Statement::new("SELECT note IS NULL AS empty FROM t")).expect("query");
        assert_eq!(rows[0].fields[0].value, DataType::Int64(Some(1)));
    }
}
