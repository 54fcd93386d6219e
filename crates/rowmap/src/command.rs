//! Outbound command surface shared with database drivers.

use crate::types::{DataType, DbType, Row};

/// A named, typed parameter value.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name including the `@` marker.
    pub name: String,

    /// Driver type tag.
    pub db_type: DbType,

    /// Value to bind. Nulls use the [`DataType`] null sentinel.
    pub value: DataType,
}

/// Anything parameters can be bound into.
pub trait Command {
    /// Bind a value under the given parameter name.
    fn bind(&mut self, name: &str, db_type: DbType, value: DataType);
}

/// Command text plus its bound parameters, ready to hand to a driver.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statement {
    /// SQL command text.
    pub sql: String,

    /// Bound parameters.
    pub params: Vec<Parameter>,
}

impl Statement {
    /// Creates a statement without parameters.
    #[must_use]
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Looks up a bound parameter by name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|param| param.name == name)
    }
}

impl Command for Statement {
    fn bind(&mut self, name: &str, db_type: DbType, value: DataType) {
        // rebinding replaces the earlier value so a name is never sent twice
        if let Some(existing) = self.params.iter_mut().find(|param| param.name == name) {
            existing.db_type = db_type;
            existing.value = value;
            return;
        }
        self.params.push(Parameter {
            name: name.to_string(),
            db_type,
            value,
        });
    }
}

impl Command for Vec<Parameter> {
    fn bind(&mut self, name: &str, db_type: DbType, value: DataType) {
        self.push(Parameter {
            name: name.to_string(),
            db_type,
            value,
        });
    }
}

/// Database drivers implement [`Connection`] to execute the commands the
/// mapper renders.
///
/// Drivers own connections, transactions and retries; the mapper only
/// produces command text and parameters.
pub trait Connection {
    /// Execute a query and return the resulting rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to prepare or run the statement.
    fn query(&self, statement: &Statement) -> anyhow::Result<Vec<Row>>;

    /// Execute a statement that does not return rows (`INSERT`, `UPDATE`,
    /// `DELETE`) and return the number of rows affected.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver fails to prepare or run the statement.
    fn execute(&self, statement: &Statement) -> anyhow::Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rebinding_replaces_value() {
        let mut statement = Statement::new("DELETE FROM t WHERE t.id = @t_id");
        statement.bind("@t_id", DbType::Bigint, DataType::Int64(Some(1)));
        statement.bind("@t_id", DbType::Bigint, DataType::Int64(Some(2)));

        assert_eq!(statement.params.len(), 1);
        assert_eq!(statement.param("@t_id").map(|p| &p.value), Some(&DataType::Int64(Some(2))));
    }
}
