//! Errors

use thiserror::Error;

use crate::types::ValueType;

/// Result type used across the crate.
pub type Result<T, E = MapError> = std::result::Result<T, E>;

/// Errors raised while configuring a mapper, resolving mapped properties, or
/// materializing rows.
///
/// Configuration and lookup errors are programmer mistakes: they are surfaced
/// immediately and never retried.
#[derive(Error, Debug)]
pub enum MapError {
    // --- Configuration errors ---
    /// The configuration callback did not set a table name.
    #[error("entity `{entity}` was configured without a table name")]
    MissingTable {
        /// Entity type name.
        entity: &'static str,
    },

    /// A property was registered more than once for the same entity type.
    #[error("property `{property}` of entity `{entity}` is registered more than once")]
    DuplicateColumn {
        /// Entity type name.
        entity: &'static str,
        /// Property registered twice.
        property: String,
    },

    /// Two properties share a column name, or derive the same alias and
    /// parameter key.
    #[error("properties `{other}` and `{property}` of entity `{entity}` both map to `{name}`")]
    ColumnCollision {
        /// Entity type name.
        entity: &'static str,
        /// Property registered last.
        property: String,
        /// Property registered first.
        other: String,
        /// The shared column name or key.
        name: String,
    },

    /// A property was mapped to an empty column name.
    #[error("property `{property}` of entity `{entity}` is mapped to an empty column name")]
    EmptyColumnName {
        /// Entity type name.
        entity: &'static str,
        /// Property with the empty column name.
        property: String,
    },

    /// A column every command depends on (tenant code, identifier) is not mapped.
    #[error("entity `{entity}` must map the `{property}` property")]
    MissingKeyColumn {
        /// Entity type name.
        entity: &'static str,
        /// The unmapped key property.
        property: &'static str,
    },

    // --- Lookup errors ---
    /// The property was never registered via configuration.
    #[error("property `{property}` was not found on entity `{entity}`; it was never registered via configure")]
    NotFound {
        /// Entity type name.
        entity: &'static str,
        /// Requested property.
        property: String,
    },

    /// The entity type was never registered with the registry.
    #[error("entity `{entity}` is not registered")]
    NotRegistered {
        /// Entity type name.
        entity: &'static str,
    },

    /// A result row does not carry the aliased column of a mapped property.
    #[error("row has no column `{alias}` for entity `{entity}`")]
    MissingAlias {
        /// Entity type name.
        entity: &'static str,
        /// Alias missing from the row.
        alias: String,
    },

    // --- Conversion errors ---
    /// A row value could not be decoded into the mapped field.
    #[error("cannot decode property `{property}` of entity `{entity}`")]
    Conversion {
        /// Entity type name.
        entity: &'static str,
        /// Property being decoded.
        property: String,
        /// Underlying coercion failure.
        #[source]
        source: ConversionError,
    },

    /// An entity value has no driver representation.
    #[error("unsupported value for parameter `{parameter}`: {kind}")]
    UnsupportedValue {
        /// Parameter being bound.
        parameter: String,
        /// Description of the value.
        kind: String,
    },
}

/// A single value could not be coerced into the requested type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("expected {expected} value, found {found}")]
pub struct ConversionError {
    /// The field's value type.
    pub expected: ValueType,

    /// Description of the value found in the row.
    pub found: String,
}

impl ConversionError {
    pub(crate) fn new(expected: ValueType, found: impl Into<String>) -> Self {
        Self {
            expected,
            found: found.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_names_entity_and_property() {
        let err = MapError::NotFound {
            entity: "ApiKey",
            property: "DoesNotExist".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("DoesNotExist"));
        assert!(message.contains("ApiKey"));
        assert!(message.contains("never registered"));
    }

    #[test]
    fn conversion_keeps_source() {
        let err = MapError::Conversion {
            entity: "Order",
            property: "Status".to_string(),
            source: ConversionError::new(ValueType::Text, "int64"),
        };
        let source = std::error::Error::source(&err).expect("source");
        assert_eq!(source.to_string(), "expected text value, found int64");
    }
}
