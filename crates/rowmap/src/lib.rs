//! Entity-to-table mapping and SQL command generation.
//!
//! A [`Mapper`] turns an entity's statically declared column map into cached
//! command text, memoized predicates and sort terms, deterministic parameter
//! names, and row materialization. Every command is scoped to one tenant.
//!
//! # Quick Start
//!
//! ## Declare an Entity
//!
//! ```ignore
//! use rowmap::{AuditRecord, Audited, Entity, MapOptions, Result};
//!
//! #[derive(Debug, Clone, Default)]
//! pub struct ApiKey {
//!     pub audit: AuditRecord,
//!     pub service_client_id: Uuid,
//!     pub key_prefix: String,
//!     pub key_hash: String,
//!     pub status: String,
//! }
//!
//! impl Audited for ApiKey {
//!     fn audit(&self) -> &AuditRecord { &self.audit }
//!     fn audit_mut(&mut self) -> &mut AuditRecord { &mut self.audit }
//! }
//!
//! impl Entity for ApiKey {
//!     type Base = AuditRecord;
//!
//!     fn configure(options: &mut MapOptions<Self>) -> Result<()> {
//!         options.table("api_keys");
//!         options.field("ServiceClientId", |k| &k.service_client_id, |k| &mut k.service_client_id)?;
//!         options.field("KeyPrefix", |k| &k.key_prefix, |k| &mut k.key_prefix)?;
//!         options.field("KeyHash", |k| &k.key_hash, |k| &mut k.key_hash)?;
//!         options.field("Status", |k| &k.status, |k| &mut k.status)?;
//!         Ok(())
//!     }
//! }
//! ```
//!
//! ## Commands
//!
//! ```ignore
//! let registry = Registry::builder().register::<ApiKey>()?.build();
//! let keys = registry.mapper::<ApiKey>()?;
//!
//! // DELETE FROM api_keys WHERE api_keys.tenant_code = @api_keys_tenant_code
//! let delete = keys.delete_command();
//!
//! // Insert an entity
//! let mut insert = Statement::new(keys.insert_command());
//! keys.bind(&mut insert, &key)?;
//! connection.execute(&insert)?;
//!
//! // Query with an extra predicate, newest first, one page
//! let active = keys.r#where("Status", Operator::Equal)?;
//! let newest = keys.order_by("CreatedAt", SortDirection::Descending)?;
//! let mut query = Statement::new(keys.select_where_ordered_paged(&active, &newest, 20, 0));
//! keys.bind_value(&mut query, "TenantCode", "acme")?;
//! keys.bind_value(&mut query, "Status", "active")?;
//! let found = keys.materialize_all(connection.query(&query)?)?;
//! ```
//!
//! ## Optimistic Concurrency
//!
//! ```ignore
//! let expected = key.audit.version;
//! key.audit.touch("alice", "rotate", "admin-api", None);
//!
//! // ... WHERE ... AND api_keys.version = @api_keys_version_old
//! let mut update = Statement::new(keys.update_versioned_command()?);
//! keys.bind(&mut update, &key)?;
//! keys.bind_expected_version(&mut update, expected)?;
//! if connection.execute(&update)? == 0 {
//!     // somebody else changed the row first
//! }
//! ```

mod bind;
mod clause;
mod command;
mod entity;
mod error;
mod mapper;
mod materialize;
mod options;
mod registry;
mod types;
mod value;

pub use clause::{Operator, Predicate, SortDirection, SortTerm};
pub use command::{Command, Connection, Parameter, Statement};
pub use entity::{AuditRecord, Audited, BaseRecord, Entity};
pub use error::{ConversionError, MapError, Result};
pub use mapper::{EXPECTED_VERSION_SUFFIX, ID, Mapper, TENANT_CODE, VERSION};
pub use options::{ColumnMap, MapOptions};
pub use registry::{Registry, RegistryBuilder};
// Re-export ``SeaQuery`` values: ad-hoc parameter values convert through them.
pub use sea_query::Value;
pub use types::{DataType, DbType, Field, Row, RowAccess, ValueType};
pub use value::{FieldValue, to_data_type};
