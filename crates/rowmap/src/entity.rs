use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::options::MapOptions;

/// Trait for record types mapped to a table.
///
/// # Examples
///
/// ```ignore
/// #[derive(Debug, Clone, Default)]
/// pub struct ApiKey {
///     pub audit: AuditRecord,
///     pub service_client_id: Uuid,
///     pub key_prefix: String,
///     pub key_hash: String,
///     pub status: String,
/// }
///
/// impl Audited for ApiKey {
///     fn audit(&self) -> &AuditRecord { &self.audit }
///     fn audit_mut(&mut self) -> &mut AuditRecord { &mut self.audit }
/// }
///
/// impl Entity for ApiKey {
///     type Base = AuditRecord;
///
///     fn configure(options: &mut MapOptions<Self>) -> Result<()> {
///         options.table("api_keys");
///         options.field("ServiceClientId", |k| &k.service_client_id, |k| &mut k.service_client_id)?;
///         options.field("KeyPrefix", |k| &k.key_prefix, |k| &mut k.key_prefix)?;
///         options.field("KeyHash", |k| &k.key_hash, |k| &mut k.key_hash)?;
///         options.field("Status", |k| &k.status, |k| &mut k.status)?;
///         Ok(())
///     }
/// }
/// ```
pub trait Entity: Default + Send + Sync + Sized + 'static {
    /// Base record whose columns are registered before [`Entity::configure`]
    /// runs. Use [`AuditRecord`] for tenant-scoped, version-tracked records
    /// and `()` for none.
    type Base: BaseRecord<Self>;

    /// Registers table name, schema and entity-specific columns.
    ///
    /// Invoked once per mapper.
    ///
    /// # Errors
    ///
    /// Returns an error if a column cannot be registered.
    fn configure(options: &mut MapOptions<Self>) -> Result<()>;

    /// Name used in error messages and logs.
    #[must_use]
    fn entity_name() -> &'static str {
        let name = std::any::type_name::<Self>();
        name.rsplit("::").next().unwrap_or(name)
    }
}

/// Columns inherited from a common base record.
pub trait BaseRecord<E> {
    /// Registers the base columns.
    ///
    /// # Errors
    ///
    /// Returns an error if a column cannot be registered.
    fn inherit(options: &mut MapOptions<E>) -> Result<()>;
}

impl<E> BaseRecord<E> for () {
    fn inherit(_: &mut MapOptions<E>) -> Result<()> {
        Ok(())
    }
}

/// Implemented by entities that embed an [`AuditRecord`].
pub trait Audited {
    /// The embedded audit record.
    fn audit(&self) -> &AuditRecord;

    /// The embedded audit record, mutably.
    fn audit_mut(&mut self) -> &mut AuditRecord;
}

/// Identity, tenant and change-tracking fields shared by audited entities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuditRecord {
    /// Entity identifier.
    pub id: Uuid,
    /// Owning tenant.
    pub tenant_code: String,
    /// Who created the entity.
    pub created_by: String,
    /// When the entity was created.
    pub created_at: DateTime<Utc>,
    /// Who last changed the entity.
    pub last_changed_by: String,
    /// When the entity last changed.
    pub last_changed_at: DateTime<Utc>,
    /// Correlation id of the request behind the last change.
    pub last_changed_correlation_id: Option<Uuid>,
    /// System or channel the last change came from.
    pub last_changed_origin: String,
    /// Name of the operation behind the last change.
    pub last_changed_operation: String,
    /// Incremented on every change; guards updates against lost writes.
    pub version: i64,
}

impl AuditRecord {
    /// Creates a record for a new entity owned by `tenant_code`.
    #[must_use]
    pub fn new(tenant_code: impl Into<String>, created_by: impl Into<String>) -> Self {
        let created_by = created_by.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            tenant_code: tenant_code.into(),
            last_changed_by: created_by.clone(),
            created_by,
            created_at: now,
            last_changed_at: now,
            last_changed_correlation_id: None,
            last_changed_origin: String::new(),
            last_changed_operation: String::new(),
            version: 1,
        }
    }

    /// Records a change and increments the version.
    pub fn touch(
        &mut self, changed_by: impl Into<String>, operation: impl Into<String>,
        origin: impl Into<String>, correlation_id: Option<Uuid>,
    ) {
        self.last_changed_by = changed_by.into();
        self.last_changed_at = Utc::now();
        self.last_changed_operation = operation.into();
        self.last_changed_origin = origin.into();
        self.last_changed_correlation_id = correlation_id;
        self.version += 1;
    }
}

impl<E: Audited + 'static> BaseRecord<E> for AuditRecord {
    fn inherit(options: &mut MapOptions<E>) -> Result<()> {
        options.field("Id", |e| &e.audit().id, |e| &mut e.audit_mut().id)?;
        options.field("TenantCode", |e| &e.audit().tenant_code, |e| &mut e.audit_mut().tenant_code)?;
        options.field("CreatedBy", |e| &e.audit().created_by, |e| &mut e.audit_mut().created_by)?;
        options.field("CreatedAt", |e| &e.audit().created_at, |e| &mut e.audit_mut().created_at)?;
        options.field(
            "LastChangedBy",
            |e| &e.audit().last_changed_by,
            |e| &mut e.audit_mut().last_changed_by,
        )?;
        options.field(
            "LastChangedAt",
            |e| &e.audit().last_changed_at,
            |e| &mut e.audit_mut().last_changed_at,
        )?;
        options.field(
            "LastChangedCorrelationId",
            |e| &e.audit().last_changed_correlation_id,
            |e| &mut e.audit_mut().last_changed_correlation_id,
        )?;
        options.field(
            "LastChangedOrigin",
            |e| &e.audit().last_changed_origin,
            |e| &mut e.audit_mut().last_changed_origin,
        )?;
        options.field(
            "LastChangedOperation",
            |e| &e.audit().last_changed_operation,
            |e| &mut e.audit_mut().last_changed_operation,
        )?;
        options.field("Version", |e| &e.audit().version, |e| &mut e.audit_mut().version)?;
        Ok(())
    }
}
