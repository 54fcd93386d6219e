//! Common test helpers shared across integration tests.
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, Utc};
use rowmap::{AuditRecord, Audited, DbType, Entity, MapOptions, Mapper, Parameter, Result, Row};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};
use uuid::Uuid;

// Common test entities used across multiple test files

/// Minimal entity that maps its own key columns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order {
    pub id: i64,
    pub tenant_code: String,
    pub status: String,
}

impl Entity for Order {
    type Base = ();

    fn configure(options: &mut MapOptions<Self>) -> Result<()> {
        options.table("orders");
        options.field("Id", |o| &o.id, |o| &mut o.id)?;
        options.field("TenantCode", |o| &o.tenant_code, |o| &mut o.tenant_code)?;
        options.field("Status", |o| &o.status, |o| &mut o.status)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiKey {
    pub audit: AuditRecord,
    pub service_client_id: Uuid,
    pub key_prefix: String,
    pub key_hash: String,
    pub status: String,
}

impl Audited for ApiKey {
    fn audit(&self) -> &AuditRecord {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditRecord {
        &mut self.audit
    }
}

impl Entity for ApiKey {
    type Base = AuditRecord;

    fn configure(options: &mut MapOptions<Self>) -> Result<()> {
        options.table("api_keys");
        options.field("ServiceClientId", |k| &k.service_client_id, |k| &mut k.service_client_id)?;
        options.field("KeyPrefix", |k| &k.key_prefix, |k| &mut k.key_prefix)?;
        options.field("KeyHash", |k| &k.key_hash, |k| &mut k.key_hash)?;
        options.field("Status", |k| &k.status, |k| &mut k.status)?;
        Ok(())
    }
}

impl ApiKey {
    pub fn sample(tenant_code: &str) -> Self {
        Self {
            audit: AuditRecord::new(tenant_code, "alice"),
            service_client_id: Uuid::new_v4(),
            key_prefix: "ak_live".to_string(),
            key_hash: "9f86d081884c7d65".to_string(),
            status: "active".to_string(),
        }
    }
}

/// Schema-qualified entity covering optional and typed columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Invoice {
    pub audit: AuditRecord,
    pub amount: f64,
    pub line_count: i32,
    pub issued_on: NaiveDate,
    pub settled_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub paid: bool,
    pub metadata: serde_json::Value,
}

impl Audited for Invoice {
    fn audit(&self) -> &AuditRecord {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditRecord {
        &mut self.audit
    }
}

impl Entity for Invoice {
    type Base = AuditRecord;

    fn configure(options: &mut MapOptions<Self>) -> Result<()> {
        options.schema("billing").table("invoices");
        options.field("Amount", |i| &i.amount, |i| &mut i.amount)?.with_column("amount_total");
        options.field("LineCount", |i| &i.line_count, |i| &mut i.line_count)?;
        options.field("IssuedOn", |i| &i.issued_on, |i| &mut i.issued_on)?;
        options.field("SettledAt", |i| &i.settled_at, |i| &mut i.settled_at)?;
        options.field("Notes", |i| &i.notes, |i| &mut i.notes)?.with_db_type(DbType::Varchar);
        options.field("Paid", |i| &i.paid, |i| &mut i.paid)?;
        options.field("Metadata", |i| &i.metadata, |i| &mut i.metadata)?;
        Ok(())
    }
}

impl Invoice {
    pub fn sample(tenant_code: &str) -> Self {
        Self {
            audit: AuditRecord::new(tenant_code, "billing-job"),
            amount: 1250.5,
            line_count: 3,
            issued_on: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
            settled_at: None,
            notes: None,
            paid: false,
            metadata: serde_json::json!({"channel": "web", "lines": [1, 2, 3]}),
        }
    }
}

// Entities with invalid mappings

#[derive(Debug, Default)]
pub struct NoTable {
    pub id: i64,
    pub tenant_code: String,
}

impl Entity for NoTable {
    type Base = ();

    fn configure(options: &mut MapOptions<Self>) -> Result<()> {
        options.field("Id", |e| &e.id, |e| &mut e.id)?;
        options.field("TenantCode", |e| &e.tenant_code, |e| &mut e.tenant_code)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Shadowed {
    pub audit: AuditRecord,
    pub tenant: String,
}

impl Audited for Shadowed {
    fn audit(&self) -> &AuditRecord {
        &self.audit
    }

    fn audit_mut(&mut self) -> &mut AuditRecord {
        &mut self.audit
    }
}

impl Entity for Shadowed {
    type Base = AuditRecord;

    fn configure(options: &mut MapOptions<Self>) -> Result<()> {
        options.table("shadowed");
        // already inherited from the audit record
        options.field("TenantCode", |e| &e.tenant, |e| &mut e.tenant)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct Untenanted {
    pub id: i64,
    pub name: String,
}

impl Entity for Untenanted {
    type Base = ();

    fn configure(options: &mut MapOptions<Self>) -> Result<()> {
        options.table("untenanted");
        options.field("Id", |e| &e.id, |e| &mut e.id)?;
        options.field("Name", |e| &e.name, |e| &mut e.name)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct BlankColumn {
    pub id: i64,
    pub tenant_code: String,
    pub label: String,
}

impl Entity for BlankColumn {
    type Base = ();

    fn configure(options: &mut MapOptions<Self>) -> Result<()> {
        options.table("blank_columns");
        options.field("Id", |e| &e.id, |e| &mut e.id)?;
        options.field("TenantCode", |e| &e.tenant_code, |e| &mut e.tenant_code)?;
        options.field("Label", |e| &e.label, |e| &mut e.label)?.with_column("");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SameKey {
    pub id: i64,
    pub tenant_code: String,
    pub key_hash: String,
    pub legacy_hash: String,
}

impl Entity for SameKey {
    type Base = ();

    fn configure(options: &mut MapOptions<Self>) -> Result<()> {
        options.table("pairs");
        options.field("Id", |e| &e.id, |e| &mut e.id)?;
        options.field("TenantCode", |e| &e.tenant_code, |e| &mut e.tenant_code)?;
        options.field("KeyHash", |e| &e.key_hash, |e| &mut e.key_hash)?;
        // snake-cases to the same key as KeyHash
        options
            .field("key_hash", |e| &e.legacy_hash, |e| &mut e.legacy_hash)?
            .with_column("legacy_hash");
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct SameColumn {
    pub id: i64,
    pub tenant_code: String,
    pub status: String,
    pub state: String,
}

impl Entity for SameColumn {
    type Base = ();

    fn configure(options: &mut MapOptions<Self>) -> Result<()> {
        options.table("pairs");
        options.field("Id", |e| &e.id, |e| &mut e.id)?;
        options.field("TenantCode", |e| &e.tenant_code, |e| &mut e.tenant_code)?;
        options.field("Status", |e| &e.status, |e| &mut e.status)?;
        options.field("State", |e| &e.state, |e| &mut e.state)?.with_column("status");
        Ok(())
    }
}

/// Build a result row from bound parameters, keyed by the column aliases a
/// mapped select would return.
pub fn row_from<E: Entity>(mapper: &Mapper<E>, params: &[Parameter]) -> Row {
    let mut row = Row::default();
    for column in mapper.columns() {
        let property = column.property();
        let parameter = mapper.parameter_name(property).unwrap();
        let value = params
            .iter()
            .find(|param| param.name == parameter)
            .map(|param| param.value.clone())
            .unwrap_or_else(|| panic!("no parameter bound for {property}"));
        row = row.with(mapper.alias(property).unwrap(), value);
    }
    row
}

/// Install a subscriber once so debug output shows in failing tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}
