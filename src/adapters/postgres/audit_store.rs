//! PostgreSQL implementations of the audit trail ports.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::audit::{AuditAction, AuditLogEntry, CriticalAuditEntry};
use crate::domain::foundation::{AuditLogId, DomainError, ErrorCode, Timestamp, UserId};
use crate::ports::{AuditLogFilter, AuditStore, CriticalAuditStore};

/// PostgreSQL implementation of the AuditStore port.
///
/// The `audit_logs` table is append-only; no UPDATE or DELETE statement
/// exists in this adapter.
pub struct PostgresAuditStore {
    pool: PgPool,
}

impl PostgresAuditStore {
    /// Creates a new store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a generic audit entry.
#[derive(Debug, sqlx::FromRow)]
struct AuditLogRow {
    id: Uuid,
    user_id: String,
    action: String,
    table_name: String,
    record_id: Option<String>,
    old_values: Option<Value>,
    new_values: Option<Value>,
    ip_address: Option<String>,
    user_agent: Option<String>,
    metadata: Option<Value>,
    created_at: DateTime<Utc>,
}

fn parse_action(raw: &str) -> Result<AuditAction, DomainError> {
    match raw {
        "CREATE" => Ok(AuditAction::Create),
        "READ" => Ok(AuditAction::Read),
        "UPDATE" => Ok(AuditAction::Update),
        "DELETE" => Ok(AuditAction::Delete),
        value => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid audit action: {}", value),
        )),
    }
}

impl TryFrom<AuditLogRow> for AuditLogEntry {
    type Error = DomainError;

    fn try_from(row: AuditLogRow) -> Result<Self, Self::Error> {
        Ok(AuditLogEntry {
            id: AuditLogId::from_uuid(row.id),
            user_id: UserId::new(row.user_id).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid user_id: {}", e))
            })?,
            action: parse_action(&row.action)?,
            table_name: row.table_name,
            record_id: row.record_id,
            old_values: row.old_values,
            new_values: row.new_values,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
            metadata: row.metadata,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn storage_error(operation: &'static str, error: sqlx::Error) -> DomainError {
    tracing::error!(operation, error = %error, "audit store query failed");
    DomainError::database(operation)
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (
                id, user_id, action, table_name, record_id,
                old_values, new_values, ip_address, user_agent, metadata, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(entry.user_id.as_str())
        .bind(entry.action.as_str())
        .bind(&entry.table_name)
        .bind(&entry.record_id)
        .bind(&entry.old_values)
        .bind(&entry.new_values)
        .bind(&entry.ip_address)
        .bind(&entry.user_agent)
        .bind(&entry.metadata)
        .bind(entry.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("append_audit_log", e))?;
        Ok(())
    }

    async fn query(&self, filter: &AuditLogFilter) -> Result<Vec<AuditLogEntry>, DomainError> {
        let limit = filter.limit.unwrap_or(100) as i64;
        let rows: Vec<AuditLogRow> = sqlx::query_as(
            r#"
            SELECT * FROM audit_logs
            WHERE ($1::text IS NULL OR user_id = $1)
              AND ($2::text IS NULL OR table_name = $2)
              AND ($3::text IS NULL OR record_id = $3)
              AND ($4::text IS NULL OR action = $4)
            ORDER BY created_at DESC
            LIMIT $5
            "#,
        )
        .bind(filter.user_id.as_ref().map(UserId::as_str))
        .bind(&filter.table_name)
        .bind(&filter.record_id)
        .bind(filter.action.map(|a| a.as_str()))
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("query_audit_logs", e))?;
        rows.into_iter().map(AuditLogEntry::try_from).collect()
    }

    async fn record_trail(
        &self,
        table_name: &str,
        record_id: &str,
        limit: usize,
    ) -> Result<Option<Vec<AuditLogEntry>>, DomainError> {
        // Served by the (table_name, record_id, created_at) index.
        let rows: Vec<AuditLogRow> = sqlx::query_as(
            r#"
            SELECT * FROM audit_logs
            WHERE table_name = $1 AND record_id = $2
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(table_name)
        .bind(record_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("record_audit_trail", e))?;
        let entries: Result<Vec<_>, _> =
            rows.into_iter().map(AuditLogEntry::try_from).collect();
        entries.map(Some)
    }
}

/// PostgreSQL implementation of the CriticalAuditStore port.
pub struct PostgresCriticalAuditStore {
    pool: PgPool,
}

impl PostgresCriticalAuditStore {
    /// Creates a new store over the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CriticalAuditRow {
    id: Uuid,
    table_name: String,
    record_id: String,
    old_price: Option<Value>,
    new_price: Option<Value>,
    reason: String,
    authorized_by: String,
    changed_by: String,
    context: Value,
    created_at: DateTime<Utc>,
}

impl TryFrom<CriticalAuditRow> for CriticalAuditEntry {
    type Error = DomainError;

    fn try_from(row: CriticalAuditRow) -> Result<Self, Self::Error> {
        let parse_user = |raw: String, field: &str| {
            UserId::new(raw).map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Invalid {}: {}", field, e),
                )
            })
        };
        Ok(CriticalAuditEntry {
            id: AuditLogId::from_uuid(row.id),
            table_name: row.table_name,
            record_id: row.record_id,
            old_price: row.old_price,
            new_price: row.new_price,
            reason: row.reason,
            authorized_by: parse_user(row.authorized_by, "authorized_by")?,
            changed_by: parse_user(row.changed_by, "changed_by")?,
            context: row.context,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

#[async_trait]
impl CriticalAuditStore for PostgresCriticalAuditStore {
    async fn append(&self, entry: &CriticalAuditEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO critical_audit_logs (
                id, table_name, record_id, old_price, new_price,
                reason, authorized_by, changed_by, context, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(&entry.table_name)
        .bind(&entry.record_id)
        .bind(&entry.old_price)
        .bind(&entry.new_price)
        .bind(&entry.reason)
        .bind(entry.authorized_by.as_str())
        .bind(entry.changed_by.as_str())
        .bind(&entry.context)
        .bind(entry.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| storage_error("append_critical_audit", e))?;
        Ok(())
    }

    async fn list_for_record(
        &self,
        table_name: &str,
        record_id: &str,
    ) -> Result<Vec<CriticalAuditEntry>, DomainError> {
        let rows: Vec<CriticalAuditRow> = sqlx::query_as(
            r#"
            SELECT * FROM critical_audit_logs
            WHERE table_name = $1 AND record_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(table_name)
        .bind(record_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| storage_error("list_critical_audit", e))?;
        rows.into_iter().map(CriticalAuditEntry::try_from).collect()
    }
}
