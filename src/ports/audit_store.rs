//! Audit trail persistence ports.

use async_trait::async_trait;

use crate::domain::audit::{AuditAction, AuditLogEntry, CriticalAuditEntry};
use crate::domain::foundation::{DomainError, UserId};

/// Filter for querying the generic audit log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditLogFilter {
    pub user_id: Option<UserId>,
    pub table_name: Option<String>,
    pub record_id: Option<String>,
    pub action: Option<AuditAction>,
    pub limit: Option<usize>,
}

impl AuditLogFilter {
    /// Filter matching every entry.
    pub fn all() -> Self {
        Self::default()
    }

    /// Filter for one record of one table.
    pub fn for_record(table_name: impl Into<String>, record_id: impl Into<String>) -> Self {
        Self {
            table_name: Some(table_name.into()),
            record_id: Some(record_id.into()),
            ..Self::default()
        }
    }

    /// Caps the number of returned entries.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether an entry matches this filter (limit excluded).
    pub fn matches(&self, entry: &AuditLogEntry) -> bool {
        if let Some(user_id) = &self.user_id {
            if &entry.user_id != user_id {
                return false;
            }
        }
        if let Some(table_name) = &self.table_name {
            if &entry.table_name != table_name {
                return false;
            }
        }
        if let Some(record_id) = &self.record_id {
            if entry.record_id.as_ref() != Some(record_id) {
                return false;
            }
        }
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        true
    }
}

/// Port for the append-only generic audit log.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Appends one entry. Entries are never updated or deleted.
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), DomainError>;

    /// Queries entries matching the filter, most recent first.
    async fn query(&self, filter: &AuditLogFilter) -> Result<Vec<AuditLogEntry>, DomainError>;

    /// Optimized per-record trail lookup, most recent first.
    ///
    /// Stores without a dedicated index return `Ok(None)`; the caller
    /// falls back to a [`AuditStore::query`] scan over the generic log.
    async fn record_trail(
        &self,
        _table_name: &str,
        _record_id: &str,
        _limit: usize,
    ) -> Result<Option<Vec<AuditLogEntry>>, DomainError> {
        Ok(None)
    }
}

/// Port for the critical audit trail.
#[async_trait]
pub trait CriticalAuditStore: Send + Sync {
    /// Appends one critical entry.
    async fn append(&self, entry: &CriticalAuditEntry) -> Result<(), DomainError>;

    /// All critical entries for one record, most recent first.
    async fn list_for_record(
        &self,
        table_name: &str,
        record_id: &str,
    ) -> Result<Vec<CriticalAuditEntry>, DomainError>;
}
