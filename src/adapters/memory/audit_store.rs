//! In-memory audit stores for tests and single-process deployments.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::audit::{AuditLogEntry, CriticalAuditEntry};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::{AuditLogFilter, AuditStore, CriticalAuditStore};

/// In-memory implementation of [`AuditStore`].
///
/// Appends can be made to fail on demand so tests can verify that audit
/// failures never abort the primary operation.
#[derive(Debug, Default)]
pub struct InMemoryAuditStore {
    entries: Arc<RwLock<Vec<AuditLogEntry>>>,
    failing: AtomicBool,
}

impl InMemoryAuditStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent append fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, entry: &AuditLogEntry) -> Result<(), DomainError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                "audit store unavailable",
            ));
        }
        let mut entries = self.entries.write().await;
        entries.push(entry.clone());
        Ok(())
    }

    async fn query(&self, filter: &AuditLogFilter) -> Result<Vec<AuditLogEntry>, DomainError> {
        let entries = self.entries.read().await;
        let mut matched: Vec<AuditLogEntry> = entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        // Most recent first.
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = filter.limit {
            matched.truncate(limit);
        }
        Ok(matched)
    }
}

/// In-memory implementation of [`CriticalAuditStore`].
#[derive(Debug, Default)]
pub struct InMemoryCriticalAuditStore {
    entries: Arc<RwLock<Vec<CriticalAuditEntry>>>,
}

impl InMemoryCriticalAuditStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when no entries are stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CriticalAuditStore for InMemoryCriticalAuditStore {
    async fn append(&self, entry: &CriticalAuditEntry) -> Result<(), DomainError> {
        let mut entries = self.entries.write().await;
        entries.push(entry.clone());
        Ok(())
    }

    async fn list_for_record(
        &self,
        table_name: &str,
        record_id: &str,
    ) -> Result<Vec<CriticalAuditEntry>, DomainError> {
        let entries = self.entries.read().await;
        let mut matched: Vec<CriticalAuditEntry> = entries
            .iter()
            .filter(|e| e.table_name == table_name && e.record_id == record_id)
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audit::AuditAction;
    use crate::domain::foundation::UserId;

    fn entry(table: &str, record: &str) -> AuditLogEntry {
        AuditLogEntry::new(UserId::new("u-1").unwrap(), AuditAction::Update, table)
            .with_record_id(record)
    }

    #[tokio::test]
    async fn append_and_query_by_record() {
        let store = InMemoryAuditStore::new();
        store.append(&entry("quotes", "q-1")).await.unwrap();
        store.append(&entry("quotes", "q-2")).await.unwrap();
        store.append(&entry("payments", "q-1")).await.unwrap();

        let found = store
            .query(&AuditLogFilter::for_record("quotes", "q-1"))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].table_name, "quotes");
    }

    #[tokio::test]
    async fn query_respects_limit() {
        let store = InMemoryAuditStore::new();
        for i in 0..5 {
            store.append(&entry("quotes", &format!("q-{}", i))).await.unwrap();
        }
        let found = store
            .query(&AuditLogFilter::all().with_limit(2))
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn failing_store_rejects_appends() {
        let store = InMemoryAuditStore::new();
        store.set_failing(true);
        assert!(store.append(&entry("quotes", "q-1")).await.is_err());
        assert!(store.is_empty().await);

        store.set_failing(false);
        assert!(store.append(&entry("quotes", "q-1")).await.is_ok());
    }
}
