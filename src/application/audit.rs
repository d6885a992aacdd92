//! Audit trail services.
//!
//! Generic audit writes are best-effort: losing an audit entry is
//! preferable to failing the business operation it describes, but every
//! lost entry is logged at warn level. Critical audit writes are the
//! opposite: they are a precondition of the mutation they justify and
//! their failure aborts it.

use std::sync::Arc;

use serde_json::json;

use crate::domain::audit::{AuditLogEntry, CriticalAuditEntry, RequestContext};
use crate::domain::foundation::{DomainError, QuoteId, UserId};
use crate::domain::quote::QuoteStatus;
use crate::ports::{AuditLogFilter, AuditStore, CriticalAuditStore};

/// Whether a best-effort audit write actually landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditOutcome {
    Recorded,
    /// The append failed; the failure has been logged.
    Dropped,
}

impl AuditOutcome {
    pub fn is_recorded(&self) -> bool {
        matches!(self, AuditOutcome::Recorded)
    }
}

/// Best-effort writer and query surface for the generic audit log.
pub struct AuditLogger {
    store: Arc<dyn AuditStore>,
}

impl AuditLogger {
    pub fn new(store: Arc<dyn AuditStore>) -> Self {
        Self { store }
    }

    /// Appends an entry, swallowing store failures.
    ///
    /// The outcome is returned as a value so callers (and tests) can
    /// observe drops, but it never becomes an error.
    pub async fn create_audit_log(&self, entry: AuditLogEntry) -> AuditOutcome {
        match self.store.append(&entry).await {
            Ok(()) => AuditOutcome::Recorded,
            Err(error) => {
                tracing::warn!(
                    table_name = %entry.table_name,
                    record_id = ?entry.record_id,
                    action = %entry.action,
                    %error,
                    "audit entry dropped"
                );
                AuditOutcome::Dropped
            }
        }
    }

    /// Queries the audit log, most recent first.
    pub async fn get_audit_logs(
        &self,
        filter: &AuditLogFilter,
    ) -> Result<Vec<AuditLogEntry>, DomainError> {
        self.store.query(filter).await
    }

    /// Full trail for one record, most recent first.
    ///
    /// Uses the store's indexed path when it has one, otherwise falls
    /// back to a filtered scan of the generic log.
    pub async fn get_record_audit_trail(
        &self,
        table_name: &str,
        record_id: &str,
        limit: usize,
    ) -> Result<Vec<AuditLogEntry>, DomainError> {
        if let Some(entries) = self.store.record_trail(table_name, record_id, limit).await? {
            return Ok(entries);
        }
        let filter = AuditLogFilter::for_record(table_name, record_id).with_limit(limit);
        self.store.query(&filter).await
    }
}

/// Writer for mutations that require an attributable justification.
pub struct CriticalAuditLogger {
    store: Arc<dyn CriticalAuditStore>,
}

impl CriticalAuditLogger {
    pub fn new(store: Arc<dyn CriticalAuditStore>) -> Self {
        Self { store }
    }

    /// Records a status change on a protected-state quote.
    pub async fn log_quote_status_change(
        &self,
        actor: &UserId,
        quote_id: QuoteId,
        from: QuoteStatus,
        to: QuoteStatus,
        reason: &str,
        context: &RequestContext,
    ) -> Result<CriticalAuditEntry, DomainError> {
        let entry = CriticalAuditEntry::new(
            "quotes",
            quote_id.to_string(),
            reason,
            actor.clone(),
            actor.clone(),
            json!({
                "change": "status",
                "from": from,
                "to": to,
                "ip_address": context.ip_address,
                "user_agent": context.user_agent,
            }),
        )?;
        self.store.append(&entry).await?;
        Ok(entry)
    }

    /// Records a quote deletion with its full final snapshot.
    pub async fn log_quote_delete(
        &self,
        actor: &UserId,
        quote_id: QuoteId,
        snapshot: serde_json::Value,
        reason: &str,
        context: &RequestContext,
    ) -> Result<CriticalAuditEntry, DomainError> {
        let entry = CriticalAuditEntry::new(
            "quotes",
            quote_id.to_string(),
            reason,
            actor.clone(),
            actor.clone(),
            json!({
                "change": "delete",
                "snapshot": snapshot,
                "ip_address": context.ip_address,
                "user_agent": context.user_agent,
            }),
        )?;
        self.store.append(&entry).await?;
        Ok(entry)
    }

    /// Records a price override with the before and after values.
    pub async fn log_price_override(
        &self,
        actor: &UserId,
        quote_id: QuoteId,
        old_price: serde_json::Value,
        new_price: serde_json::Value,
        reason: &str,
        context: &RequestContext,
    ) -> Result<CriticalAuditEntry, DomainError> {
        let entry = CriticalAuditEntry::new(
            "quotes",
            quote_id.to_string(),
            reason,
            actor.clone(),
            actor.clone(),
            json!({
                "change": "price_override",
                "ip_address": context.ip_address,
                "user_agent": context.user_agent,
            }),
        )?
        .with_prices(old_price, new_price);
        self.store.append(&entry).await?;
        Ok(entry)
    }

    /// All critical entries for one record, most recent first.
    pub async fn get_critical_trail(
        &self,
        table_name: &str,
        record_id: &str,
    ) -> Result<Vec<CriticalAuditEntry>, DomainError> {
        self.store.list_for_record(table_name, record_id).await
    }
}
