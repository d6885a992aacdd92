//! Audit trail entry types.
//!
//! `AuditLogEntry` is the generic append-only record. `CriticalAuditEntry`
//! is the specialization for mutations that policy says must carry a
//! human-readable justification: price overrides, deletions, and status
//! changes on protected-state quotes.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::domain::foundation::{AuditLogId, Timestamp, UserId, ValidationError};

/// What kind of mutation an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditAction {
    Create,
    Read,
    Update,
    Delete,
}

impl AuditAction {
    /// Returns the canonical stored representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "CREATE",
            AuditAction::Read => "READ",
            AuditAction::Update => "UPDATE",
            AuditAction::Delete => "DELETE",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Request-scoped context attached to audit entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestContext {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub metadata: Option<Value>,
}

impl RequestContext {
    /// Context with no request information (e.g. internal jobs).
    pub fn empty() -> Self {
        Self::default()
    }
}

/// One append-only audit record. Never mutated or deleted after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub id: AuditLogId,
    pub user_id: UserId,
    pub action: AuditAction,
    pub table_name: String,
    pub record_id: Option<String>,
    pub old_values: Option<Value>,
    pub new_values: Option<Value>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: Timestamp,
}

impl AuditLogEntry {
    /// Creates a new audit entry for the given actor, action, and table.
    pub fn new(user_id: UserId, action: AuditAction, table_name: impl Into<String>) -> Self {
        Self {
            id: AuditLogId::new(),
            user_id,
            action,
            table_name: table_name.into(),
            record_id: None,
            old_values: None,
            new_values: None,
            ip_address: None,
            user_agent: None,
            metadata: None,
            created_at: Timestamp::now(),
        }
    }

    /// Sets the record this entry refers to.
    pub fn with_record_id(mut self, record_id: impl Into<String>) -> Self {
        self.record_id = Some(record_id.into());
        self
    }

    /// Sets the before-state snapshot.
    pub fn with_old_values(mut self, old_values: Value) -> Self {
        self.old_values = Some(old_values);
        self
    }

    /// Sets the after-state snapshot.
    pub fn with_new_values(mut self, new_values: Value) -> Self {
        self.new_values = Some(new_values);
        self
    }

    /// Attaches request context (IP, user agent, metadata).
    pub fn with_context(mut self, context: &RequestContext) -> Self {
        self.ip_address = context.ip_address.clone();
        self.user_agent = context.user_agent.clone();
        self.metadata = context.metadata.clone();
        self
    }
}

/// Audit record for a mutation requiring a mandatory justification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalAuditEntry {
    pub id: AuditLogId,
    pub table_name: String,
    pub record_id: String,
    pub old_price: Option<Value>,
    pub new_price: Option<Value>,
    /// Non-empty by construction.
    pub reason: String,
    pub authorized_by: UserId,
    pub changed_by: UserId,
    /// Full before/after snapshot and any request metadata.
    pub context: Value,
    pub created_at: Timestamp,
}

impl CriticalAuditEntry {
    /// Creates a critical audit entry. The reason is mandatory and must
    /// not be blank.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        table_name: impl Into<String>,
        record_id: impl Into<String>,
        reason: impl Into<String>,
        authorized_by: UserId,
        changed_by: UserId,
        context: Value,
    ) -> Result<Self, ValidationError> {
        let reason = reason.into();
        if reason.trim().is_empty() {
            return Err(ValidationError::empty_field("reason"));
        }
        Ok(Self {
            id: AuditLogId::new(),
            table_name: table_name.into(),
            record_id: record_id.into(),
            old_price: None,
            new_price: None,
            reason,
            authorized_by,
            changed_by,
            context,
            created_at: Timestamp::now(),
        })
    }

    /// Sets the before/after price pair for price overrides.
    pub fn with_prices(mut self, old_price: Value, new_price: Value) -> Self {
        self.old_price = Some(old_price);
        self.new_price = Some(new_price);
        self
    }
}
